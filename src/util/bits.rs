// Copyright 2019 Zhizhesihai (Beijing) Technology Limited.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// See the License for the specific language governing permissions and
// limitations under the License.

use error::ErrorKind::IllegalArgument;
use error::Result;

/// Interface for bitset-like structures.
pub trait Bits: Send + Sync {
    fn get(&self, index: usize) -> Result<bool>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Like `Bits`, for readers that carry per-call mutable state (e.g. a
/// decode cursor). Only ever used by a single thread.
pub trait BitsMut: Send + Sync {
    fn get(&mut self, index: usize) -> Result<bool>;
    fn len(&self) -> usize;
}

/// Bits impl of the specified length with all bits set.
#[derive(Clone)]
pub struct MatchAllBits {
    len: usize,
}

impl MatchAllBits {
    pub fn new(len: usize) -> Self {
        MatchAllBits { len }
    }
}

impl Bits for MatchAllBits {
    fn get(&self, _index: usize) -> Result<bool> {
        Ok(true)
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl BitsMut for MatchAllBits {
    fn get(&mut self, _index: usize) -> Result<bool> {
        Ok(true)
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Bitset of fixed length, backed by a long array.
pub struct FixedBitSet {
    bits: Vec<i64>,
    num_bits: usize,
}

/// Returns the number of 64-bit words needed to hold `num_bits`.
pub fn bits2words(num_bits: usize) -> usize {
    (num_bits + 63) >> 6
}

impl FixedBitSet {
    pub fn new(num_bits: usize) -> FixedBitSet {
        FixedBitSet {
            bits: vec![0i64; bits2words(num_bits)],
            num_bits,
        }
    }

    /// Creates a bitset using the provided long array as backing store; the
    /// array must be large enough for `num_bits`.
    pub fn copy_from(stored_bits: Vec<i64>, num_bits: usize) -> Result<FixedBitSet> {
        if bits2words(num_bits) > stored_bits.len() {
            bail!(IllegalArgument(format!(
                "the given long array is too small to hold {} bits",
                num_bits
            )));
        }
        Ok(FixedBitSet {
            bits: stored_bits,
            num_bits,
        })
    }

    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.num_bits);
        self.bits[index >> 6] |= 1i64 << (index & 0x3f);
    }

    pub fn cardinality(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn as_words(&self) -> &[i64] {
        &self.bits
    }

    pub fn ram_bytes_used(&self) -> i64 {
        (self.bits.len() * 8) as i64
    }
}

impl Bits for FixedBitSet {
    fn get(&self, index: usize) -> Result<bool> {
        if index >= self.num_bits {
            bail!(IllegalArgument(format!(
                "bit index {} out of range [0, {})",
                index, self.num_bits
            )));
        }
        Ok(self.bits[index >> 6] & (1i64 << (index & 0x3f)) != 0)
    }

    fn len(&self) -> usize {
        self.num_bits
    }
}

impl BitsMut for FixedBitSet {
    fn get(&mut self, index: usize) -> Result<bool> {
        Bits::get(self, index)
    }

    fn len(&self) -> usize {
        self.num_bits
    }
}
