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

use error::ErrorKind::{CorruptFormat, IllegalArgument};
use error::Result;
use store::DataInput;
use util::packed::{
    check_block_size, check_version, get_reader_no_header, num_blocks, Format, PackedIntsNullReader,
    PackedReader, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE,
};
use util::LongValues;

/// Provides random access to a stream written by `BlockPackedWriter`.
/// Values are grouped in fixed-size blocks, each stored as a zigzag-encoded
/// minimum followed by packed deltas.
pub struct BlockPackedReader {
    block_shift: usize,
    block_mask: usize,
    value_count: i64,
    min_values: Vec<i64>,
    sub_readers: Vec<PackedReader>,
}

impl BlockPackedReader {
    pub fn new<T: DataInput + ?Sized>(
        input: &mut T,
        packed_ints_version: i32,
        block_size: usize,
        value_count: i64,
    ) -> Result<BlockPackedReader> {
        check_version(packed_ints_version)?;
        let block_shift = check_block_size(block_size, MIN_BLOCK_SIZE, MAX_BLOCK_SIZE)?;
        let block_mask = block_size - 1;
        let num_blocks = num_blocks(value_count, block_size)?;
        let mut min_values = Vec::with_capacity(num_blocks);
        let mut sub_readers = Vec::with_capacity(num_blocks);
        for i in 0..num_blocks {
            min_values.push(input.read_zlong()?);
            let bits_per_value = input.read_vint()?;
            if bits_per_value > 64 {
                bail!(CorruptFormat(format!(
                    "corrupted block, bits per value: {}",
                    bits_per_value
                )));
            }
            let size =
                (block_size as i64).min(value_count - (i as i64) * block_size as i64) as usize;
            if bits_per_value == 0 {
                sub_readers.push(PackedReader::Null(PackedIntsNullReader::new(size)));
            } else {
                sub_readers.push(get_reader_no_header(
                    input,
                    Format::Packed,
                    packed_ints_version,
                    size,
                    bits_per_value,
                )?);
            }
        }
        Ok(BlockPackedReader {
            block_shift,
            block_mask,
            value_count,
            min_values,
            sub_readers,
        })
    }

    pub fn size(&self) -> i64 {
        self.value_count
    }

    pub fn ram_bytes_used(&self) -> i64 {
        let mut bytes = (self.min_values.len() * 8) as i64;
        for sub in &self.sub_readers {
            bytes += sub.ram_bytes_used();
        }
        bytes
    }
}

impl LongValues for BlockPackedReader {
    fn get64(&self, index: i64) -> Result<i64> {
        if index < 0 || index >= self.value_count {
            bail!(IllegalArgument(format!(
                "index {} out of range [0, {})",
                index, self.value_count
            )));
        }
        let block = (index >> self.block_shift) as usize;
        let idx = (index as usize) & self.block_mask;
        Ok(self.min_values[block].wrapping_add(self.sub_readers[block].get(idx) as i64))
    }
}
