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

use error::Result;
use store::DataOutput;
use util::packed::monotonic_block_packed_reader::expected;
use util::packed::{
    bits_required, check_block_size, write_no_header, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE,
};

/// Writes monotonically increasing longs in fixed-size blocks. Each block
/// records the average slope of its values, the minimum deviation from that
/// line and the packed per-value corrections.
pub struct MonotonicBlockPackedWriter {
    block_size: usize,
    pending: Vec<i64>,
    finished: bool,
}

impl MonotonicBlockPackedWriter {
    pub fn new(block_size: usize) -> Result<MonotonicBlockPackedWriter> {
        check_block_size(block_size, MIN_BLOCK_SIZE, MAX_BLOCK_SIZE)?;
        Ok(MonotonicBlockPackedWriter {
            block_size,
            pending: Vec::with_capacity(block_size),
            finished: false,
        })
    }

    pub fn add<T: DataOutput + ?Sized>(&mut self, value: i64, out: &mut T) -> Result<()> {
        debug_assert!(!self.finished);
        self.pending.push(value);
        if self.pending.len() == self.block_size {
            self.flush(out)?;
        }
        Ok(())
    }

    pub fn finish<T: DataOutput + ?Sized>(&mut self, out: &mut T) -> Result<()> {
        debug_assert!(!self.finished);
        if !self.pending.is_empty() {
            self.flush(out)?;
        }
        self.finished = true;
        Ok(())
    }

    fn flush<T: DataOutput + ?Sized>(&mut self, out: &mut T) -> Result<()> {
        let count = self.pending.len();
        let average = if count == 1 {
            0f32
        } else {
            self.pending[count - 1].wrapping_sub(self.pending[0]) as f32 / (count - 1) as f32
        };

        // Deviation of each value from the average line; shifting by the
        // minimum makes the stored corrections non-negative, so the reader
        // reconstructs values exactly despite the f32 slope.
        let deviations: Vec<i64> = self
            .pending
            .iter()
            .enumerate()
            .map(|(i, &v)| v.wrapping_sub(expected(0, average, i as i32)))
            .collect();
        let min = deviations.iter().fold(i64::max_value(), |m, &v| m.min(v));
        let deltas: Vec<u64> = deviations
            .iter()
            .map(|&d| d.wrapping_sub(min) as u64)
            .collect();
        let max_delta = deltas.iter().fold(0u64, |m, &d| m.max(d));

        out.write_zlong(min)?;
        out.write_int(average.to_bits() as i32)?;
        if max_delta == 0 {
            out.write_vint(0)?;
        } else {
            let bits_per_value = bits_required(max_delta);
            out.write_vint(bits_per_value)?;
            write_no_header(out, &deltas, bits_per_value)?;
        }
        self.pending.clear();
        Ok(())
    }
}
