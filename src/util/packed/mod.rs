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

mod block_packed_reader;
mod block_packed_writer;
mod monotonic_block_packed_reader;
mod monotonic_block_packed_writer;

pub use self::block_packed_reader::BlockPackedReader;
pub use self::block_packed_writer::BlockPackedWriter;
pub use self::monotonic_block_packed_reader::MonotonicBlockPackedReader;
pub use self::monotonic_block_packed_writer::MonotonicBlockPackedWriter;

use error::ErrorKind::{CorruptFormat, IllegalArgument};
use error::Result;
use store::{DataInput, DataOutput};
use util::LongValues;

pub const VERSION_START: i32 = 2;
pub const VERSION_CURRENT: i32 = 2;

pub const MIN_BLOCK_SIZE: usize = 64;
pub const MAX_BLOCK_SIZE: usize = 1 << 27;

pub fn check_version(version: i32) -> Result<()> {
    if version < VERSION_START || version > VERSION_CURRENT {
        bail!(CorruptFormat(format!(
            "unsupported packed ints version: {} (supported: {}..{})",
            version, VERSION_START, VERSION_CURRENT
        )));
    }
    Ok(())
}

/// Checks that `block_size` is a power of two inside the allowed range and
/// returns its log2.
pub fn check_block_size(block_size: usize, min_size: usize, max_size: usize) -> Result<usize> {
    if block_size < min_size || block_size > max_size {
        bail!(IllegalArgument(format!(
            "block size must be in [{}, {}], got {}",
            min_size, max_size, block_size
        )));
    }
    if !block_size.is_power_of_two() {
        bail!(IllegalArgument(format!(
            "block size must be a power of two, got {}",
            block_size
        )));
    }
    Ok(block_size.trailing_zeros() as usize)
}

pub fn num_blocks(value_count: i64, block_size: usize) -> Result<usize> {
    if value_count < 0 {
        bail!(IllegalArgument(format!(
            "value count must be >= 0, got {}",
            value_count
        )));
    }
    let num_blocks = (value_count + block_size as i64 - 1) / block_size as i64;
    Ok(num_blocks as usize)
}

/// Returns the number of bits needed to store `max_value`, at least 1.
pub fn bits_required(max_value: u64) -> i32 {
    (64 - max_value.leading_zeros() as i32).max(1)
}

/// On-disk layout of a packed array. Only the long-aligned layout is
/// supported; the id is part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Packed,
}

impl Format {
    pub fn with_id(id: i32) -> Result<Format> {
        match id {
            0 => Ok(Format::Packed),
            _ => bail!(CorruptFormat(format!("unknown packed format id: {}", id))),
        }
    }

    pub fn get_id(self) -> i32 {
        0
    }
}

/// Reader for a stream written by `write_no_header`.
pub enum PackedReader {
    Packed64(Packed64),
    Null(PackedIntsNullReader),
}

impl PackedReader {
    pub fn get(&self, index: usize) -> u64 {
        match *self {
            PackedReader::Packed64(ref r) => r.get(index),
            PackedReader::Null(_) => 0,
        }
    }

    pub fn size(&self) -> usize {
        match *self {
            PackedReader::Packed64(ref r) => r.size(),
            PackedReader::Null(ref r) => r.size(),
        }
    }

    pub fn ram_bytes_used(&self) -> i64 {
        match *self {
            PackedReader::Packed64(ref r) => r.ram_bytes_used(),
            PackedReader::Null(_) => 0,
        }
    }
}

impl LongValues for PackedReader {
    fn get64(&self, index: i64) -> Result<i64> {
        if index < 0 || index as usize >= self.size() {
            bail!(IllegalArgument(format!(
                "index {} out of range [0, {})",
                index,
                self.size()
            )));
        }
        Ok(self.get(index as usize) as i64)
    }
}

/// Restores a packed array written without per-array header; the caller
/// supplies the metadata that would otherwise live in the header.
pub fn get_reader_no_header<T: DataInput + ?Sized>(
    input: &mut T,
    format: Format,
    version: i32,
    value_count: usize,
    bits_per_value: i32,
) -> Result<PackedReader> {
    check_version(version)?;
    match format {
        Format::Packed => {
            if bits_per_value == 0 {
                Ok(PackedReader::Null(PackedIntsNullReader::new(value_count)))
            } else if bits_per_value < 0 || bits_per_value > 64 {
                bail!(CorruptFormat(format!(
                    "bits per value must be in [1, 64], got {}",
                    bits_per_value
                )))
            } else {
                Ok(PackedReader::Packed64(Packed64::from_input(
                    input,
                    value_count,
                    bits_per_value as usize,
                )?))
            }
        }
    }
}

/// Packs `values` at `bits_per_value` bits each into big-endian longs and
/// writes them, padding the last long with zero bits.
pub fn write_no_header<T: DataOutput + ?Sized>(
    out: &mut T,
    values: &[u64],
    bits_per_value: i32,
) -> Result<()> {
    debug_assert!(bits_per_value >= 1 && bits_per_value <= 64);
    let bpv = bits_per_value as usize;
    let long_count = (values.len() * bpv + 63) / 64;
    let mut blocks = vec![0u64; long_count];
    for (i, &v) in values.iter().enumerate() {
        let bit_pos = i * bpv;
        let block = bit_pos >> 6;
        let end = (bit_pos & 0x3f) + bpv;
        if end <= 64 {
            blocks[block] |= v << (64 - end);
        } else {
            blocks[block] |= v >> (end - 64);
            blocks[block + 1] |= v << (128 - end);
        }
    }
    for b in blocks {
        out.write_long(b as i64)?;
    }
    Ok(())
}

/// Space-optimized random-access reader over values of fixed bit width,
/// packed contiguously into big-endian longs.
pub struct Packed64 {
    blocks: Vec<u64>,
    bits_per_value: usize,
    value_count: usize,
    mask: u64,
}

impl Packed64 {
    pub fn from_input<T: DataInput + ?Sized>(
        input: &mut T,
        value_count: usize,
        bits_per_value: usize,
    ) -> Result<Packed64> {
        debug_assert!(bits_per_value >= 1 && bits_per_value <= 64);
        let long_count = (value_count * bits_per_value + 63) / 64;
        let mut blocks = Vec::with_capacity(long_count);
        for _ in 0..long_count {
            blocks.push(input.read_long()? as u64);
        }
        let mask = if bits_per_value == 64 {
            !0u64
        } else {
            (1u64 << bits_per_value) - 1
        };
        Ok(Packed64 {
            blocks,
            bits_per_value,
            value_count,
            mask,
        })
    }

    pub fn get(&self, index: usize) -> u64 {
        debug_assert!(index < self.value_count);
        let bit_pos = index * self.bits_per_value;
        let block = bit_pos >> 6;
        let end = (bit_pos & 0x3f) + self.bits_per_value;
        if end <= 64 {
            (self.blocks[block] >> (64 - end)) & self.mask
        } else {
            ((self.blocks[block] << (end - 64)) | (self.blocks[block + 1] >> (128 - end)))
                & self.mask
        }
    }

    pub fn size(&self) -> usize {
        self.value_count
    }

    pub fn ram_bytes_used(&self) -> i64 {
        (self.blocks.len() * 8) as i64
    }
}

impl LongValues for Packed64 {
    fn get64(&self, index: i64) -> Result<i64> {
        if index < 0 || index as usize >= self.value_count {
            bail!(IllegalArgument(format!(
                "index {} out of range [0, {})",
                index, self.value_count
            )));
        }
        Ok(self.get(index as usize) as i64)
    }
}

/// Reader for arrays stored at zero bits per value; every value is 0.
pub struct PackedIntsNullReader {
    value_count: usize,
}

impl PackedIntsNullReader {
    pub fn new(value_count: usize) -> PackedIntsNullReader {
        PackedIntsNullReader { value_count }
    }

    pub fn size(&self) -> usize {
        self.value_count
    }
}

impl LongValues for PackedIntsNullReader {
    fn get64(&self, _index: i64) -> Result<i64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::{ByteArrayDataInput, Directory, RamDirectory};

    fn round_trip(values: &[u64], bits_per_value: i32) {
        let dir = RamDirectory::new();
        let mut out = dir.create_output("packed.bin");
        write_no_header(&mut out, values, bits_per_value).unwrap();
        out.close().unwrap();

        let mut input = dir.open_input("packed.bin").unwrap();
        let reader = get_reader_no_header(
            input.as_mut(),
            Format::Packed,
            VERSION_CURRENT,
            values.len(),
            bits_per_value,
        )
        .unwrap();
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(reader.get(i), v, "index {}", i);
        }
    }

    #[test]
    fn packed64_round_trip_small_widths() {
        for bpv in 1..=16 {
            let mask = if bpv == 64 { !0u64 } else { (1u64 << bpv) - 1 };
            let values: Vec<u64> = (0..1000u64).map(|i| (i * 0x9e37_79b9) & mask).collect();
            round_trip(&values, bpv as i32);
        }
    }

    #[test]
    fn packed64_round_trip_full_width() {
        let values = vec![0, 1, u64::max_value(), 0x8000_0000_0000_0000, 42];
        round_trip(&values, 64);
    }

    #[test]
    fn packed64_round_trip_straddling_longs() {
        // 33 bits per value forces every other value across a long boundary
        let values: Vec<u64> = (0..257u64).map(|i| i * 0x0123_4567 & 0x1_ffff_ffff).collect();
        round_trip(&values, 33);
    }

    #[test]
    fn null_reader_is_all_zeros() {
        let reader = PackedIntsNullReader::new(7);
        assert_eq!(reader.size(), 7);
        assert_eq!(reader.get64(3).unwrap(), 0);
    }

    #[test]
    fn unknown_format_id_rejected() {
        assert!(Format::with_id(1).is_err());
        assert!(Format::with_id(-1).is_err());
    }

    #[test]
    fn version_check() {
        assert!(check_version(VERSION_CURRENT).is_ok());
        assert!(check_version(VERSION_CURRENT + 1).is_err());
        assert!(check_version(VERSION_START - 1).is_err());
    }

    #[test]
    fn bits_required_bounds() {
        assert_eq!(bits_required(0), 1);
        assert_eq!(bits_required(1), 1);
        assert_eq!(bits_required(2), 2);
        assert_eq!(bits_required(255), 8);
        assert_eq!(bits_required(256), 9);
        assert_eq!(bits_required(u64::max_value()), 64);
    }

    #[test]
    fn out_of_range_index_is_error() {
        let mut bytes = ByteArrayDataInput::new(vec![0u8; 8]);
        let reader =
            get_reader_no_header(&mut bytes, Format::Packed, VERSION_CURRENT, 3, 4).unwrap();
        assert!(reader.get64(3).is_err());
        assert!(reader.get64(-1).is_err());
    }
}
