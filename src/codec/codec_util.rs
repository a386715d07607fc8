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

//! Utility functions for reading and writing versioned headers and
//! checksummed footers. Every on-disk stream of this crate starts with a
//! header identifying its codec name and version, and ends with a footer
//! carrying a CRC-32 checksum of the whole stream.

use error::ErrorKind::{CorruptFormat, Format, IllegalArgument, Integrity};
use error::Result;
use store::{BufferedChecksumIndexInput, ChecksumIndexInput, DataInput, DataOutput, IndexInput, IndexOutput};

/// Constant to identify the start of a codec header.
pub const CODEC_MAGIC: i32 = 0x3fd7_6c17;
/// Constant to identify the start of a codec footer.
pub const FOOTER_MAGIC: i32 = !CODEC_MAGIC;

pub fn header_length(codec: &str) -> usize {
    9 + codec.len()
}

pub fn footer_length() -> usize {
    16
}

/// Writes a codec header: magic, codec name, version. The name must be
/// simple ASCII shorter than 128 chars so the header has a fixed length.
pub fn write_header<T: DataOutput + ?Sized>(out: &mut T, codec: &str, version: i32) -> Result<()> {
    if codec.len() >= 128 || !codec.is_ascii() {
        bail!(IllegalArgument(format!(
            "codec must be simple ASCII, less than 128 characters in length [got {}]",
            codec
        )));
    }
    out.write_int(CODEC_MAGIC)?;
    out.write_string(codec)?;
    out.write_int(version)
}

/// Reads and validates a header written by `write_header`, returning the
/// version found.
pub fn check_header<T: DataInput + ?Sized>(
    input: &mut T,
    codec: &str,
    min_version: i32,
    max_version: i32,
) -> Result<i32> {
    let actual_magic = input.read_int()?;
    if actual_magic != CODEC_MAGIC {
        bail!(Format(format!(
            "codec header mismatch: actual magic=0x{:x} vs expected magic=0x{:x}",
            actual_magic, CODEC_MAGIC
        )));
    }
    check_header_no_magic(input, codec, min_version, max_version)
}

pub fn check_header_no_magic<T: DataInput + ?Sized>(
    input: &mut T,
    codec: &str,
    min_version: i32,
    max_version: i32,
) -> Result<i32> {
    let actual_codec = input.read_string()?;
    if actual_codec != codec {
        bail!(Format(format!(
            "codec mismatch: actual codec={} vs expected codec={}",
            actual_codec, codec
        )));
    }
    let actual_version = input.read_int()?;
    if actual_version < min_version || actual_version > max_version {
        bail!(Format(format!(
            "version {} of codec {} is not supported (needs to be between {} and {})",
            actual_version, codec, min_version, max_version
        )));
    }
    Ok(actual_version)
}

/// Writes a codec footer: magic, algorithm id, checksum of everything
/// written so far including the magic and algorithm id.
pub fn write_footer<T: IndexOutput + ?Sized>(out: &mut T) -> Result<()> {
    out.write_int(FOOTER_MAGIC)?;
    out.write_int(0)?;
    let checksum = out.checksum()?;
    out.write_long(checksum)
}

pub fn validate_footer<T: DataInput + ?Sized>(input: &mut T) -> Result<()> {
    let magic = input.read_int()?;
    if magic != FOOTER_MAGIC {
        bail!(CorruptFormat(format!(
            "codec footer mismatch: actual footer=0x{:x} vs expected footer=0x{:x}",
            magic, FOOTER_MAGIC
        )));
    }
    let algorithm_id = input.read_int()?;
    if algorithm_id != 0 {
        bail!(CorruptFormat(format!(
            "codec footer mismatch: unknown algorithm id: {}",
            algorithm_id
        )));
    }
    Ok(())
}

fn read_crc<T: DataInput + ?Sized>(input: &mut T) -> Result<i64> {
    let value = input.read_long()?;
    if value & 0xffff_ffff_0000_0000u64 as i64 != 0 {
        bail!(CorruptFormat(format!("illegal CRC-32 checksum: {}", value)));
    }
    Ok(value)
}

/// Validates the footer of a stream whose preceding bytes were read through
/// `input`, comparing the stored checksum against the running one. The
/// cursor must be positioned exactly at the footer.
pub fn check_footer(input: &mut BufferedChecksumIndexInput) -> Result<i64> {
    let remaining = input.len() as i64 - input.file_pointer();
    if remaining != footer_length() as i64 {
        bail!(CorruptFormat(format!(
            "misplaced codec footer (file truncated?): remaining={}, expected={}",
            remaining,
            footer_length()
        )));
    }
    validate_footer(input)?;
    let actual_checksum = input.checksum();
    let expected_checksum = read_crc(input)?;
    if expected_checksum != actual_checksum {
        bail!(Integrity(format!(
            "checksum failed (hardware problem?): expected=0x{:x} actual=0x{:x}",
            expected_checksum, actual_checksum
        )));
    }
    Ok(actual_checksum)
}

/// Reads the stored checksum and validates the footer framing without
/// verifying the file contents, leaving the cursor at end of file.
pub fn retrieve_checksum(input: &mut dyn IndexInput) -> Result<i64> {
    let length = input.len() as i64;
    if length < footer_length() as i64 {
        bail!(CorruptFormat(format!(
            "misplaced codec footer (file truncated?): length={}, footer length={}",
            length,
            footer_length()
        )));
    }
    input.seek(length - footer_length() as i64)?;
    validate_footer(input)?;
    read_crc(input)
}

/// Checksums the entire file against its stored footer checksum, through a
/// private cloned cursor.
pub fn checksum_entire_file(input: &dyn IndexInput) -> Result<i64> {
    let mut clone = input.clone()?;
    clone.seek(0)?;
    let mut checksum_input = BufferedChecksumIndexInput::new(clone);
    let length = checksum_input.len() as i64;
    checksum_input.skip_bytes((length - footer_length() as i64) as usize)?;
    check_footer(&mut checksum_input)
}
