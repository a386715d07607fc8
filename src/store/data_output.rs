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

use byteorder::{BigEndian, WriteBytesExt};

use error::ErrorKind::IllegalArgument;
use error::Result;

use std::io::Write;

/// Abstract base for performing writes on a byte stream, mirroring
/// [`DataInput`](crate::store::DataInput).
pub trait DataOutput: Write {
    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.write_all(&[b])?;
        Ok(())
    }

    fn write_bytes(&mut self, b: &[u8]) -> Result<()> {
        self.write_all(b)?;
        Ok(())
    }

    fn write_short(&mut self, v: i16) -> Result<()> {
        Ok(WriteBytesExt::write_i16::<BigEndian>(self, v)?)
    }

    fn write_int(&mut self, v: i32) -> Result<()> {
        Ok(WriteBytesExt::write_i32::<BigEndian>(self, v)?)
    }

    fn write_long(&mut self, v: i64) -> Result<()> {
        Ok(WriteBytesExt::write_i64::<BigEndian>(self, v)?)
    }

    fn write_vint(&mut self, v: i32) -> Result<()> {
        // negative vints always take five bytes
        let mut u = v as u32;
        while u & !0x7f != 0 {
            self.write_byte((u as u8 & 0x7f) | 0x80)?;
            u >>= 7;
        }
        self.write_byte(u as u8)
    }

    fn write_vlong(&mut self, v: i64) -> Result<()> {
        if v < 0 {
            bail!(IllegalArgument(format!("cannot write negative vlong: {}", v)));
        }
        self.write_vulong(v as u64)
    }

    fn write_vulong(&mut self, mut u: u64) -> Result<()> {
        while u & !0x7f != 0 {
            self.write_byte((u as u8 & 0x7f) | 0x80)?;
            u >>= 7;
        }
        self.write_byte(u as u8)
    }

    /// Writes a zigzag-encoded vlong, cheap for small negative numbers.
    fn write_zlong(&mut self, v: i64) -> Result<()> {
        self.write_vulong(((v << 1) ^ (v >> 63)) as u64)
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_vint(s.len() as i32)?;
        self.write_bytes(s.as_bytes())
    }
}
