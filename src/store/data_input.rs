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

use byteorder::{BigEndian, ReadBytesExt};

use error::ErrorKind::{CorruptFormat, UnexpectedEOF};
use error::Result;

use std::io::Read;

/// Abstract base for performing reads on a byte stream.
///
/// All multi-byte values are big-endian; variable-length integers use the
/// classic 7-bits-per-byte continuation encoding.
pub trait DataInput: Read {
    fn read_byte(&mut self) -> Result<u8> {
        let mut buffer = [0u8; 1];
        if self.read(&mut buffer)? != 1 {
            bail!(UnexpectedEOF(
                "reached EOF when a single byte is expected".to_owned()
            ));
        }
        Ok(buffer[0])
    }

    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let length = buf.len();
        self.read_exact(buf)
            .map_err(|_| UnexpectedEOF(format!("reached EOF when {} bytes are expected", length)))?;
        Ok(())
    }

    fn read_short(&mut self) -> Result<i16> {
        Ok(ReadBytesExt::read_i16::<BigEndian>(self)?)
    }

    fn read_int(&mut self) -> Result<i32> {
        Ok(ReadBytesExt::read_i32::<BigEndian>(self)?)
    }

    fn read_long(&mut self) -> Result<i64> {
        Ok(ReadBytesExt::read_i64::<BigEndian>(self)?)
    }

    fn read_vint(&mut self) -> Result<i32> {
        let mut b = self.read_byte()?;
        let mut i = u32::from(b & 0x7f);
        let mut shift = 7;
        while b & 0x80 != 0 {
            if shift > 28 {
                bail!(CorruptFormat("invalid vint detected".to_owned()));
            }
            b = self.read_byte()?;
            i |= u32::from(b & 0x7f) << shift;
            shift += 7;
        }
        Ok(i as i32)
    }

    fn read_vlong(&mut self) -> Result<i64> {
        let mut b = self.read_byte()?;
        let mut i = u64::from(b & 0x7f);
        let mut shift = 7;
        while b & 0x80 != 0 {
            if shift > 63 {
                bail!(CorruptFormat("invalid vlong detected".to_owned()));
            }
            b = self.read_byte()?;
            i |= u64::from(b & 0x7f) << shift;
            shift += 7;
        }
        Ok(i as i64)
    }

    /// Reads a zigzag-encoded vlong.
    fn read_zlong(&mut self) -> Result<i64> {
        let u = self.read_vlong()? as u64;
        Ok(((u >> 1) as i64) ^ -((u & 1) as i64))
    }

    fn read_string(&mut self) -> Result<String> {
        let length = self.read_vint()? as usize;
        let mut buf = vec![0u8; length];
        self.read_exact_bytes(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    fn skip_bytes(&mut self, count: usize) -> Result<()> {
        let mut skipped = 0usize;
        let mut scratch = [0u8; 1024];
        while skipped < count {
            let step = (count - skipped).min(scratch.len());
            self.read_exact_bytes(&mut scratch[..step])?;
            skipped += step;
        }
        Ok(())
    }
}
