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

use store::DataInput;

use error::ErrorKind::IllegalArgument;
use error::Result;

use std::io::Read;
use std::sync::Arc;

/// Random-access input stream over a named file.
///
/// A cursor (the seek position) belongs to exactly one reader; `clone`
/// yields an independent cursor over the same underlying bytes so that
/// concurrent readers never race on seek state.
pub trait IndexInput: DataInput + Send + Sync {
    fn clone(&self) -> Result<Box<dyn IndexInput>>;
    fn file_pointer(&self) -> i64;
    fn seek(&mut self, pos: i64) -> Result<()>;
    fn len(&self) -> u64;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn name(&self) -> &str;
}

/// A memory-resident `IndexInput`, sharing its bytes with the owning
/// directory and any number of cloned cursors.
pub struct RamIndexInput {
    name: String,
    data: Arc<Vec<u8>>,
    pos: usize,
}

impl RamIndexInput {
    pub fn new(name: &str, data: Arc<Vec<u8>>) -> RamIndexInput {
        RamIndexInput {
            name: name.to_string(),
            data,
            pos: 0,
        }
    }
}

impl Read for RamIndexInput {
    fn read(&mut self, buf: &mut [u8]) -> ::std::io::Result<usize> {
        let remaining = self.data.len() - self.pos;
        let length = buf.len().min(remaining);
        buf[..length].copy_from_slice(&self.data[self.pos..self.pos + length]);
        self.pos += length;
        Ok(length)
    }
}

impl DataInput for RamIndexInput {}

impl IndexInput for RamIndexInput {
    fn clone(&self) -> Result<Box<dyn IndexInput>> {
        Ok(Box::new(RamIndexInput {
            name: self.name.clone(),
            data: Arc::clone(&self.data),
            pos: self.pos,
        }))
    }

    fn file_pointer(&self) -> i64 {
        self.pos as i64
    }

    fn seek(&mut self, pos: i64) -> Result<()> {
        if pos < 0 || pos as usize > self.data.len() {
            bail!(IllegalArgument(format!(
                "seek position {} out of range [0, {}] for '{}'",
                pos,
                self.data.len(),
                self.name
            )));
        }
        self.pos = pos as usize;
        Ok(())
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn name(&self) -> &str {
        &self.name
    }
}
