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

use crc::{crc32, Hasher32};

use store::{
    BufferedChecksumIndexInput, DataOutput, IndexInput, IndexOutput, RamIndexInput,
};

use error::ErrorKind::IllegalArgument;
use error::Result;

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, RwLock};

/// A collection of named random-access byte streams.
pub trait Directory: Send + Sync {
    fn open_input(&self, name: &str) -> Result<Box<dyn IndexInput>>;

    fn open_checksum_input(&self, name: &str) -> Result<BufferedChecksumIndexInput> {
        Ok(BufferedChecksumIndexInput::new(self.open_input(name)?))
    }

    fn file_length(&self, name: &str) -> Result<u64> {
        Ok(self.open_input(name)?.len())
    }
}

type FileMap = Arc<RwLock<HashMap<String, Arc<Vec<u8>>>>>;

/// A memory-resident `Directory`: files are plain byte vectors, published
/// atomically when their output is closed.
#[derive(Default)]
pub struct RamDirectory {
    files: FileMap,
}

impl RamDirectory {
    pub fn new() -> RamDirectory {
        RamDirectory::default()
    }

    pub fn create_output(&self, name: &str) -> RamOutput {
        RamOutput {
            name: name.to_string(),
            buffer: Vec::new(),
            digest: crc32::Digest::new_with_initial(crc32::IEEE, 0u32),
            files: Arc::clone(&self.files),
        }
    }

    pub fn file_names(&self) -> Vec<String> {
        match self.files.read() {
            Ok(files) => files.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Directory for RamDirectory {
    fn open_input(&self, name: &str) -> Result<Box<dyn IndexInput>> {
        let files = self.files.read()?;
        let data = files
            .get(name)
            .ok_or_else(|| IllegalArgument(format!("file '{}' does not exist", name)))?;
        Ok(Box::new(RamIndexInput::new(name, Arc::clone(data))))
    }
}

/// A memory-resident `IndexOutput`; `close` publishes the buffer into the
/// owning `RamDirectory`.
pub struct RamOutput {
    name: String,
    buffer: Vec<u8>,
    digest: crc32::Digest,
    files: FileMap,
}

impl RamOutput {
    pub fn close(self) -> Result<()> {
        self.files
            .write()?
            .insert(self.name, Arc::new(self.buffer));
        Ok(())
    }
}

impl Write for RamOutput {
    fn write(&mut self, buf: &[u8]) -> ::std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.digest.write(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> ::std::io::Result<()> {
        Ok(())
    }
}

impl DataOutput for RamOutput {}

impl IndexOutput for RamOutput {
    fn name(&self) -> &str {
        &self.name
    }

    fn file_pointer(&self) -> i64 {
        self.buffer.len() as i64
    }

    fn checksum(&self) -> Result<i64> {
        Ok(i64::from(self.digest.sum32()))
    }
}
