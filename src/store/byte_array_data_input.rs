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

use std::io::Read;

/// `DataInput` backed by a byte array, used as a resettable decode cursor
/// over per-document byte slices (e.g. sorted-set ordinal delta lists).
pub struct ByteArrayDataInput<T: AsRef<[u8]>> {
    bytes: Option<T>,
    pos: usize,
    limit: usize,
}

impl<T: AsRef<[u8]>> ByteArrayDataInput<T> {
    pub fn new(bytes: T) -> ByteArrayDataInput<T> {
        let limit = bytes.as_ref().len();
        ByteArrayDataInput {
            bytes: Some(bytes),
            pos: 0,
            limit,
        }
    }

    pub fn empty() -> ByteArrayDataInput<T> {
        ByteArrayDataInput {
            bytes: None,
            pos: 0,
            limit: 0,
        }
    }

    pub fn reset(&mut self, bytes: T) {
        self.limit = bytes.as_ref().len();
        self.bytes = Some(bytes);
        self.pos = 0;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn eof(&self) -> bool {
        self.pos == self.limit
    }
}

impl<T: AsRef<[u8]>> Read for ByteArrayDataInput<T> {
    fn read(&mut self, buf: &mut [u8]) -> ::std::io::Result<usize> {
        let remaining = self.limit - self.pos;
        let length = buf.len().min(remaining);
        if let Some(ref bytes) = self.bytes {
            buf[..length].copy_from_slice(&bytes.as_ref()[self.pos..self.pos + length]);
        }
        self.pos += length;
        Ok(length)
    }
}

impl<T: AsRef<[u8]>> DataInput for ByteArrayDataInput<T> {}
