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

use codec::memory::MemoryDocValuesProducer;
use error::Result;
use store::Directory;

pub const DATA_CODEC: &str = "MemoryDocValuesData";
pub const DATA_EXTENSION: &str = "dvd";
pub const METADATA_CODEC: &str = "MemoryDocValuesMetadata";
pub const METADATA_EXTENSION: &str = "dvm";

pub const VERSION_START: i32 = 3;
pub const VERSION_CURRENT: i32 = VERSION_START;

// field catalog type tags
pub const NUMBER: u8 = 0;
pub const BYTES: u8 = 1;
pub const FST: u8 = 2;
pub const SORTED_SET: u8 = 4;
pub const SORTED_SET_SINGLETON: u8 = 5;
pub const SORTED_NUMERIC: u8 = 6;
pub const SORTED_NUMERIC_SINGLETON: u8 = 7;

// numeric compression formats
pub const DELTA_COMPRESSED: u8 = 0;
pub const TABLE_COMPRESSED: u8 = 1;
pub const BLOCK_COMPRESSED: u8 = 2;
pub const GCD_COMPRESSED: u8 = 3;

pub fn segment_file_name(segment: &str, extension: &str) -> String {
    format!("{}.{}", segment, extension)
}

/// Entry point of the memory doc-values format: opens the read side over a
/// segment's metadata/data file pair.
#[derive(Default)]
pub struct MemoryDocValuesFormat;

impl MemoryDocValuesFormat {
    pub fn new() -> MemoryDocValuesFormat {
        MemoryDocValuesFormat
    }

    pub fn fields_producer<D: Directory + ?Sized>(
        &self,
        directory: &D,
        segment: &str,
        max_doc: i32,
    ) -> Result<MemoryDocValuesProducer> {
        MemoryDocValuesProducer::new(directory, segment, max_doc)
    }
}
