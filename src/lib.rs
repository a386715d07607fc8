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

//! Read-side decoder for a per-document columnar value store ("doc values")
//! embedded in a search-index segment.
//!
//! The entry point is [`codec::memory::MemoryDocValuesProducer`], which opens the
//! metadata/data file pair of a segment, parses the per-field catalog once,
//! and hands out typed accessors (numeric, binary, sorted, sorted-set,
//! sorted-numeric). Heavyweight in-memory structures (decoded numeric
//! arrays, byte blobs, FSTs, presence bitmaps) are materialized lazily,
//! exactly once per field, and shared by every accessor.

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

extern crate byteorder;
extern crate crc;

pub mod codec;
pub mod error;
pub mod store;
pub mod util;
