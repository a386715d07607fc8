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

//! End-to-end tests of the producer against segments encoded by a minimal
//! in-test writer that emits the exact on-disk layout.

extern crate docvalues;
extern crate rand;

use docvalues::codec::codec_util;
use docvalues::codec::memory::{
    MemoryDocValuesFormat, MemoryDocValuesProducer, SeekStatus, BLOCK_COMPRESSED, BYTES,
    DATA_CODEC, DELTA_COMPRESSED, FST, GCD_COMPRESSED, METADATA_CODEC, NUMBER, SORTED_NUMERIC,
    SORTED_NUMERIC_SINGLETON, SORTED_SET, SORTED_SET_SINGLETON, TABLE_COMPRESSED, VERSION_CURRENT,
};
use docvalues::codec::{DocValuesType, FieldInfo, NO_MORE_ORDS};
use docvalues::error::ErrorKind;
use docvalues::store::{DataOutput, Directory, IndexOutput, RamDirectory, RamOutput};
use docvalues::util::fst::FstBuilder;
use docvalues::util::packed::{self, BlockPackedWriter, MonotonicBlockPackedWriter};
use docvalues::util::FixedBitSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::sync::Arc;
use std::thread;

const SEGMENT: &str = "seg";
const DATA_FILE: &str = "seg.dvd";
const META_FILE: &str = "seg.dvm";
const TEST_BLOCK_SIZE: usize = 64;

fn push_vlong(buf: &mut Vec<u8>, mut v: u64) {
    while v & !0x7f != 0 {
        buf.push((v & 0x7f) as u8 | 0x80);
        v >>= 7;
    }
    buf.push(v as u8);
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Writes a metadata/data file pair the way the production encoder lays
/// them out.
struct SegmentEncoder {
    dir: RamDirectory,
    data: RamOutput,
    meta: RamOutput,
    max_doc: usize,
}

impl SegmentEncoder {
    fn new(max_doc: usize) -> SegmentEncoder {
        let dir = RamDirectory::new();
        let mut data = dir.create_output(DATA_FILE);
        codec_util::write_header(&mut data, DATA_CODEC, VERSION_CURRENT).unwrap();
        let mut meta = dir.create_output(META_FILE);
        codec_util::write_header(&mut meta, METADATA_CODEC, VERSION_CURRENT).unwrap();
        SegmentEncoder {
            dir,
            data,
            meta,
            max_doc,
        }
    }

    fn finish(self) -> RamDirectory {
        let SegmentEncoder {
            dir,
            mut data,
            mut meta,
            ..
        } = self;
        meta.write_vint(-1).unwrap();
        codec_util::write_footer(&mut meta).unwrap();
        meta.close().unwrap();
        codec_util::write_footer(&mut data).unwrap();
        data.close().unwrap();
        dir
    }

    /// Writes the presence bitmap at the current data position if any doc
    /// is missing, returning (missing_offset, missing_bytes).
    fn write_missing(&mut self, present: &[bool]) -> (i64, i64) {
        if present.iter().all(|&p| p) {
            return (-1, 0);
        }
        let offset = self.data.file_pointer();
        let mut bits = FixedBitSet::new(self.max_doc);
        for (doc, &p) in present.iter().enumerate() {
            if p {
                bits.set(doc);
            }
        }
        for &word in bits.as_words() {
            self.data.write_long(word).unwrap();
        }
        (offset, (bits.as_words().len() * 8) as i64)
    }

    fn add_numeric(&mut self, field_number: i32, values: &[Option<i64>], format: u8) {
        assert_eq!(values.len(), self.max_doc);
        let offset = self.data.file_pointer();
        let present: Vec<bool> = values.iter().map(|v| v.is_some()).collect();
        let (missing_offset, missing_bytes) = self.write_missing(&present);
        let filled: Vec<i64> = values.iter().map(|v| v.unwrap_or(0)).collect();

        match format {
            DELTA_COMPRESSED => {
                let min = filled.iter().fold(i64::max_value(), |m, &v| m.min(v));
                let deltas: Vec<u64> = filled.iter().map(|&v| v.wrapping_sub(min) as u64).collect();
                let max_delta = deltas.iter().fold(0u64, |m, &d| m.max(d));
                let bpv = packed::bits_required(max_delta);
                self.data.write_long(min).unwrap();
                self.data.write_vint(packed::Format::Packed.get_id()).unwrap();
                self.data.write_vint(bpv).unwrap();
                packed::write_no_header(&mut self.data, &deltas, bpv).unwrap();
            }
            TABLE_COMPRESSED => {
                let mut table = filled.clone();
                table.sort();
                table.dedup();
                self.data.write_vint(table.len() as i32).unwrap();
                for &v in &table {
                    self.data.write_long(v).unwrap();
                }
                let ords: Vec<u64> = filled
                    .iter()
                    .map(|v| table.binary_search(v).unwrap() as u64)
                    .collect();
                let bpv = packed::bits_required(table.len() as u64 - 1);
                self.data.write_vint(packed::Format::Packed.get_id()).unwrap();
                self.data.write_vint(bpv).unwrap();
                packed::write_no_header(&mut self.data, &ords, bpv).unwrap();
            }
            GCD_COMPRESSED => {
                let min = filled.iter().fold(i64::max_value(), |m, &v| m.min(v));
                let mut mult = 0u64;
                for &v in &filled {
                    mult = gcd(mult, v.wrapping_sub(min) as u64);
                }
                if mult == 0 {
                    mult = 1;
                }
                let quotients: Vec<u64> = filled
                    .iter()
                    .map(|&v| v.wrapping_sub(min) as u64 / mult)
                    .collect();
                let max_q = quotients.iter().fold(0u64, |m, &q| m.max(q));
                let bpv = packed::bits_required(max_q);
                self.data.write_long(min).unwrap();
                self.data.write_long(mult as i64).unwrap();
                self.data.write_vint(packed::Format::Packed.get_id()).unwrap();
                self.data.write_vint(bpv).unwrap();
                packed::write_no_header(&mut self.data, &quotients, bpv).unwrap();
            }
            BLOCK_COMPRESSED => {
                self.data.write_vint(TEST_BLOCK_SIZE as i32).unwrap();
                let mut writer = BlockPackedWriter::new(TEST_BLOCK_SIZE).unwrap();
                for &v in &filled {
                    writer.add(v, &mut self.data).unwrap();
                }
                writer.finish(&mut self.data).unwrap();
            }
            _ => panic!("unsupported format {}", format),
        }

        self.meta.write_vint(field_number).unwrap();
        self.meta.write_byte(NUMBER).unwrap();
        self.meta.write_long(offset).unwrap();
        self.meta.write_long(missing_offset).unwrap();
        if missing_offset != -1 {
            self.meta.write_long(missing_bytes).unwrap();
        }
        self.meta.write_byte(format).unwrap();
        self.meta.write_vint(packed::VERSION_CURRENT).unwrap();
        self.meta.write_long(values.len() as i64).unwrap();
    }

    fn add_binary(&mut self, field_number: i32, values: &[Option<Vec<u8>>]) {
        assert_eq!(values.len(), self.max_doc);
        let offset = self.data.file_pointer();
        let mut num_bytes = 0i64;
        for value in values.iter().flatten() {
            self.data.write_bytes(value).unwrap();
            num_bytes += value.len() as i64;
        }
        let present: Vec<bool> = values.iter().map(|v| v.is_some()).collect();
        let (missing_offset, missing_bytes) = self.write_missing(&present);

        let lengths: Vec<usize> = values
            .iter()
            .map(|v| v.as_ref().map_or(0, |v| v.len()))
            .collect();
        let min_length = lengths.iter().cloned().min().unwrap_or(0);
        let max_length = lengths.iter().cloned().max().unwrap_or(0);
        if min_length != max_length {
            let mut writer = MonotonicBlockPackedWriter::new(TEST_BLOCK_SIZE).unwrap();
            let mut end = 0i64;
            for &length in &lengths {
                end += length as i64;
                writer.add(end, &mut self.data).unwrap();
            }
            writer.finish(&mut self.data).unwrap();
        }

        self.meta.write_vint(field_number).unwrap();
        self.meta.write_byte(BYTES).unwrap();
        self.meta.write_long(offset).unwrap();
        self.meta.write_long(num_bytes).unwrap();
        self.meta.write_long(missing_offset).unwrap();
        if missing_offset != -1 {
            self.meta.write_long(missing_bytes).unwrap();
        }
        self.meta.write_vint(min_length as i32).unwrap();
        self.meta.write_vint(max_length as i32).unwrap();
        if min_length != max_length {
            self.meta.write_vint(packed::VERSION_CURRENT).unwrap();
            self.meta.write_vint(TEST_BLOCK_SIZE as i32).unwrap();
        }
    }

    fn add_fst(&mut self, field_number: i32, terms: &[&[u8]]) {
        let offset = self.data.file_pointer();
        if !terms.is_empty() {
            let mut builder = FstBuilder::new();
            for (ord, term) in terms.iter().enumerate() {
                builder.add(term, ord as i64).unwrap();
            }
            builder.finish().unwrap().save(&mut self.data).unwrap();
        }
        self.meta.write_vint(field_number).unwrap();
        self.meta.write_byte(FST).unwrap();
        self.meta.write_long(offset).unwrap();
        self.meta.write_vlong(terms.len() as i64).unwrap();
    }

    /// Sorted field: a term dictionary plus a per-doc ordinal column where
    /// a missing doc stores -1.
    fn add_sorted(&mut self, field_number: i32, terms: &[&[u8]], doc_ords: &[i32]) {
        self.add_fst(field_number, terms);
        let ords: Vec<Option<i64>> = doc_ords.iter().map(|&ord| Some(i64::from(ord))).collect();
        self.add_numeric(field_number, &ords, DELTA_COMPRESSED);
    }

    fn add_sorted_set(&mut self, field_number: i32, terms: &[&[u8]], doc_ords: &[Vec<i64>]) {
        self.meta.write_vint(field_number).unwrap();
        self.meta.write_byte(SORTED_SET).unwrap();
        self.add_fst(field_number, terms);
        let blobs: Vec<Option<Vec<u8>>> = doc_ords
            .iter()
            .map(|ords| {
                let mut blob = Vec::new();
                let mut previous = 0i64;
                for &ord in ords {
                    push_vlong(&mut blob, (ord - previous) as u64);
                    previous = ord;
                }
                Some(blob)
            })
            .collect();
        self.add_binary(field_number, &blobs);
    }

    fn add_sorted_set_singleton(&mut self, field_number: i32, terms: &[&[u8]], doc_ords: &[i32]) {
        self.meta.write_vint(field_number).unwrap();
        self.meta.write_byte(SORTED_SET_SINGLETON).unwrap();
        self.add_sorted(field_number, terms, doc_ords);
    }

    fn add_sorted_numeric(&mut self, field_number: i32, doc_values: &[Vec<i64>]) {
        assert_eq!(doc_values.len(), self.max_doc);
        let address_offset = self.data.file_pointer();
        let mut writer = MonotonicBlockPackedWriter::new(TEST_BLOCK_SIZE).unwrap();
        let mut end = 0i64;
        writer.add(0, &mut self.data).unwrap();
        for values in doc_values {
            end += values.len() as i64;
            writer.add(end, &mut self.data).unwrap();
        }
        writer.finish(&mut self.data).unwrap();

        self.meta.write_vint(field_number).unwrap();
        self.meta.write_byte(SORTED_NUMERIC).unwrap();
        self.meta.write_vint(packed::VERSION_CURRENT).unwrap();
        self.meta.write_vint(TEST_BLOCK_SIZE as i32).unwrap();
        self.meta.write_long(address_offset).unwrap();
        self.meta.write_long(self.max_doc as i64 + 1).unwrap();

        let flattened: Vec<Option<i64>> = doc_values
            .iter()
            .flat_map(|values| values.iter().map(|&v| Some(v)))
            .collect();
        // the flattened column has one entry per value, not per doc
        let offset = self.data.file_pointer();
        let filled: Vec<i64> = flattened.iter().map(|v| v.unwrap_or(0)).collect();
        let min = filled.iter().fold(i64::max_value(), |m, &v| m.min(v));
        let deltas: Vec<u64> = filled.iter().map(|&v| v.wrapping_sub(min) as u64).collect();
        let max_delta = deltas.iter().fold(0u64, |m, &d| m.max(d));
        let bpv = packed::bits_required(max_delta);
        self.data.write_long(min).unwrap();
        self.data.write_vint(packed::Format::Packed.get_id()).unwrap();
        self.data.write_vint(bpv).unwrap();
        packed::write_no_header(&mut self.data, &deltas, bpv).unwrap();

        self.meta.write_vint(field_number).unwrap();
        self.meta.write_byte(NUMBER).unwrap();
        self.meta.write_long(offset).unwrap();
        self.meta.write_long(-1).unwrap();
        self.meta.write_byte(DELTA_COMPRESSED).unwrap();
        self.meta.write_vint(packed::VERSION_CURRENT).unwrap();
        self.meta.write_long(filled.len() as i64).unwrap();
    }

    fn add_sorted_numeric_singleton(&mut self, field_number: i32, values: &[Option<i64>]) {
        self.meta.write_vint(field_number).unwrap();
        self.meta.write_byte(SORTED_NUMERIC_SINGLETON).unwrap();
        self.add_numeric(field_number, values, DELTA_COMPRESSED);
    }
}

fn open(dir: &RamDirectory, max_doc: i32) -> MemoryDocValuesProducer {
    MemoryDocValuesFormat::new()
        .fields_producer(dir, SEGMENT, max_doc)
        .unwrap()
}

fn numeric_round_trip(values: &[Option<i64>], format: u8) {
    let mut encoder = SegmentEncoder::new(values.len());
    encoder.add_numeric(0, values, format);
    let dir = encoder.finish();

    let producer = open(&dir, values.len() as i32);
    let field = FieldInfo::new("num", 0, DocValuesType::Numeric);
    let dv = producer.get_numeric(&field).unwrap();
    let mut docs_with_field = producer.get_docs_with_field(&field).unwrap();
    for (doc, value) in values.iter().enumerate() {
        match *value {
            Some(v) => {
                assert_eq!(dv.get(doc as i32).unwrap(), v, "doc {}", doc);
                assert!(docs_with_field.get(doc).unwrap());
            }
            None => {
                assert_eq!(dv.get(doc as i32).unwrap(), 0);
                assert!(!docs_with_field.get(doc).unwrap());
            }
        }
    }
}

#[test]
fn delta_numeric_with_negatives_and_extremes() {
    let values: Vec<Option<i64>> = vec![
        Some(i64::min_value()),
        Some(i64::max_value()),
        Some(0),
        Some(-42),
        Some(7),
    ];
    numeric_round_trip(&values, DELTA_COMPRESSED);
}

#[test]
fn table_numeric_round_trip() {
    let palette = [-3i64, 0, 14, 1 << 40];
    let values: Vec<Option<i64>> = (0..257).map(|i| Some(palette[i % palette.len()])).collect();
    numeric_round_trip(&values, TABLE_COMPRESSED);
}

#[test]
fn gcd_numeric_round_trip() {
    let values: Vec<Option<i64>> = (0..200)
        .map(|i| Some(1_000_000_007 + i as i64 * 4096))
        .collect();
    numeric_round_trip(&values, GCD_COMPRESSED);
}

#[test]
fn block_numeric_round_trip_random() {
    let mut rng = StdRng::seed_from_u64(42);
    let values: Vec<Option<i64>> = (0..1000).map(|_| Some(rng.gen::<i64>())).collect();
    numeric_round_trip(&values, BLOCK_COMPRESSED);
}

#[test]
fn numeric_with_missing_docs() {
    let values: Vec<Option<i64>> = (0..100)
        .map(|i| if i % 3 == 0 { None } else { Some(i as i64 * 11) })
        .collect();
    numeric_round_trip(&values, DELTA_COMPRESSED);
}

#[test]
fn fully_present_numeric_synthesizes_all_set_bitmap() {
    let values: Vec<Option<i64>> = (0..10).map(|i| Some(i as i64)).collect();
    let mut encoder = SegmentEncoder::new(values.len());
    encoder.add_numeric(0, &values, DELTA_COMPRESSED);
    let dir = encoder.finish();

    let producer = open(&dir, values.len() as i32);
    let field = FieldInfo::new("num", 0, DocValuesType::Numeric);
    let before = producer.decode_count();
    let mut docs_with_field = producer.get_docs_with_field(&field).unwrap();
    for doc in 0..values.len() {
        assert!(docs_with_field.get(doc).unwrap());
    }
    // the all-set bitmap is synthesized, never decoded from the file
    assert_eq!(producer.decode_count(), before);
}

#[test]
fn oversized_table_dictionary_is_rejected() {
    let dir = RamDirectory::new();
    let mut data = dir.create_output(DATA_FILE);
    codec_util::write_header(&mut data, DATA_CODEC, VERSION_CURRENT).unwrap();
    let offset = data.file_pointer();
    data.write_vint(257).unwrap();
    codec_util::write_footer(&mut data).unwrap();
    data.close().unwrap();

    let mut meta = dir.create_output(META_FILE);
    codec_util::write_header(&mut meta, METADATA_CODEC, VERSION_CURRENT).unwrap();
    meta.write_vint(0).unwrap();
    meta.write_byte(NUMBER).unwrap();
    meta.write_long(offset).unwrap();
    meta.write_long(-1).unwrap();
    meta.write_byte(TABLE_COMPRESSED).unwrap();
    meta.write_vint(packed::VERSION_CURRENT).unwrap();
    meta.write_long(1).unwrap();
    meta.write_vint(-1).unwrap();
    codec_util::write_footer(&mut meta).unwrap();
    meta.close().unwrap();

    let producer = open(&dir, 1);
    let field = FieldInfo::new("num", 0, DocValuesType::Numeric);
    let err = match producer.get_numeric(&field) {
        Ok(_) => panic!("a 257-entry table dictionary must be rejected"),
        Err(err) => err,
    };
    match *err.kind() {
        ErrorKind::CorruptFormat(_) => {}
        ref kind => panic!("unexpected error kind: {:?}", kind),
    }
}

#[test]
fn unknown_catalog_tag_is_rejected() {
    let dir = RamDirectory::new();
    let mut data = dir.create_output(DATA_FILE);
    codec_util::write_header(&mut data, DATA_CODEC, VERSION_CURRENT).unwrap();
    codec_util::write_footer(&mut data).unwrap();
    data.close().unwrap();

    let mut meta = dir.create_output(META_FILE);
    codec_util::write_header(&mut meta, METADATA_CODEC, VERSION_CURRENT).unwrap();
    meta.write_vint(0).unwrap();
    meta.write_byte(3).unwrap();
    meta.write_vint(-1).unwrap();
    codec_util::write_footer(&mut meta).unwrap();
    meta.close().unwrap();

    let err = match MemoryDocValuesFormat::new().fields_producer(&dir, SEGMENT, 1) {
        Ok(_) => panic!("a catalog with an unknown type tag must be rejected"),
        Err(err) => err,
    };
    match *err.kind() {
        // the message names the offending tag and where it sits in the stream
        ErrorKind::CorruptFormat(ref msg) => {
            assert!(
                msg.contains("invalid entry type: 3"),
                "message should name the tag: {}",
                msg
            );
            assert!(
                msg.contains("input pos"),
                "message should name the stream position: {}",
                msg
            );
        }
        ref kind => panic!("unexpected error kind: {:?}", kind),
    }
}

#[test]
fn fixed_width_binary_round_trip() {
    let values: Vec<Option<Vec<u8>>> = (0..50u8).map(|i| Some(vec![i, i ^ 0xff, 7])).collect();
    let mut encoder = SegmentEncoder::new(values.len());
    encoder.add_binary(0, &values);
    let dir = encoder.finish();

    let producer = open(&dir, values.len() as i32);
    let field = FieldInfo::new("bin", 0, DocValuesType::Binary);
    let dv = producer.get_binary(&field).unwrap();
    for (doc, value) in values.iter().enumerate() {
        assert_eq!(&dv.get(doc as i32).unwrap(), value.as_ref().unwrap());
    }
}

#[test]
fn variable_width_binary_with_missing_docs() {
    let values: Vec<Option<Vec<u8>>> = vec![
        Some(b"alpha".to_vec()),
        None,
        Some(Vec::new()),
        Some(b"delta-delta".to_vec()),
        Some(b"e".to_vec()),
    ];
    let mut encoder = SegmentEncoder::new(values.len());
    encoder.add_binary(0, &values);
    let dir = encoder.finish();

    let producer = open(&dir, values.len() as i32);
    let field = FieldInfo::new("bin", 0, DocValuesType::Binary);
    let dv = producer.get_binary(&field).unwrap();
    let mut docs_with_field = producer.get_docs_with_field(&field).unwrap();
    for (doc, value) in values.iter().enumerate() {
        match *value {
            Some(ref v) => {
                assert_eq!(&dv.get(doc as i32).unwrap(), v, "doc {}", doc);
                assert!(docs_with_field.get(doc).unwrap());
            }
            None => {
                assert!(dv.get(doc as i32).unwrap().is_empty());
                assert!(!docs_with_field.get(doc).unwrap());
            }
        }
    }
}

#[test]
fn sorted_ordinals_and_term_lookup() {
    let terms: Vec<&[u8]> = vec![b"apple", b"banana", b"cherry"];
    let doc_ords = [1, -1, 0, 2, 1];
    let mut encoder = SegmentEncoder::new(doc_ords.len());
    encoder.add_sorted(0, &terms, &doc_ords);
    let dir = encoder.finish();

    let producer = open(&dir, doc_ords.len() as i32);
    let field = FieldInfo::new("sorted", 0, DocValuesType::Sorted);
    let dv = producer.get_sorted(&field).unwrap();
    assert_eq!(dv.value_count(), terms.len());
    for (doc, &ord) in doc_ords.iter().enumerate() {
        assert_eq!(dv.get_ord(doc as i32).unwrap(), ord, "doc {}", doc);
    }
    for (ord, term) in terms.iter().enumerate() {
        assert_eq!(dv.lookup_ord(ord as i32).unwrap(), term.to_vec());
    }

    // exact hits return the ordinal, misses the encoded insertion point
    assert_eq!(dv.lookup_term(b"banana").unwrap(), 1);
    assert_eq!(dv.lookup_term(b"aaa").unwrap(), -1);
    assert_eq!(dv.lookup_term(b"blueberry").unwrap(), -3);
    assert_eq!(dv.lookup_term(b"zzz").unwrap(), -4);

    let mut docs_with_field = producer.get_docs_with_field(&field).unwrap();
    assert!(docs_with_field.get(0).unwrap());
    assert!(!docs_with_field.get(1).unwrap());
}

#[test]
fn sorted_term_iterator_walks_and_seeks() {
    let terms: Vec<&[u8]> = vec![b"ant", b"bee", b"cow", b"eel"];
    let doc_ords = [0, 1, 2, 3];
    let mut encoder = SegmentEncoder::new(doc_ords.len());
    encoder.add_sorted(0, &terms, &doc_ords);
    let dir = encoder.finish();

    let producer = open(&dir, doc_ords.len() as i32);
    let field = FieldInfo::new("sorted", 0, DocValuesType::Sorted);
    let dv = producer.get_sorted(&field).unwrap();

    let mut iter = dv.term_iterator().unwrap();
    for term in &terms {
        assert_eq!(iter.next().unwrap().unwrap(), term.to_vec());
    }
    assert!(iter.next().unwrap().is_none());

    let mut iter = dv.term_iterator().unwrap();
    assert_eq!(iter.seek_ceil(b"bee").unwrap(), SeekStatus::Found);
    assert_eq!(iter.ord(), 1);
    assert_eq!(iter.seek_ceil(b"dog").unwrap(), SeekStatus::NotFound);
    assert_eq!(iter.term(), b"eel");
    assert_eq!(iter.seek_ceil(b"fox").unwrap(), SeekStatus::End);

    iter.seek_exact_ord(2).unwrap();
    assert_eq!(iter.term(), b"cow");
    assert_eq!(iter.next().unwrap().unwrap(), b"eel".to_vec());
}

#[test]
fn sorted_field_with_empty_dictionary() {
    let doc_ords = [-1, -1, -1];
    let mut encoder = SegmentEncoder::new(doc_ords.len());
    encoder.add_sorted(0, &[], &doc_ords);
    let dir = encoder.finish();

    let producer = open(&dir, doc_ords.len() as i32);
    let field = FieldInfo::new("sorted", 0, DocValuesType::Sorted);
    let dv = producer.get_sorted(&field).unwrap();
    assert_eq!(dv.value_count(), 0);
    assert_eq!(dv.get_ord(0).unwrap(), -1);
    let mut iter = dv.term_iterator().unwrap();
    assert!(iter.next().unwrap().is_none());
}

#[test]
fn sorted_set_per_document_ordinal_lists() {
    let terms: Vec<&[u8]> = vec![b"apple", b"banana", b"cherry", b"date", b"fig", b"grape"];
    // doc 3 stores the deltas [3, 2], which decode to the ordinals [3, 5]
    let doc_ords = vec![vec![0, 2], vec![], vec![1, 2], vec![3, 5]];
    let mut encoder = SegmentEncoder::new(doc_ords.len());
    encoder.add_sorted_set(0, &terms, &doc_ords);
    let dir = encoder.finish();

    let producer = open(&dir, doc_ords.len() as i32);
    let field = FieldInfo::new("set", 0, DocValuesType::SortedSet);
    let mut dv = producer.get_sorted_set(&field).unwrap();
    assert_eq!(dv.get_value_count(), terms.len());
    for (doc, ords) in doc_ords.iter().enumerate() {
        dv.set_document(doc as i32).unwrap();
        for &ord in ords {
            assert_eq!(dv.next_ord().unwrap(), ord, "doc {}", doc);
        }
        assert_eq!(dv.next_ord().unwrap(), NO_MORE_ORDS);
    }
    assert_eq!(dv.lookup_ord(2).unwrap(), b"cherry".to_vec());
    assert_eq!(dv.lookup_term(b"banana").unwrap(), 1);
    assert_eq!(dv.lookup_term(b"berry").unwrap(), -3);

    let mut docs_with_field = producer.get_docs_with_field(&field).unwrap();
    assert!(docs_with_field.get(0).unwrap());
    assert!(!docs_with_field.get(1).unwrap());
    assert!(docs_with_field.get(2).unwrap());
}

#[test]
fn singleton_sorted_set_adapts_sorted_field() {
    let terms: Vec<&[u8]> = vec![b"x", b"y"];
    let doc_ords = [1, -1, 0];
    let mut encoder = SegmentEncoder::new(doc_ords.len());
    encoder.add_sorted_set_singleton(0, &terms, &doc_ords);
    let dir = encoder.finish();

    let producer = open(&dir, doc_ords.len() as i32);
    let field = FieldInfo::new("set", 0, DocValuesType::SortedSet);
    let mut dv = producer.get_sorted_set(&field).unwrap();
    assert_eq!(dv.get_value_count(), 2);

    dv.set_document(0).unwrap();
    assert_eq!(dv.next_ord().unwrap(), 1);
    assert_eq!(dv.next_ord().unwrap(), NO_MORE_ORDS);

    dv.set_document(1).unwrap();
    assert_eq!(dv.next_ord().unwrap(), NO_MORE_ORDS);

    dv.set_document(2).unwrap();
    assert_eq!(dv.next_ord().unwrap(), 0);
    assert_eq!(dv.next_ord().unwrap(), NO_MORE_ORDS);
}

#[test]
fn sorted_numeric_per_document_value_lists() {
    let doc_values = vec![vec![3], vec![], vec![10, 20, 30]];
    let mut encoder = SegmentEncoder::new(doc_values.len());
    encoder.add_sorted_numeric(0, &doc_values);
    let dir = encoder.finish();

    let producer = open(&dir, doc_values.len() as i32);
    let field = FieldInfo::new("sn", 0, DocValuesType::SortedNumeric);
    let mut dv = producer.get_sorted_numeric(&field).unwrap();
    for (doc, values) in doc_values.iter().enumerate() {
        dv.set_document(doc as i32).unwrap();
        assert_eq!(dv.count(), values.len(), "doc {}", doc);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(dv.value_at(i).unwrap(), v);
        }
    }

    let mut docs_with_field = producer.get_docs_with_field(&field).unwrap();
    assert!(docs_with_field.get(0).unwrap());
    assert!(!docs_with_field.get(1).unwrap());
    assert!(docs_with_field.get(2).unwrap());
}

#[test]
fn singleton_sorted_numeric_distinguishes_stored_zero_from_missing() {
    let values = vec![Some(5), None, Some(0)];
    let mut encoder = SegmentEncoder::new(values.len());
    encoder.add_sorted_numeric_singleton(0, &values);
    let dir = encoder.finish();

    let producer = open(&dir, values.len() as i32);
    let field = FieldInfo::new("sn", 0, DocValuesType::SortedNumeric);
    let mut dv = producer.get_sorted_numeric(&field).unwrap();

    dv.set_document(0).unwrap();
    assert_eq!(dv.count(), 1);
    assert_eq!(dv.value_at(0).unwrap(), 5);

    dv.set_document(1).unwrap();
    assert_eq!(dv.count(), 0);

    dv.set_document(2).unwrap();
    assert_eq!(dv.count(), 1);
    assert_eq!(dv.value_at(0).unwrap(), 0);
}

#[test]
fn each_field_structure_decodes_exactly_once() {
    let values: Vec<Option<i64>> = (0..100).map(|i| Some(i as i64 * 3)).collect();
    let terms: Vec<&[u8]> = vec![b"a", b"b"];
    let doc_ords: Vec<i32> = (0..100).map(|i| (i % 2) as i32).collect();

    let mut encoder = SegmentEncoder::new(values.len());
    encoder.add_numeric(0, &values, DELTA_COMPRESSED);
    encoder.add_sorted(1, &terms, &doc_ords);
    let dir = encoder.finish();

    let producer = open(&dir, values.len() as i32);
    let num_field = FieldInfo::new("num", 0, DocValuesType::Numeric);
    let sorted_field = FieldInfo::new("sorted", 1, DocValuesType::Sorted);

    assert_eq!(producer.decode_count(), 0);
    producer.get_numeric(&num_field).unwrap();
    assert_eq!(producer.decode_count(), 1);
    producer.get_numeric(&num_field).unwrap();
    assert_eq!(producer.decode_count(), 1);

    // a sorted field loads its dictionary and its ordinal column
    producer.get_sorted(&sorted_field).unwrap();
    assert_eq!(producer.decode_count(), 3);
    producer.get_sorted(&sorted_field).unwrap();
    producer.get_sorted(&sorted_field).unwrap().term_iterator().unwrap();
    assert_eq!(producer.decode_count(), 3);

    assert!(producer.ram_bytes_used() > 0);
}

#[test]
fn concurrent_accessors_share_one_decode() {
    let values: Vec<Option<i64>> = (0..5000).map(|i| Some(i as i64 * 7 - 1000)).collect();
    let mut encoder = SegmentEncoder::new(values.len());
    encoder.add_numeric(0, &values, DELTA_COMPRESSED);
    let dir = encoder.finish();

    let producer = Arc::new(open(&dir, values.len() as i32));
    let expected = Arc::new(values);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let producer = Arc::clone(&producer);
        let expected = Arc::clone(&expected);
        handles.push(thread::spawn(move || {
            let field = FieldInfo::new("num", 0, DocValuesType::Numeric);
            let dv = producer.get_numeric(&field).unwrap();
            for (doc, value) in expected.iter().enumerate() {
                assert_eq!(dv.get(doc as i32).unwrap(), value.unwrap());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(producer.decode_count(), 1);
}

#[test]
fn check_integrity_detects_data_corruption() {
    let values: Vec<Option<i64>> = (0..100).map(|i| Some(i as i64)).collect();
    let mut encoder = SegmentEncoder::new(values.len());
    encoder.add_numeric(0, &values, DELTA_COMPRESSED);
    let dir = encoder.finish();

    // flip one payload byte of the data file, leaving the footer intact
    let mut bytes = Vec::new();
    {
        let mut input = dir.open_input(DATA_FILE).unwrap();
        bytes.resize(input.len() as usize, 0);
        input.read_exact_bytes(&mut bytes).unwrap();
    }
    let flip = codec_util::header_length(DATA_CODEC) + 3;
    bytes[flip] ^= 0x10;
    let mut out = dir.create_output(DATA_FILE);
    out.write_bytes(&bytes).unwrap();
    out.close().unwrap();

    // the open-time check only validates framing, so this still succeeds
    let producer = open(&dir, values.len() as i32);
    let err = producer.check_integrity().unwrap_err();
    match *err.kind() {
        ErrorKind::Integrity(_) => {}
        ref kind => panic!("unexpected error kind: {:?}", kind),
    }
}
