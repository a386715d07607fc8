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

use codec::memory::DocValuesTermIterator;
use error::Result;
use util::{BitsMut, DocId};

use std::cmp::Ordering;

/// Sentinel returned by `SortedSetDocValues::next_ord` when a document's
/// ordinal list is exhausted.
pub const NO_MORE_ORDS: i64 = -1;

/// A per-document `i64` accessor. Pure and random-access once built.
pub trait NumericDocValues: Send + Sync {
    fn get(&self, doc_id: DocId) -> Result<i64>;
}

/// A per-document byte-string accessor.
pub trait BinaryDocValues: Send + Sync {
    fn get(&self, doc_id: DocId) -> Result<Vec<u8>>;
}

/// A per-document single term out of a sorted dictionary; documents store
/// the ordinal of their term, missing documents store -1.
pub trait SortedDocValues: BinaryDocValues {
    fn get_ord(&self, doc_id: DocId) -> Result<i32>;

    fn lookup_ord(&self, ord: i32) -> Result<Vec<u8>>;

    fn value_count(&self) -> usize;

    /// Returns the ordinal of `key` if present, otherwise
    /// `-(insertion_point) - 1`. The default walks ordinals by binary
    /// search; dictionary-backed impls override with a term-index seek.
    fn lookup_term(&self, key: &[u8]) -> Result<i64> {
        let mut low = 0i64;
        let mut high = self.value_count() as i64 - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let term = self.lookup_ord(mid as i32)?;
            match term.as_slice().cmp(key) {
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid - 1,
                Ordering::Equal => return Ok(mid),
            }
        }
        Ok(-(low + 1))
    }

    fn term_iterator(&self) -> Result<DocValuesTermIterator>;
}

/// A per-document set of terms out of a shared sorted dictionary. The
/// ordinal cursor is per-accessor state, hence the `&mut self` receivers.
pub trait SortedSetDocValues: Send + Sync {
    fn set_document(&mut self, doc_id: DocId) -> Result<()>;

    /// Next ordinal of the current document in increasing order, or
    /// `NO_MORE_ORDS`.
    fn next_ord(&mut self) -> Result<i64>;

    fn lookup_ord(&self, ord: i64) -> Result<Vec<u8>>;

    fn get_value_count(&self) -> usize;

    fn lookup_term(&self, key: &[u8]) -> Result<i64> {
        let mut low = 0i64;
        let mut high = self.get_value_count() as i64 - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let term = self.lookup_ord(mid)?;
            match term.as_slice().cmp(key) {
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid - 1,
                Ordering::Equal => return Ok(mid),
            }
        }
        Ok(-(low + 1))
    }

    fn term_iterator(&self) -> Result<DocValuesTermIterator>;
}

/// A per-document list of `i64` values.
pub trait SortedNumericDocValues: Send + Sync {
    fn set_document(&mut self, doc_id: DocId) -> Result<()>;

    /// The `index`-th value of the current document.
    fn value_at(&mut self, index: usize) -> Result<i64>;

    /// Number of values for the current document.
    fn count(&self) -> usize;
}

/// Stub for a sorted field whose dictionary holds no terms.
#[derive(Default)]
pub struct EmptySortedDocValues;

impl BinaryDocValues for EmptySortedDocValues {
    fn get(&self, _doc_id: DocId) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

impl SortedDocValues for EmptySortedDocValues {
    fn get_ord(&self, _doc_id: DocId) -> Result<i32> {
        Ok(-1)
    }

    fn lookup_ord(&self, _ord: i32) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn value_count(&self) -> usize {
        0
    }

    fn term_iterator(&self) -> Result<DocValuesTermIterator> {
        Ok(DocValuesTermIterator::empty())
    }
}

/// Stub for a sorted-set field whose dictionary holds no terms.
#[derive(Default)]
pub struct EmptySortedSetDocValues;

impl SortedSetDocValues for EmptySortedSetDocValues {
    fn set_document(&mut self, _doc_id: DocId) -> Result<()> {
        Ok(())
    }

    fn next_ord(&mut self) -> Result<i64> {
        Ok(NO_MORE_ORDS)
    }

    fn lookup_ord(&self, _ord: i64) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn get_value_count(&self) -> usize {
        0
    }

    fn term_iterator(&self) -> Result<DocValuesTermIterator> {
        Ok(DocValuesTermIterator::empty())
    }
}

/// Presents a single-valued dictionary field through the multi-valued
/// interface: each document has zero or one ordinal.
pub struct SingletonSortedSetDocValues {
    dv: Box<dyn SortedDocValues>,
    current_ord: i64,
}

impl SingletonSortedSetDocValues {
    pub fn new(dv: Box<dyn SortedDocValues>) -> SingletonSortedSetDocValues {
        SingletonSortedSetDocValues {
            dv,
            current_ord: NO_MORE_ORDS,
        }
    }
}

impl SortedSetDocValues for SingletonSortedSetDocValues {
    fn set_document(&mut self, doc_id: DocId) -> Result<()> {
        // a missing doc stores -1, which next_ord passes through as the
        // exhaustion sentinel
        self.current_ord = i64::from(self.dv.get_ord(doc_id)?);
        Ok(())
    }

    fn next_ord(&mut self) -> Result<i64> {
        let ord = self.current_ord;
        self.current_ord = NO_MORE_ORDS;
        Ok(ord)
    }

    fn lookup_ord(&self, ord: i64) -> Result<Vec<u8>> {
        self.dv.lookup_ord(ord as i32)
    }

    fn get_value_count(&self) -> usize {
        self.dv.value_count()
    }

    fn lookup_term(&self, key: &[u8]) -> Result<i64> {
        self.dv.lookup_term(key)
    }

    fn term_iterator(&self) -> Result<DocValuesTermIterator> {
        self.dv.term_iterator()
    }
}

/// Presents a single-valued numeric field plus its presence bitmap through
/// the multi-valued numeric interface.
pub struct SingletonSortedNumericDocValues {
    numeric: Box<dyn NumericDocValues>,
    docs_with_field: Box<dyn BitsMut>,
    value: i64,
    count: usize,
}

impl SingletonSortedNumericDocValues {
    pub fn new(
        numeric: Box<dyn NumericDocValues>,
        docs_with_field: Box<dyn BitsMut>,
    ) -> SingletonSortedNumericDocValues {
        SingletonSortedNumericDocValues {
            numeric,
            docs_with_field,
            value: 0,
            count: 0,
        }
    }
}

impl SortedNumericDocValues for SingletonSortedNumericDocValues {
    fn set_document(&mut self, doc_id: DocId) -> Result<()> {
        let value = self.numeric.get(doc_id)?;
        // 0 is both a stored value and the missing-doc default; the bitmap
        // disambiguates
        self.count = if value == 0 && !self.docs_with_field.get(doc_id as usize)? {
            0
        } else {
            1
        };
        self.value = value;
        Ok(())
    }

    fn value_at(&mut self, _index: usize) -> Result<i64> {
        Ok(self.value)
    }

    fn count(&self) -> usize {
        self.count
    }
}

/// Derives a presence bitmap from a sorted field: a document has a value
/// iff its ordinal is non-negative.
pub struct SortedDocsWithField {
    dv: Box<dyn SortedDocValues>,
    max_doc: usize,
}

impl SortedDocsWithField {
    pub fn new(dv: Box<dyn SortedDocValues>, max_doc: usize) -> SortedDocsWithField {
        SortedDocsWithField { dv, max_doc }
    }
}

impl BitsMut for SortedDocsWithField {
    fn get(&mut self, index: usize) -> Result<bool> {
        Ok(self.dv.get_ord(index as DocId)? >= 0)
    }

    fn len(&self) -> usize {
        self.max_doc
    }
}

/// Derives a presence bitmap from a sorted-set field: a document has a
/// value iff its ordinal list is non-empty.
pub struct SortedSetDocsWithField {
    dv: Box<dyn SortedSetDocValues>,
    max_doc: usize,
}

impl SortedSetDocsWithField {
    pub fn new(dv: Box<dyn SortedSetDocValues>, max_doc: usize) -> SortedSetDocsWithField {
        SortedSetDocsWithField { dv, max_doc }
    }
}

impl BitsMut for SortedSetDocsWithField {
    fn get(&mut self, index: usize) -> Result<bool> {
        self.dv.set_document(index as DocId)?;
        Ok(self.dv.next_ord()? != NO_MORE_ORDS)
    }

    fn len(&self) -> usize {
        self.max_doc
    }
}

/// Derives a presence bitmap from a sorted-numeric field: a document has a
/// value iff its value count is positive.
pub struct SortedNumericDocsWithField {
    dv: Box<dyn SortedNumericDocValues>,
    max_doc: usize,
}

impl SortedNumericDocsWithField {
    pub fn new(
        dv: Box<dyn SortedNumericDocValues>,
        max_doc: usize,
    ) -> SortedNumericDocsWithField {
        SortedNumericDocsWithField { dv, max_doc }
    }
}

impl BitsMut for SortedNumericDocsWithField {
    fn get(&mut self, index: usize) -> Result<bool> {
        self.dv.set_document(index as DocId)?;
        Ok(self.dv.count() > 0)
    }

    fn len(&self) -> usize {
        self.max_doc
    }
}
