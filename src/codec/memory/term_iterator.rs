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

use error::ErrorKind::{IllegalState, UnsupportedOperation};
use error::Result;
use util::fst::{BytesRefFstIterator, Fst};

use std::borrow::Cow;
use std::sync::Arc;

/// Outcome of a ceiling seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekStatus {
    /// Positioned past the last term.
    End,
    /// Positioned on the requested term.
    Found,
    /// Positioned on the smallest term greater than the requested one.
    NotFound,
}

/// Ordered term enumerator over a doc-values dictionary, exposing the FST
/// iteration directly so `next` never degrades to repeated lookups.
pub struct DocValuesTermIterator(DocValuesTermIteratorEnum);

enum DocValuesTermIteratorEnum {
    Fst {
        fst: Arc<Fst>,
        iter: BytesRefFstIterator,
        term: Vec<u8>,
        ord: i64,
    },
    Empty,
}

impl DocValuesTermIterator {
    pub fn fst(fst: Arc<Fst>) -> DocValuesTermIterator {
        let iter = BytesRefFstIterator::new(Arc::clone(&fst));
        DocValuesTermIterator(DocValuesTermIteratorEnum::Fst {
            fst,
            iter,
            term: Vec::new(),
            ord: -1,
        })
    }

    pub fn empty() -> DocValuesTermIterator {
        DocValuesTermIterator(DocValuesTermIteratorEnum::Empty)
    }

    /// Moves to the next term in byte order, or None at the end.
    pub fn next(&mut self) -> Result<Option<Vec<u8>>> {
        match self.0 {
            DocValuesTermIteratorEnum::Fst {
                ref mut iter,
                ref mut term,
                ref mut ord,
                ..
            } => match iter.next()? {
                Some((t, o)) => {
                    *term = t.clone();
                    *ord = o;
                    Ok(Some(t))
                }
                None => Ok(None),
            },
            DocValuesTermIteratorEnum::Empty => Ok(None),
        }
    }

    /// Positions on the smallest term >= `text`.
    pub fn seek_ceil(&mut self, text: &[u8]) -> Result<SeekStatus> {
        match self.0 {
            DocValuesTermIteratorEnum::Fst {
                ref mut iter,
                ref mut term,
                ref mut ord,
                ..
            } => match iter.seek_ceil(text)? {
                None => Ok(SeekStatus::End),
                Some((t, o, exact)) => {
                    *term = t;
                    *ord = o;
                    Ok(if exact {
                        SeekStatus::Found
                    } else {
                        SeekStatus::NotFound
                    })
                }
            },
            DocValuesTermIteratorEnum::Empty => Ok(SeekStatus::End),
        }
    }

    pub fn seek_exact(&mut self, text: &[u8]) -> Result<bool> {
        Ok(self.seek_ceil(text)? == SeekStatus::Found)
    }

    /// Positions on the term whose ordinal is `ord`: reconstructs the term
    /// by an output-guided descent, then re-seeks the enumerator to that
    /// exact term so the iteration state stays consistent.
    pub fn seek_exact_ord(&mut self, ord: i64) -> Result<()> {
        match self.0 {
            DocValuesTermIteratorEnum::Fst {
                ref fst,
                ref mut iter,
                ref mut term,
                ord: ref mut current_ord,
            } => {
                let target = fst.get_by_output(ord)?;
                if !iter.seek_exact(&target)? {
                    bail!(IllegalState(format!(
                        "ordinal {} reconstructed a term that is not in the dictionary",
                        ord
                    )));
                }
                *term = target;
                *current_ord = ord;
                Ok(())
            }
            DocValuesTermIteratorEnum::Empty => bail!(IllegalState(format!(
                "ordinal {} out of bounds for an empty dictionary",
                ord
            ))),
        }
    }

    /// The current term; empty before the first positioning call.
    pub fn term(&self) -> &[u8] {
        match self.0 {
            DocValuesTermIteratorEnum::Fst { ref term, .. } => term,
            DocValuesTermIteratorEnum::Empty => &[],
        }
    }

    /// The current ordinal; -1 before the first positioning call.
    pub fn ord(&self) -> i64 {
        match self.0 {
            DocValuesTermIteratorEnum::Fst { ord, .. } => ord,
            DocValuesTermIteratorEnum::Empty => -1,
        }
    }

    // posting-list statistics belong to the inverted index, not doc values

    pub fn doc_freq(&self) -> Result<i32> {
        bail!(UnsupportedOperation(Cow::Borrowed(
            "doc_freq is unsupported for doc-values term iterators"
        )))
    }

    pub fn total_term_freq(&self) -> Result<i64> {
        bail!(UnsupportedOperation(Cow::Borrowed(
            "total_term_freq is unsupported for doc-values term iterators"
        )))
    }

    pub fn postings(&self) -> Result<()> {
        bail!(UnsupportedOperation(Cow::Borrowed(
            "postings are unsupported for doc-values term iterators"
        )))
    }
}
