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

use error::ErrorKind::IllegalState;
use error::Result;
use util::fst::{Fst, FstArc};

use std::sync::Arc;

struct Frame {
    arcs: Vec<FstArc>,
    idx: usize,
    base: i64,
}

/// Enumerates the terms of an `Fst` in byte order, also supporting ceiling
/// seeks. When positioned, the top frame's current arc is the final arc of
/// the current term and `term` holds the labels of the path.
pub struct BytesRefFstIterator {
    fst: Arc<Fst>,
    stack: Vec<Frame>,
    term: Vec<u8>,
    current_ord: i64,
    started: bool,
    on_empty: bool,
    done: bool,
}

impl BytesRefFstIterator {
    pub fn new(fst: Arc<Fst>) -> BytesRefFstIterator {
        BytesRefFstIterator {
            fst,
            stack: Vec::new(),
            term: Vec::new(),
            current_ord: -1,
            started: false,
            on_empty: false,
            done: false,
        }
    }

    pub fn term(&self) -> &[u8] {
        &self.term
    }

    pub fn ord(&self) -> i64 {
        self.current_ord
    }

    fn reset(&mut self) -> Result<()> {
        let root = self.fst.start_node();
        let arcs = self.fst.read_arcs(root)?;
        self.stack.clear();
        self.stack.push(Frame {
            arcs,
            idx: 0,
            base: 0,
        });
        self.term.clear();
        self.current_ord = -1;
        self.started = true;
        self.on_empty = false;
        self.done = false;
        Ok(())
    }

    /// Advances to the next term, or None when exhausted.
    pub fn next(&mut self) -> Result<Option<(Vec<u8>, i64)>> {
        if self.done {
            return Ok(None);
        }
        if !self.started {
            self.reset()?;
            if let Some(empty) = self.fst.empty_output() {
                self.on_empty = true;
                self.current_ord = empty;
                return Ok(Some((Vec::new(), empty)));
            }
            return self.descend_first();
        }
        if self.on_empty {
            self.on_empty = false;
            return self.descend_first();
        }
        let (target, accum) = {
            let top = match self.stack.last() {
                Some(top) => top,
                None => bail!(IllegalState("fst iterator is not positioned".into())),
            };
            let arc = &top.arcs[top.idx];
            (arc.target, top.base + arc.output)
        };
        match target {
            Some(t) => {
                let arcs = self.fst.read_arcs(t)?;
                self.stack.push(Frame {
                    arcs,
                    idx: 0,
                    base: accum,
                });
                self.descend_first()
            }
            None => self.next_sibling(),
        }
    }

    /// Positions on the smallest term >= `target`. Returns the term, its
    /// ordinal and whether the match is exact, or None when every term is
    /// smaller than `target`.
    pub fn seek_ceil(&mut self, target: &[u8]) -> Result<Option<(Vec<u8>, i64, bool)>> {
        self.reset()?;
        if target.is_empty() {
            if let Some(empty) = self.fst.empty_output() {
                self.on_empty = true;
                self.current_ord = empty;
                return Ok(Some((Vec::new(), empty, true)));
            }
            return Ok(self.descend_first()?.map(|(t, ord)| (t, ord, false)));
        }
        for (i, &label) in target.iter().enumerate() {
            let j = {
                let top = match self.stack.last() {
                    Some(top) => top,
                    None => bail!(IllegalState("fst iterator is not positioned".into())),
                };
                top.arcs.iter().position(|a| a.label >= label)
            };
            let j = match j {
                // every arc sorts below the target byte; the successor
                // lives above this node
                None => {
                    self.stack.pop();
                    if self.stack.is_empty() {
                        self.done = true;
                        return Ok(None);
                    }
                    return Ok(self.next_sibling()?.map(|(t, ord)| (t, ord, false)));
                }
                Some(j) => j,
            };
            let (arc, accum) = {
                let top = match self.stack.last_mut() {
                    Some(top) => top,
                    None => bail!(IllegalState("fst iterator is not positioned".into())),
                };
                top.idx = j;
                let arc = top.arcs[j].clone();
                let accum = top.base + arc.output;
                (arc, accum)
            };
            if arc.label > label {
                // branched above the target byte; the subtree minimum is
                // the ceiling
                return Ok(self.descend_first()?.map(|(t, ord)| (t, ord, false)));
            }
            self.term.push(arc.label);
            if i + 1 == target.len() {
                if arc.is_final {
                    self.current_ord = accum;
                    return Ok(Some((self.term.clone(), accum, true)));
                }
                match arc.target {
                    Some(t) => {
                        let arcs = self.fst.read_arcs(t)?;
                        self.stack.push(Frame {
                            arcs,
                            idx: 0,
                            base: accum,
                        });
                        return Ok(self.descend_first()?.map(|(t, ord)| (t, ord, false)));
                    }
                    None => bail!(IllegalState("non-final arc without target".into())),
                }
            }
            match arc.target {
                Some(t) => {
                    let arcs = self.fst.read_arcs(t)?;
                    self.stack.push(Frame {
                        arcs,
                        idx: 0,
                        base: accum,
                    });
                }
                // the matched term ends before the target; its successor
                // is the ceiling
                None => return Ok(self.next_sibling()?.map(|(t, ord)| (t, ord, false))),
            }
        }
        unreachable!()
    }

    /// Positions on `target` if present; on a miss the iterator state is
    /// unspecified and must be re-seeked.
    pub fn seek_exact(&mut self, target: &[u8]) -> Result<bool> {
        Ok(match self.seek_ceil(target)? {
            Some((_, _, exact)) => exact,
            None => false,
        })
    }

    /// Walks the first-arc chain from the top frame's current arc down to
    /// the first final arc, which is the minimum term of the subtree.
    fn descend_first(&mut self) -> Result<Option<(Vec<u8>, i64)>> {
        loop {
            let (arc, accum) = {
                let top = match self.stack.last() {
                    Some(top) => top,
                    None => {
                        self.done = true;
                        return Ok(None);
                    }
                };
                if top.idx >= top.arcs.len() {
                    // only an fst without terms lands here
                    self.done = true;
                    return Ok(None);
                }
                let arc = top.arcs[top.idx].clone();
                let accum = top.base + arc.output;
                (arc, accum)
            };
            self.term.push(arc.label);
            if arc.is_final {
                self.current_ord = accum;
                return Ok(Some((self.term.clone(), accum)));
            }
            match arc.target {
                Some(t) => {
                    let arcs = self.fst.read_arcs(t)?;
                    self.stack.push(Frame {
                        arcs,
                        idx: 0,
                        base: accum,
                    });
                }
                None => bail!(IllegalState("non-final arc without target".into())),
            }
        }
    }

    /// Abandons the current arc and moves to the next one, climbing frames
    /// whose arcs are exhausted.
    fn next_sibling(&mut self) -> Result<Option<(Vec<u8>, i64)>> {
        loop {
            let advanced = match self.stack.last_mut() {
                Some(top) => {
                    self.term.pop();
                    top.idx += 1;
                    top.idx < top.arcs.len()
                }
                None => bail!(IllegalState("fst iterator is not positioned".into())),
            };
            if advanced {
                return self.descend_first();
            }
            self.stack.pop();
            if self.stack.is_empty() {
                self.done = true;
                return Ok(None);
            }
        }
    }
}
