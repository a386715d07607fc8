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

use codec::codec_util;
use error::ErrorKind::{CorruptFormat, IllegalState};
use error::Result;
use store::{DataInput, DataOutput};

const FST_FORMAT_NAME: &str = "FST";
const VERSION_START: i32 = 1;
const VERSION_CURRENT: i32 = 1;

pub(crate) const BIT_FINAL_ARC: u8 = 1;
pub(crate) const BIT_TARGET_ARC: u8 = 2;

pub(crate) fn push_vulong(bytes: &mut Vec<u8>, mut value: u64) {
    while value & !0x7f != 0 {
        bytes.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    bytes.push(value as u8);
}

/// A decoded transition of an `Fst` node.
#[derive(Clone, Debug)]
pub struct FstArc {
    pub label: u8,
    pub output: i64,
    pub target: Option<usize>,
    pub is_final: bool,
}

/// Finite state transducer mapping byte terms to long ordinals, stored as a
/// flat byte array of serialized nodes. Arc outputs carry the minimum
/// ordinal of the arc's subtree, relative to the parent, so that the ordinal
/// of a term is the sum of outputs along its path. A term that is a prefix
/// of others is always the minimum of its subtree, which makes both ordered
/// iteration and ordinal-guided descent cheap.
pub struct Fst {
    bytes: Vec<u8>,
    start_node: usize,
    empty_output: Option<i64>,
}

impl Fst {
    pub(crate) fn from_parts(bytes: Vec<u8>, start_node: usize, empty_output: Option<i64>) -> Fst {
        Fst {
            bytes,
            start_node,
            empty_output,
        }
    }

    pub fn from_input<T: DataInput + ?Sized>(input: &mut T) -> Result<Fst> {
        codec_util::check_header(input, FST_FORMAT_NAME, VERSION_START, VERSION_CURRENT)?;
        let empty_output = if input.read_byte()? == 1 {
            Some(input.read_vlong()?)
        } else {
            None
        };
        let start_node = input.read_vlong()? as usize;
        let num_bytes = input.read_vlong()? as usize;
        let mut bytes = vec![0u8; num_bytes];
        input.read_exact_bytes(&mut bytes)?;
        Ok(Fst {
            bytes,
            start_node,
            empty_output,
        })
    }

    pub fn save<T: DataOutput + ?Sized>(&self, out: &mut T) -> Result<()> {
        codec_util::write_header(out, FST_FORMAT_NAME, VERSION_CURRENT)?;
        match self.empty_output {
            Some(output) => {
                out.write_byte(1)?;
                out.write_vlong(output)?;
            }
            None => out.write_byte(0)?,
        }
        out.write_vlong(self.start_node as i64)?;
        out.write_vlong(self.bytes.len() as i64)?;
        out.write_bytes(&self.bytes)
    }

    pub fn start_node(&self) -> usize {
        self.start_node
    }

    pub fn empty_output(&self) -> Option<i64> {
        self.empty_output
    }

    pub fn ram_bytes_used(&self) -> i64 {
        self.bytes.len() as i64
    }

    fn byte_at(&self, pos: &mut usize) -> Result<u8> {
        match self.bytes.get(*pos) {
            Some(&b) => {
                *pos += 1;
                Ok(b)
            }
            None => bail!(CorruptFormat("truncated fst node".into())),
        }
    }

    fn vulong_at(&self, pos: &mut usize) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let b = self.byte_at(pos)?;
            value |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                bail!(CorruptFormat("malformed vlong in fst node".into()));
            }
        }
    }

    /// Decodes the arcs of the node at byte position `node`, in label order.
    pub fn read_arcs(&self, node: usize) -> Result<Vec<FstArc>> {
        let mut pos = node;
        let num_arcs = self.vulong_at(&mut pos)? as usize;
        let mut arcs = Vec::with_capacity(num_arcs);
        for _ in 0..num_arcs {
            let label = self.byte_at(&mut pos)?;
            let flags = self.byte_at(&mut pos)?;
            let output = self.vulong_at(&mut pos)? as i64;
            let target = if flags & BIT_TARGET_ARC != 0 {
                Some(self.vulong_at(&mut pos)? as usize)
            } else {
                None
            };
            arcs.push(FstArc {
                label,
                output,
                target,
                is_final: flags & BIT_FINAL_ARC != 0,
            });
        }
        Ok(arcs)
    }

    /// Looks up the ordinal of `key`, or None if absent.
    pub fn get(&self, key: &[u8]) -> Result<Option<i64>> {
        if key.is_empty() {
            return Ok(self.empty_output);
        }
        let mut node = self.start_node;
        let mut accum = 0i64;
        for (i, &label) in key.iter().enumerate() {
            let arcs = self.read_arcs(node)?;
            let arc = match arcs.into_iter().find(|a| a.label == label) {
                Some(arc) => arc,
                None => return Ok(None),
            };
            accum += arc.output;
            if i + 1 == key.len() {
                return Ok(if arc.is_final { Some(accum) } else { None });
            }
            match arc.target {
                Some(t) => node = t,
                None => return Ok(None),
            }
        }
        unreachable!()
    }

    /// Reconstructs the term whose ordinal is `ord` by walking the arcs
    /// whose accumulated output stays below the target.
    pub fn get_by_output(&self, ord: i64) -> Result<Vec<u8>> {
        if self.empty_output == Some(ord) {
            return Ok(Vec::new());
        }
        let mut node = self.start_node;
        let mut accum = 0i64;
        let mut term = Vec::new();
        loop {
            let arcs = self.read_arcs(node)?;
            let mut chosen: Option<FstArc> = None;
            for arc in arcs {
                if accum + arc.output <= ord {
                    chosen = Some(arc);
                } else {
                    break;
                }
            }
            let arc = match chosen {
                Some(arc) => arc,
                None => bail!(IllegalState(format!("ordinal {} not present in fst", ord))),
            };
            accum += arc.output;
            term.push(arc.label);
            if arc.is_final && accum == ord {
                return Ok(term);
            }
            match arc.target {
                Some(t) => node = t,
                None => bail!(IllegalState(format!("ordinal {} not present in fst", ord))),
            }
        }
    }
}
