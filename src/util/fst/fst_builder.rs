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

use error::ErrorKind::IllegalArgument;
use error::Result;
use util::fst::fst_reader::{push_vulong, BIT_FINAL_ARC, BIT_TARGET_ARC};
use util::fst::Fst;

struct BuilderArc {
    label: u8,
    // minimum output of the subtree reached through this arc; set by the
    // first term routed through it, which sorted insertion keeps minimal
    min_output: i64,
    is_final: bool,
    target: Option<usize>,
}

struct BuilderNode {
    arcs: Vec<BuilderArc>,
}

/// Builds an `Fst` from terms added in strictly increasing byte order with
/// non-decreasing outputs.
pub struct FstBuilder {
    nodes: Vec<BuilderNode>,
    last_term: Vec<u8>,
    last_output: i64,
    empty_output: Option<i64>,
    num_terms: i64,
}

impl Default for FstBuilder {
    fn default() -> Self {
        FstBuilder::new()
    }
}

impl FstBuilder {
    pub fn new() -> FstBuilder {
        FstBuilder {
            nodes: vec![BuilderNode { arcs: Vec::new() }],
            last_term: Vec::new(),
            last_output: 0,
            empty_output: None,
            num_terms: 0,
        }
    }

    pub fn add(&mut self, term: &[u8], output: i64) -> Result<()> {
        if output < 0 {
            bail!(IllegalArgument(format!(
                "outputs must be >= 0, got {}",
                output
            )));
        }
        if self.num_terms > 0 {
            if term <= self.last_term.as_slice() {
                bail!(IllegalArgument(format!(
                    "terms must be added in strictly increasing order, got {:?} after {:?}",
                    term, self.last_term
                )));
            }
            if output < self.last_output {
                bail!(IllegalArgument(format!(
                    "outputs must be non-decreasing, got {} after {}",
                    output, self.last_output
                )));
            }
        }

        if term.is_empty() {
            self.empty_output = Some(output);
        } else {
            let mut node = 0usize;
            for (i, &label) in term.iter().enumerate() {
                let last = i + 1 == term.len();
                // sorted insertion means a shared prefix is always the last arc
                let reuse = self.nodes[node]
                    .arcs
                    .last()
                    .map(|arc| arc.label == label)
                    .unwrap_or(false);
                if !reuse {
                    self.nodes[node].arcs.push(BuilderArc {
                        label,
                        min_output: output,
                        is_final: false,
                        target: None,
                    });
                }
                let arc_idx = self.nodes[node].arcs.len() - 1;
                if last {
                    self.nodes[node].arcs[arc_idx].is_final = true;
                } else {
                    node = match self.nodes[node].arcs[arc_idx].target {
                        Some(t) => t,
                        None => {
                            let t = self.nodes.len();
                            self.nodes.push(BuilderNode { arcs: Vec::new() });
                            self.nodes[node].arcs[arc_idx].target = Some(t);
                            t
                        }
                    };
                }
            }
        }

        self.last_term.clear();
        self.last_term.extend_from_slice(term);
        self.last_output = output;
        self.num_terms += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<Fst> {
        let mut bytes = Vec::new();
        let start_node = Self::write_node(&self.nodes, 0, 0, &mut bytes);
        Ok(Fst::from_parts(bytes, start_node, self.empty_output))
    }

    /// Serializes `idx` and its descendants depth-first, children before
    /// parents so targets are known, and returns the node's byte position.
    /// Arc outputs are stored relative to `base`, the minimum output of the
    /// path leading into the node.
    fn write_node(nodes: &[BuilderNode], idx: usize, base: i64, bytes: &mut Vec<u8>) -> usize {
        let node = &nodes[idx];
        let mut targets = Vec::with_capacity(node.arcs.len());
        for arc in &node.arcs {
            targets.push(
                arc.target
                    .map(|t| Self::write_node(nodes, t, arc.min_output, bytes)),
            );
        }
        let pos = bytes.len();
        push_vulong(bytes, node.arcs.len() as u64);
        for (arc, target) in node.arcs.iter().zip(targets) {
            bytes.push(arc.label);
            let mut flags = 0u8;
            if arc.is_final {
                flags |= BIT_FINAL_ARC;
            }
            if target.is_some() {
                flags |= BIT_TARGET_ARC;
            }
            bytes.push(flags);
            push_vulong(bytes, (arc.min_output - base) as u64);
            if let Some(t) = target {
                push_vulong(bytes, t as u64);
            }
        }
        pos
    }
}
