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

/// The kind of doc values a field stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocValuesType {
    Numeric,
    Binary,
    Sorted,
    SortedSet,
    SortedNumeric,
}

/// Per-field metadata the producer needs: the field's name, its number (the
/// key of the on-disk catalog) and its declared doc-values type.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub number: i32,
    pub doc_values_type: DocValuesType,
}

impl FieldInfo {
    pub fn new(name: &str, number: i32, doc_values_type: DocValuesType) -> FieldInfo {
        FieldInfo {
            name: name.to_string(),
            number,
            doc_values_type,
        }
    }
}
