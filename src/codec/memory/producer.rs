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

//! Read side of the memory doc-values format.
//!
//! The metadata stream is parsed into a field catalog at open; the data
//! stream is only framed-checked. Heavyweight per-field structures (decoded
//! numeric arrays, byte blobs, FSTs, presence bitmaps, address tables) are
//! materialized lazily, exactly once, and shared between accessors.

use codec::codec_util;
use codec::memory::{
    segment_file_name, DocValuesTermIterator, BLOCK_COMPRESSED, BYTES, DATA_CODEC, DATA_EXTENSION,
    DELTA_COMPRESSED, FST, GCD_COMPRESSED, METADATA_CODEC, METADATA_EXTENSION, NUMBER,
    SORTED_NUMERIC, SORTED_NUMERIC_SINGLETON, SORTED_SET, SORTED_SET_SINGLETON, TABLE_COMPRESSED,
    VERSION_CURRENT, VERSION_START,
};
use codec::{
    BinaryDocValues, DocValuesType, EmptySortedDocValues, EmptySortedSetDocValues, FieldInfo,
    NumericDocValues, SingletonSortedNumericDocValues, SingletonSortedSetDocValues,
    SortedDocValues, SortedDocsWithField, SortedNumericDocValues, SortedNumericDocsWithField,
    SortedSetDocValues, SortedSetDocsWithField, NO_MORE_ORDS,
};
use error::ErrorKind::{CorruptFormat, Format, IllegalArgument, IllegalState};
use error::Result;
use store::{ByteArrayDataInput, DataInput, Directory, IndexInput};
use util::fst::{BytesRefFstIterator, Fst};
use util::packed::{self, BlockPackedReader, MonotonicBlockPackedReader, PackedReader};
use util::{Bits, BitsMut, DocId, FixedBitSet, LongValues, MatchAllBits};

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct NumericEntry {
    offset: i64,
    missing_offset: i64,
    missing_bytes: i64,
    format: u8,
    packed_ints_version: i32,
    count: i64,
}

struct BinaryEntry {
    offset: i64,
    num_bytes: i64,
    missing_offset: i64,
    missing_bytes: i64,
    min_length: i32,
    max_length: i32,
    packed_ints_version: i32,
    block_size: i32,
}

struct FstEntry {
    offset: i64,
    num_ords: i64,
}

struct SortedSetEntry {
    singleton: bool,
}

struct SortedNumericEntry {
    singleton: bool,
    packed_ints_version: i32,
    block_size: i32,
    address_offset: i64,
    value_count: i64,
}

/// One of the four numeric accessor shapes, dispatched once at load time.
pub enum NumericLongValues {
    Table {
        table: Vec<i64>,
        ords: PackedReader,
    },
    Delta {
        base: i64,
        deltas: PackedReader,
    },
    Block {
        reader: BlockPackedReader,
    },
    Gcd {
        base: i64,
        mult: i64,
        quotients: PackedReader,
    },
}

impl NumericLongValues {
    fn ram_bytes_used(&self) -> i64 {
        match *self {
            NumericLongValues::Table {
                ref table,
                ref ords,
            } => (table.len() * 8) as i64 + ords.ram_bytes_used(),
            NumericLongValues::Delta { ref deltas, .. } => deltas.ram_bytes_used(),
            NumericLongValues::Block { ref reader } => reader.ram_bytes_used(),
            NumericLongValues::Gcd { ref quotients, .. } => quotients.ram_bytes_used(),
        }
    }
}

impl LongValues for NumericLongValues {
    fn get64(&self, index: i64) -> Result<i64> {
        match *self {
            NumericLongValues::Table {
                ref table,
                ref ords,
            } => {
                let ord = ords.get64(index)? as usize;
                match table.get(ord) {
                    Some(&value) => Ok(value),
                    None => bail!(CorruptFormat(format!(
                        "table ord {} out of bounds of {} entries",
                        ord,
                        table.len()
                    ))),
                }
            }
            NumericLongValues::Delta { base, ref deltas } => {
                Ok(base.wrapping_add(deltas.get64(index)?))
            }
            NumericLongValues::Block { ref reader } => reader.get64(index),
            NumericLongValues::Gcd {
                base,
                mult,
                ref quotients,
            } => Ok(base.wrapping_add(mult.wrapping_mul(quotients.get64(index)?))),
        }
    }
}

impl NumericDocValues for Arc<NumericLongValues> {
    fn get(&self, doc_id: DocId) -> Result<i64> {
        self.get64(i64::from(doc_id))
    }
}

/// The cached blob of a binary field: the raw bytes and, for variable-width
/// fields, the per-document end addresses.
pub struct BytesAndAddresses {
    bytes: Vec<u8>,
    addresses: Option<MonotonicBlockPackedReader>,
}

struct MemoryBinaryDocValues {
    data: Arc<BytesAndAddresses>,
    fixed_length: Option<usize>,
}

impl BinaryDocValues for MemoryBinaryDocValues {
    fn get(&self, doc_id: DocId) -> Result<Vec<u8>> {
        let (start, end) = match self.fixed_length {
            Some(length) => {
                let start = doc_id as usize * length;
                (start, start + length)
            }
            None => {
                let addresses = match self.data.addresses {
                    Some(ref addresses) => addresses,
                    None => bail!(IllegalState(
                        "variable-width binary field has no address table".into()
                    )),
                };
                let start = if doc_id == 0 {
                    0
                } else {
                    addresses.get64(i64::from(doc_id) - 1)?
                };
                let end = addresses.get64(i64::from(doc_id))?;
                (start as usize, end as usize)
            }
        };
        match self.data.bytes.get(start..end) {
            Some(slice) => Ok(slice.to_vec()),
            None => bail!(CorruptFormat(format!(
                "binary slice [{}, {}) out of bounds of {} stored bytes",
                start,
                end,
                self.data.bytes.len()
            ))),
        }
    }
}

struct MemorySortedDocValues {
    fst: Arc<Fst>,
    doc_to_ord: Arc<NumericLongValues>,
    value_count: i64,
}

impl BinaryDocValues for MemorySortedDocValues {
    fn get(&self, doc_id: DocId) -> Result<Vec<u8>> {
        let ord = self.get_ord(doc_id)?;
        if ord < 0 {
            Ok(Vec::new())
        } else {
            self.lookup_ord(ord)
        }
    }
}

impl SortedDocValues for MemorySortedDocValues {
    fn get_ord(&self, doc_id: DocId) -> Result<i32> {
        Ok(self.doc_to_ord.get64(i64::from(doc_id))? as i32)
    }

    fn lookup_ord(&self, ord: i32) -> Result<Vec<u8>> {
        self.fst.get_by_output(i64::from(ord))
    }

    fn value_count(&self) -> usize {
        self.value_count as usize
    }

    fn lookup_term(&self, key: &[u8]) -> Result<i64> {
        let mut iter = BytesRefFstIterator::new(Arc::clone(&self.fst));
        match iter.seek_ceil(key)? {
            None => Ok(-self.value_count - 1),
            Some((_, ord, true)) => Ok(ord),
            Some((_, ord, false)) => Ok(-ord - 1),
        }
    }

    fn term_iterator(&self) -> Result<DocValuesTermIterator> {
        Ok(DocValuesTermIterator::fst(Arc::clone(&self.fst)))
    }
}

struct MemorySortedSetDocValues {
    binary: Box<dyn BinaryDocValues>,
    fst: Arc<Fst>,
    value_count: i64,
    input: ByteArrayDataInput<Vec<u8>>,
    current_ord: i64,
}

impl SortedSetDocValues for MemorySortedSetDocValues {
    fn set_document(&mut self, doc_id: DocId) -> Result<()> {
        let bytes = self.binary.get(doc_id)?;
        self.input.reset(bytes);
        self.current_ord = 0;
        Ok(())
    }

    fn next_ord(&mut self) -> Result<i64> {
        // end-of-list is cursor exhaustion; there is no count prefix
        if self.input.eof() {
            Ok(NO_MORE_ORDS)
        } else {
            self.current_ord += self.input.read_vlong()?;
            Ok(self.current_ord)
        }
    }

    fn lookup_ord(&self, ord: i64) -> Result<Vec<u8>> {
        self.fst.get_by_output(ord)
    }

    fn get_value_count(&self) -> usize {
        self.value_count as usize
    }

    fn lookup_term(&self, key: &[u8]) -> Result<i64> {
        let mut iter = BytesRefFstIterator::new(Arc::clone(&self.fst));
        match iter.seek_ceil(key)? {
            None => Ok(-self.value_count - 1),
            Some((_, ord, true)) => Ok(ord),
            Some((_, ord, false)) => Ok(-ord - 1),
        }
    }

    fn term_iterator(&self) -> Result<DocValuesTermIterator> {
        Ok(DocValuesTermIterator::fst(Arc::clone(&self.fst)))
    }
}

struct MemorySortedNumericDocValues {
    values: Arc<NumericLongValues>,
    addresses: Arc<MonotonicBlockPackedReader>,
    start_offset: i64,
    end_offset: i64,
}

impl SortedNumericDocValues for MemorySortedNumericDocValues {
    fn set_document(&mut self, doc_id: DocId) -> Result<()> {
        self.start_offset = self.addresses.get64(i64::from(doc_id))?;
        self.end_offset = self.addresses.get64(i64::from(doc_id) + 1)?;
        Ok(())
    }

    fn value_at(&mut self, index: usize) -> Result<i64> {
        self.values.get64(self.start_offset + index as i64)
    }

    fn count(&self) -> usize {
        (self.end_offset - self.start_offset) as usize
    }
}

/// Shares a cached presence bitmap with any number of accessors.
struct SharedFixedBits(Arc<FixedBitSet>);

impl BitsMut for SharedFixedBits {
    fn get(&mut self, index: usize) -> Result<bool> {
        Bits::get(&*self.0, index)
    }

    fn len(&self) -> usize {
        Bits::len(&*self.0)
    }
}

/// Reader over a segment's memory doc-values files.
pub struct MemoryDocValuesProducer {
    numerics: HashMap<i32, NumericEntry>,
    binaries: HashMap<i32, BinaryEntry>,
    fsts: HashMap<i32, FstEntry>,
    sorted_sets: HashMap<i32, SortedSetEntry>,
    sorted_numerics: HashMap<i32, SortedNumericEntry>,
    data: Box<dyn IndexInput>,

    numeric_instances: Mutex<HashMap<i32, Arc<NumericLongValues>>>,
    binary_instances: Mutex<HashMap<i32, Arc<BytesAndAddresses>>>,
    fst_instances: Mutex<HashMap<i32, Arc<Fst>>>,
    docs_with_field_instances: Mutex<HashMap<i32, Arc<FixedBitSet>>>,
    address_instances: Mutex<HashMap<i32, Arc<MonotonicBlockPackedReader>>>,

    max_doc: i32,
    ram_bytes_used: AtomicI64,
    decode_count: AtomicUsize,
    version: i32,
}

impl MemoryDocValuesProducer {
    pub fn new<D: Directory + ?Sized>(
        directory: &D,
        segment: &str,
        max_doc: i32,
    ) -> Result<MemoryDocValuesProducer> {
        let meta_name = segment_file_name(segment, METADATA_EXTENSION);

        let mut numerics = HashMap::new();
        let mut binaries = HashMap::new();
        let mut fsts = HashMap::new();
        let mut sorted_sets = HashMap::new();
        let mut sorted_numerics = HashMap::new();

        // the metadata file is small, so its checksum is verified right away
        let version = {
            let mut meta = directory.open_checksum_input(&meta_name)?;
            let version =
                codec_util::check_header(&mut meta, METADATA_CODEC, VERSION_START, VERSION_CURRENT)?;
            Self::read_fields(
                &mut meta,
                &mut numerics,
                &mut binaries,
                &mut fsts,
                &mut sorted_sets,
                &mut sorted_numerics,
            )?;
            codec_util::check_footer(&mut meta)?;
            version
        };

        let data_name = segment_file_name(segment, DATA_EXTENSION);
        let mut data = directory.open_input(&data_name)?;
        let data_version =
            codec_util::check_header(data.as_mut(), DATA_CODEC, VERSION_START, VERSION_CURRENT)?;
        if data_version != version {
            bail!(Format(format!(
                "format versions mismatch: meta={}, data={}",
                version, data_version
            )));
        }

        // the data file is too costly to fully verify on every open; only
        // the footer framing is validated here, which already catches
        // truncation. check_integrity does the full scan on demand.
        codec_util::retrieve_checksum(data.as_mut())?;

        Ok(MemoryDocValuesProducer {
            numerics,
            binaries,
            fsts,
            sorted_sets,
            sorted_numerics,
            data,
            numeric_instances: Mutex::new(HashMap::new()),
            binary_instances: Mutex::new(HashMap::new()),
            fst_instances: Mutex::new(HashMap::new()),
            docs_with_field_instances: Mutex::new(HashMap::new()),
            address_instances: Mutex::new(HashMap::new()),
            max_doc,
            ram_bytes_used: AtomicI64::new(0),
            decode_count: AtomicUsize::new(0),
            version,
        })
    }

    fn read_fields<T: IndexInput + ?Sized>(
        meta: &mut T,
        numerics: &mut HashMap<i32, NumericEntry>,
        binaries: &mut HashMap<i32, BinaryEntry>,
        fsts: &mut HashMap<i32, FstEntry>,
        sorted_sets: &mut HashMap<i32, SortedSetEntry>,
        sorted_numerics: &mut HashMap<i32, SortedNumericEntry>,
    ) -> Result<()> {
        let mut field_number = meta.read_vint()?;
        while field_number != -1 {
            let field_type = meta.read_byte()?;
            match field_type {
                NUMBER => {
                    numerics.insert(field_number, Self::read_numeric_entry(meta)?);
                }
                BYTES => {
                    binaries.insert(field_number, Self::read_binary_entry(meta)?);
                }
                FST => {
                    let entry = FstEntry {
                        offset: meta.read_long()?,
                        num_ords: meta.read_vlong()?,
                    };
                    fsts.insert(field_number, entry);
                }
                SORTED_SET => {
                    sorted_sets.insert(field_number, SortedSetEntry { singleton: false });
                }
                SORTED_SET_SINGLETON => {
                    sorted_sets.insert(field_number, SortedSetEntry { singleton: true });
                }
                SORTED_NUMERIC => {
                    let entry = SortedNumericEntry {
                        singleton: false,
                        packed_ints_version: meta.read_vint()?,
                        block_size: meta.read_vint()?,
                        address_offset: meta.read_long()?,
                        value_count: meta.read_long()?,
                    };
                    sorted_numerics.insert(field_number, entry);
                }
                SORTED_NUMERIC_SINGLETON => {
                    let entry = SortedNumericEntry {
                        singleton: true,
                        packed_ints_version: 0,
                        block_size: 0,
                        address_offset: 0,
                        value_count: 0,
                    };
                    sorted_numerics.insert(field_number, entry);
                }
                _ => bail!(CorruptFormat(format!(
                    "invalid entry type: {} for field {}, input pos: {}",
                    field_type,
                    field_number,
                    meta.file_pointer()
                ))),
            }
            field_number = meta.read_vint()?;
        }
        Ok(())
    }

    fn read_numeric_entry<T: IndexInput + ?Sized>(meta: &mut T) -> Result<NumericEntry> {
        let offset = meta.read_long()?;
        let missing_offset = meta.read_long()?;
        let missing_bytes = if missing_offset != -1 {
            meta.read_long()?
        } else {
            0
        };
        let format = meta.read_byte()?;
        match format {
            DELTA_COMPRESSED | TABLE_COMPRESSED | BLOCK_COMPRESSED | GCD_COMPRESSED => {}
            _ => bail!(CorruptFormat(format!(
                "unknown numeric compression format: {}, input pos: {}",
                format,
                meta.file_pointer()
            ))),
        }
        Ok(NumericEntry {
            offset,
            missing_offset,
            missing_bytes,
            format,
            packed_ints_version: meta.read_vint()?,
            count: meta.read_long()?,
        })
    }

    fn read_binary_entry<T: DataInput + ?Sized>(meta: &mut T) -> Result<BinaryEntry> {
        let offset = meta.read_long()?;
        let num_bytes = meta.read_long()?;
        let missing_offset = meta.read_long()?;
        let missing_bytes = if missing_offset != -1 {
            meta.read_long()?
        } else {
            0
        };
        let min_length = meta.read_vint()?;
        let max_length = meta.read_vint()?;
        let (packed_ints_version, block_size) = if min_length != max_length {
            (meta.read_vint()?, meta.read_vint()?)
        } else {
            (0, 0)
        };
        Ok(BinaryEntry {
            offset,
            num_bytes,
            missing_offset,
            missing_bytes,
            min_length,
            max_length,
            packed_ints_version,
            block_size,
        })
    }

    pub fn get_numeric(&self, field: &FieldInfo) -> Result<Box<dyn NumericDocValues>> {
        Ok(Box::new(self.get_numeric_values(field.number)?))
    }

    fn get_numeric_values(&self, field_number: i32) -> Result<Arc<NumericLongValues>> {
        let mut instances = self.numeric_instances.lock()?;
        if let Some(values) = instances.get(&field_number) {
            return Ok(Arc::clone(values));
        }
        let entry = match self.numerics.get(&field_number) {
            Some(entry) => entry,
            None => bail!(IllegalArgument(format!(
                "field {} has no numeric doc values",
                field_number
            ))),
        };
        let values = Arc::new(self.load_numeric(field_number, entry)?);
        instances.insert(field_number, Arc::clone(&values));
        Ok(values)
    }

    fn load_numeric(&self, field_number: i32, entry: &NumericEntry) -> Result<NumericLongValues> {
        let mut data = self.data.clone()?;
        // the presence bitmap, if any, sits right before the values
        data.seek(entry.offset + entry.missing_bytes)?;
        let values = match entry.format {
            TABLE_COMPRESSED => {
                let size = data.read_vint()?;
                if size < 0 || size > 256 {
                    bail!(CorruptFormat(format!(
                        "TABLE_COMPRESSED cannot have more than 256 distinct values, got {} \
                         (field {})",
                        size, field_number
                    )));
                }
                let mut table = Vec::with_capacity(size as usize);
                for _ in 0..size {
                    table.push(data.read_long()?);
                }
                let format_id = data.read_vint()?;
                let bits_per_value = data.read_vint()?;
                let ords = packed::get_reader_no_header(
                    data.as_mut(),
                    packed::Format::with_id(format_id)?,
                    entry.packed_ints_version,
                    entry.count as usize,
                    bits_per_value,
                )?;
                NumericLongValues::Table { table, ords }
            }
            DELTA_COMPRESSED => {
                let base = data.read_long()?;
                let format_id = data.read_vint()?;
                let bits_per_value = data.read_vint()?;
                let deltas = packed::get_reader_no_header(
                    data.as_mut(),
                    packed::Format::with_id(format_id)?,
                    entry.packed_ints_version,
                    entry.count as usize,
                    bits_per_value,
                )?;
                NumericLongValues::Delta { base, deltas }
            }
            BLOCK_COMPRESSED => {
                let block_size = data.read_vint()?;
                let reader = BlockPackedReader::new(
                    data.as_mut(),
                    entry.packed_ints_version,
                    block_size as usize,
                    entry.count,
                )?;
                NumericLongValues::Block { reader }
            }
            GCD_COMPRESSED => {
                let base = data.read_long()?;
                let mult = data.read_long()?;
                let format_id = data.read_vint()?;
                let bits_per_value = data.read_vint()?;
                let quotients = packed::get_reader_no_header(
                    data.as_mut(),
                    packed::Format::with_id(format_id)?,
                    entry.packed_ints_version,
                    entry.count as usize,
                    bits_per_value,
                )?;
                NumericLongValues::Gcd {
                    base,
                    mult,
                    quotients,
                }
            }
            _ => bail!(IllegalState(format!(
                "numeric entry with unvalidated format {}",
                entry.format
            ))),
        };
        let bytes = values.ram_bytes_used();
        self.ram_bytes_used.fetch_add(bytes, Ordering::SeqCst);
        self.decode_count.fetch_add(1, Ordering::SeqCst);
        debug!(
            "loaded numeric doc values for field {} ({} bytes)",
            field_number, bytes
        );
        Ok(values)
    }

    pub fn get_binary(&self, field: &FieldInfo) -> Result<Box<dyn BinaryDocValues>> {
        let entry = match self.binaries.get(&field.number) {
            Some(entry) => entry,
            None => bail!(IllegalArgument(format!(
                "field '{}' has no binary doc values",
                field.name
            ))),
        };
        let instance = {
            let mut instances = self.binary_instances.lock()?;
            match instances.get(&field.number) {
                Some(instance) => Arc::clone(instance),
                None => {
                    let instance = Arc::new(self.load_binary(field.number, entry)?);
                    instances.insert(field.number, Arc::clone(&instance));
                    instance
                }
            }
        };
        let fixed_length = if entry.min_length == entry.max_length {
            Some(entry.min_length as usize)
        } else {
            None
        };
        Ok(Box::new(MemoryBinaryDocValues {
            data: instance,
            fixed_length,
        }))
    }

    fn load_binary(&self, field_number: i32, entry: &BinaryEntry) -> Result<BytesAndAddresses> {
        let mut data = self.data.clone()?;
        data.seek(entry.offset)?;
        let mut bytes = vec![0u8; entry.num_bytes as usize];
        data.read_exact_bytes(&mut bytes)?;
        let mut loaded = bytes.len() as i64;
        let addresses = if entry.min_length != entry.max_length {
            let pointer = data.file_pointer();
            data.seek(pointer + entry.missing_bytes)?;
            let addresses = MonotonicBlockPackedReader::new(
                data.as_mut(),
                entry.packed_ints_version,
                entry.block_size as usize,
                i64::from(self.max_doc),
            )?;
            loaded += addresses.ram_bytes_used();
            Some(addresses)
        } else {
            None
        };
        self.ram_bytes_used.fetch_add(loaded, Ordering::SeqCst);
        self.decode_count.fetch_add(1, Ordering::SeqCst);
        debug!(
            "loaded binary doc values for field {} ({} bytes)",
            field_number, loaded
        );
        Ok(BytesAndAddresses { bytes, addresses })
    }

    pub fn get_sorted(&self, field: &FieldInfo) -> Result<Box<dyn SortedDocValues>> {
        let entry = match self.fsts.get(&field.number) {
            Some(entry) => entry,
            None => bail!(IllegalArgument(format!(
                "field '{}' has no sorted doc values",
                field.name
            ))),
        };
        if entry.num_ords == 0 {
            return Ok(Box::new(EmptySortedDocValues));
        }
        let fst = self.get_fst(field.number, entry)?;
        let doc_to_ord = self.get_numeric_values(field.number)?;
        Ok(Box::new(MemorySortedDocValues {
            fst,
            doc_to_ord,
            value_count: entry.num_ords,
        }))
    }

    pub fn get_sorted_set(&self, field: &FieldInfo) -> Result<Box<dyn SortedSetDocValues>> {
        let ss_entry = match self.sorted_sets.get(&field.number) {
            Some(entry) => entry,
            None => bail!(IllegalArgument(format!(
                "field '{}' has no sorted-set doc values",
                field.name
            ))),
        };
        if ss_entry.singleton {
            return Ok(Box::new(SingletonSortedSetDocValues::new(
                self.get_sorted(field)?,
            )));
        }
        let entry = match self.fsts.get(&field.number) {
            Some(entry) => entry,
            None => bail!(CorruptFormat(format!(
                "sorted-set field {} has no term dictionary entry",
                field.number
            ))),
        };
        if entry.num_ords == 0 {
            return Ok(Box::new(EmptySortedSetDocValues));
        }
        let fst = self.get_fst(field.number, entry)?;
        let binary = self.get_binary(field)?;
        Ok(Box::new(MemorySortedSetDocValues {
            binary,
            fst,
            value_count: entry.num_ords,
            input: ByteArrayDataInput::empty(),
            current_ord: 0,
        }))
    }

    pub fn get_sorted_numeric(
        &self,
        field: &FieldInfo,
    ) -> Result<Box<dyn SortedNumericDocValues>> {
        let entry = match self.sorted_numerics.get(&field.number) {
            Some(entry) => entry,
            None => bail!(IllegalArgument(format!(
                "field '{}' has no sorted-numeric doc values",
                field.name
            ))),
        };
        if entry.singleton {
            let values = self.get_numeric_values(field.number)?;
            let ne = match self.numerics.get(&field.number) {
                Some(ne) => ne,
                None => bail!(CorruptFormat(format!(
                    "singleton sorted-numeric field {} has no numeric entry",
                    field.number
                ))),
            };
            let docs_with_field =
                self.get_missing_bits(field.number, ne.missing_offset, ne.missing_bytes)?;
            return Ok(Box::new(SingletonSortedNumericDocValues::new(
                Box::new(values),
                docs_with_field,
            )));
        }
        let values = self.get_numeric_values(field.number)?;
        let addresses = self.get_addresses(field.number, entry)?;
        Ok(Box::new(MemorySortedNumericDocValues {
            values,
            addresses,
            start_offset: 0,
            end_offset: 0,
        }))
    }

    fn get_fst(&self, field_number: i32, entry: &FstEntry) -> Result<Arc<Fst>> {
        let mut instances = self.fst_instances.lock()?;
        if let Some(fst) = instances.get(&field_number) {
            return Ok(Arc::clone(fst));
        }
        let mut data = self.data.clone()?;
        data.seek(entry.offset)?;
        let fst = Arc::new(Fst::from_input(data.as_mut())?);
        self.ram_bytes_used
            .fetch_add(fst.ram_bytes_used(), Ordering::SeqCst);
        self.decode_count.fetch_add(1, Ordering::SeqCst);
        debug!(
            "loaded term dictionary for field {} ({} terms, {} bytes)",
            field_number,
            entry.num_ords,
            fst.ram_bytes_used()
        );
        instances.insert(field_number, Arc::clone(&fst));
        Ok(fst)
    }

    fn get_addresses(
        &self,
        field_number: i32,
        entry: &SortedNumericEntry,
    ) -> Result<Arc<MonotonicBlockPackedReader>> {
        let mut instances = self.address_instances.lock()?;
        if let Some(addresses) = instances.get(&field_number) {
            return Ok(Arc::clone(addresses));
        }
        let mut data = self.data.clone()?;
        data.seek(entry.address_offset)?;
        let addresses = Arc::new(MonotonicBlockPackedReader::new(
            data.as_mut(),
            entry.packed_ints_version,
            entry.block_size as usize,
            entry.value_count,
        )?);
        self.ram_bytes_used
            .fetch_add(addresses.ram_bytes_used(), Ordering::SeqCst);
        self.decode_count.fetch_add(1, Ordering::SeqCst);
        debug!(
            "loaded value addresses for field {} ({} bytes)",
            field_number,
            addresses.ram_bytes_used()
        );
        instances.insert(field_number, Arc::clone(&addresses));
        Ok(addresses)
    }

    fn get_missing_bits(
        &self,
        field_number: i32,
        offset: i64,
        length: i64,
    ) -> Result<Box<dyn BitsMut>> {
        if offset == -1 {
            return Ok(Box::new(MatchAllBits::new(self.max_doc as usize)));
        }
        let mut instances = self.docs_with_field_instances.lock()?;
        let bits = match instances.get(&field_number) {
            Some(bits) => Arc::clone(bits),
            None => {
                let mut data = self.data.clone()?;
                data.seek(offset)?;
                debug_assert_eq!(length % 8, 0);
                let word_count = (length >> 3) as usize;
                let mut words = Vec::with_capacity(word_count);
                for _ in 0..word_count {
                    words.push(data.read_long()?);
                }
                let bits = Arc::new(FixedBitSet::copy_from(words, self.max_doc as usize)?);
                self.ram_bytes_used
                    .fetch_add(bits.ram_bytes_used(), Ordering::SeqCst);
                self.decode_count.fetch_add(1, Ordering::SeqCst);
                debug!(
                    "loaded presence bitmap for field {} ({} bytes)",
                    field_number, length
                );
                instances.insert(field_number, Arc::clone(&bits));
                bits
            }
        };
        Ok(Box::new(SharedFixedBits(bits)))
    }

    /// Which documents of `field` have a value. Dictionary-typed fields
    /// derive presence structurally; numeric and binary fields read the
    /// stored bitmap.
    pub fn get_docs_with_field(&self, field: &FieldInfo) -> Result<Box<dyn BitsMut>> {
        let max_doc = self.max_doc as usize;
        match field.doc_values_type {
            DocValuesType::Sorted => Ok(Box::new(SortedDocsWithField::new(
                self.get_sorted(field)?,
                max_doc,
            ))),
            DocValuesType::SortedSet => Ok(Box::new(SortedSetDocsWithField::new(
                self.get_sorted_set(field)?,
                max_doc,
            ))),
            DocValuesType::SortedNumeric => Ok(Box::new(SortedNumericDocsWithField::new(
                self.get_sorted_numeric(field)?,
                max_doc,
            ))),
            DocValuesType::Binary => {
                let entry = match self.binaries.get(&field.number) {
                    Some(entry) => entry,
                    None => bail!(IllegalArgument(format!(
                        "field '{}' has no binary doc values",
                        field.name
                    ))),
                };
                self.get_missing_bits(field.number, entry.missing_offset, entry.missing_bytes)
            }
            DocValuesType::Numeric => {
                let entry = match self.numerics.get(&field.number) {
                    Some(entry) => entry,
                    None => bail!(IllegalArgument(format!(
                        "field '{}' has no numeric doc values",
                        field.name
                    ))),
                };
                self.get_missing_bits(field.number, entry.missing_offset, entry.missing_bytes)
            }
        }
    }

    /// Checksums the entire data file against its footer.
    pub fn check_integrity(&self) -> Result<()> {
        codec_util::checksum_entire_file(self.data.as_ref())?;
        Ok(())
    }

    /// Resident size of everything decoded so far.
    pub fn ram_bytes_used(&self) -> i64 {
        self.ram_bytes_used.load(Ordering::SeqCst)
    }

    /// How many one-time decodes have run; a cache hit does not bump this.
    pub fn decode_count(&self) -> usize {
        self.decode_count.load(Ordering::SeqCst)
    }

    pub fn max_doc(&self) -> i32 {
        self.max_doc
    }

    pub fn version(&self) -> i32 {
        self.version
    }
}
