//! Per-segment column layouts.
//!
//! Both column kinds use a compressed-row layout: `offsets[doc]..offsets[doc + 1]`
//! indexes the values of `doc`. Values within a document are sorted, and
//! keyword values are deduplicated, matching what sorted doc values return.

use std::cmp::Ordering;

use leafdoc_core::{DocId, FieldType, FieldValue};

/// Values of one concrete field for every document of a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    field_type: FieldType,
    offsets: Vec<u32>,
    values: Vec<FieldValue>,
}

impl Column {
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Number of documents the column spans.
    pub fn max_doc(&self) -> DocId {
        (self.offsets.len() - 1) as DocId
    }

    /// Total number of values across all documents.
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Values of `doc`; empty for documents outside the column.
    pub fn values(&self, doc: DocId) -> &[FieldValue] {
        match doc_range(&self.offsets, doc) {
            Some((start, end)) => &self.values[start..end],
            None => &[],
        }
    }
}

/// A `(key, value)` pair stored in a composite family column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyedValue {
    pub key: String,
    pub value: String,
}

/// All keyed values of one composite family for every document of a segment.
///
/// Entries within a document are sorted by key, then value, so the values of
/// one key form a contiguous run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedColumn {
    offsets: Vec<u32>,
    entries: Vec<KeyedValue>,
}

impl KeyedColumn {
    pub fn max_doc(&self) -> DocId {
        (self.offsets.len() - 1) as DocId
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Every `(key, value)` entry of `doc`.
    pub fn entries(&self, doc: DocId) -> &[KeyedValue] {
        match doc_range(&self.offsets, doc) {
            Some((start, end)) => &self.entries[start..end],
            None => &[],
        }
    }

    /// Values stored under exactly `key` in `doc`.
    pub fn values_for<'a>(
        &'a self,
        doc: DocId,
        key: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let entries = self.entries(doc);
        let start = entries.partition_point(|e| e.key.as_str() < key);
        entries[start..]
            .iter()
            .take_while(move |e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Distinct keys present anywhere in the column, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.iter().map(|e| e.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

fn doc_range(offsets: &[u32], doc: DocId) -> Option<(usize, usize)> {
    let doc = doc as usize;
    if doc + 1 >= offsets.len() {
        return None;
    }
    Some((offsets[doc] as usize, offsets[doc + 1] as usize))
}

/// Total order used to sort the values of one document.
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Long(x), FieldValue::Long(y)) => x.cmp(y),
        (FieldValue::Double(x), FieldValue::Double(y)) => x.total_cmp(y),
        (FieldValue::Boolean(x), FieldValue::Boolean(y)) => x.cmp(y),
        (FieldValue::Keyword(x), FieldValue::Keyword(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &FieldValue) -> u8 {
    match v {
        FieldValue::Boolean(_) => 0,
        FieldValue::Long(_) => 1,
        FieldValue::Double(_) => 2,
        FieldValue::Keyword(_) => 3,
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Accumulates one column. Documents must be added in ascending order.
#[derive(Debug, Clone)]
pub(crate) struct ColumnBuilder {
    field_type: FieldType,
    offsets: Vec<u32>,
    values: Vec<FieldValue>,
}

impl ColumnBuilder {
    pub(crate) fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            offsets: vec![0],
            values: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, doc: DocId, value: FieldValue) {
        debug_assert!(doc as usize + 1 >= self.offsets.len(), "documents out of order");
        pad_offsets(&mut self.offsets, doc as usize + 1, self.values.len());
        self.values.push(value);
    }

    pub(crate) fn finish(mut self, max_doc: DocId) -> Column {
        pad_offsets(&mut self.offsets, max_doc as usize + 1, self.values.len());
        let dedup = self.field_type == FieldType::Keyword;
        let (offsets, values) = normalize(self.offsets, self.values, compare_values, dedup);
        Column {
            field_type: self.field_type,
            offsets,
            values,
        }
    }
}

/// Accumulates one composite family column.
#[derive(Debug, Clone)]
pub(crate) struct KeyedColumnBuilder {
    offsets: Vec<u32>,
    entries: Vec<KeyedValue>,
}

impl KeyedColumnBuilder {
    pub(crate) fn new() -> Self {
        Self {
            offsets: vec![0],
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, doc: DocId, key: String, value: String) {
        debug_assert!(doc as usize + 1 >= self.offsets.len(), "documents out of order");
        pad_offsets(&mut self.offsets, doc as usize + 1, self.entries.len());
        self.entries.push(KeyedValue { key, value });
    }

    pub(crate) fn finish(mut self, max_doc: DocId) -> KeyedColumn {
        pad_offsets(&mut self.offsets, max_doc as usize + 1, self.entries.len());
        let (offsets, entries) = normalize(self.offsets, self.entries, Ord::cmp, true);
        KeyedColumn { offsets, entries }
    }
}

/// Extend `offsets` to `len` entries, opening empty documents at `at`.
fn pad_offsets(offsets: &mut Vec<u32>, len: usize, at: usize) {
    while offsets.len() < len {
        offsets.push(at as u32);
    }
}

/// Sort (and optionally dedup) each document's run, rebuilding offsets.
fn normalize<T: PartialEq>(
    offsets: Vec<u32>,
    values: Vec<T>,
    cmp: impl Fn(&T, &T) -> Ordering,
    dedup: bool,
) -> (Vec<u32>, Vec<T>) {
    let mut out_offsets = Vec::with_capacity(offsets.len());
    let mut out_values = Vec::with_capacity(values.len());
    out_offsets.push(0);

    let mut remaining = values.into_iter();
    for window in offsets.windows(2) {
        let mut run: Vec<T> = remaining
            .by_ref()
            .take((window[1] - window[0]) as usize)
            .collect();
        run.sort_by(&cmp);
        if dedup {
            run.dedup();
        }
        out_values.extend(run);
        out_offsets.push(out_values.len() as u32);
    }
    (out_offsets, out_values)
}
