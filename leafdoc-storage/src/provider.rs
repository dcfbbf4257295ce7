//! Field data provider: the reference [`ValueSourceProvider`].
//!
//! `provide` is cheap and only captures what to read. `load` looks the
//! segment up in the [`SegmentStore`] and hands out an accessor over the
//! matching column. A segment without values for a field loads as an empty
//! accessor rather than failing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use leafdoc_core::{
    DocId, DocValuesAccessor, FieldDescriptor, FieldType, FieldValue, LeafError, LeafResult,
    SegmentScope, ValueSource, ValueSourceProvider,
};

use crate::column::{Column, KeyedColumn};
use crate::segment::SegmentData;
use crate::store::SegmentStore;

/// Provides column-backed value sources over a [`SegmentStore`].
#[derive(Debug, Clone)]
pub struct FieldDataProvider {
    store: Arc<SegmentStore>,
    loads: Arc<AtomicU64>,
}

impl FieldDataProvider {
    pub fn new(store: Arc<SegmentStore>) -> Self {
        Self {
            store,
            loads: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> &Arc<SegmentStore> {
        &self.store
    }

    /// Number of successful loads performed by sources of this provider.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

impl ValueSourceProvider for FieldDataProvider {
    fn provide(&self, descriptor: &FieldDescriptor) -> LeafResult<Box<dyn ValueSource>> {
        let source = SegmentSource {
            store: Arc::clone(&self.store),
            loads: Arc::clone(&self.loads),
            name: descriptor.canonical_name(),
        };
        Ok(match descriptor {
            FieldDescriptor::Primitive { .. } | FieldDescriptor::Alias { .. } => {
                Box::new(ColumnValueSource {
                    source,
                    field: descriptor.storage_field().to_string(),
                    field_type: descriptor.field_type(),
                })
            }
            FieldDescriptor::KeyedMember { family, key } => Box::new(KeyedValueSource {
                source,
                family: family.clone(),
                key: key.clone(),
            }),
        })
    }
}

/// What every source needs to reach a segment.
#[derive(Debug)]
struct SegmentSource {
    store: Arc<SegmentStore>,
    loads: Arc<AtomicU64>,
    name: String,
}

impl SegmentSource {
    fn open(&self, segment: &SegmentScope) -> LeafResult<Arc<SegmentData>> {
        let data = self.store.get(segment.id())?.ok_or_else(|| {
            LeafError::load_failure(&self.name, format!("segment {} is not open", segment.id()))
        })?;
        if data.max_doc() != segment.max_doc() {
            return Err(LeafError::load_failure(
                &self.name,
                format!(
                    "segment {} has {} documents, scope expects {}",
                    segment.id(),
                    data.max_doc(),
                    segment.max_doc()
                ),
            ));
        }
        Ok(data)
    }

    fn record_load(&self, segment: &SegmentScope, empty: bool) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(field = %self.name, segment = %segment.id(), empty, "Loaded field data");
    }
}

/// Reads a concrete field's column.
#[derive(Debug)]
struct ColumnValueSource {
    source: SegmentSource,
    field: String,
    field_type: FieldType,
}

impl ValueSource for ColumnValueSource {
    fn field_name(&self) -> &str {
        &self.source.name
    }

    fn load(&self, segment: &SegmentScope) -> LeafResult<Box<dyn DocValuesAccessor>> {
        let data = self.source.open(segment)?;
        let column = data.column(&self.field);
        let empty = column.is_none();
        let accessor: Box<dyn DocValuesAccessor> = match column {
            Some(column) if column.field_type() != self.field_type => {
                return Err(LeafError::load_failure(
                    &self.source.name,
                    format!(
                        "column holds {} values, mapping expects {}",
                        column.field_type(),
                        self.field_type
                    ),
                ));
            }
            Some(column) => Box::new(ColumnAccessor { column }),
            None => Box::new(EmptyAccessor),
        };
        self.source.record_load(segment, empty);
        Ok(accessor)
    }
}

/// Reads one key of a composite family column.
#[derive(Debug)]
struct KeyedValueSource {
    source: SegmentSource,
    family: String,
    key: String,
}

impl ValueSource for KeyedValueSource {
    fn field_name(&self) -> &str {
        &self.source.name
    }

    fn load(&self, segment: &SegmentScope) -> LeafResult<Box<dyn DocValuesAccessor>> {
        let data = self.source.open(segment)?;
        let column = data.keyed_column(&self.family);
        let empty = column.is_none();
        let accessor: Box<dyn DocValuesAccessor> = match column {
            Some(column) => Box::new(KeyedAccessor {
                column,
                key: self.key.clone(),
            }),
            None => Box::new(EmptyAccessor),
        };
        self.source.record_load(segment, empty);
        Ok(accessor)
    }
}

/// Accessor over a concrete field column.
#[derive(Debug, Clone)]
pub struct ColumnAccessor {
    column: Arc<Column>,
}

impl ColumnAccessor {
    pub fn new(column: Arc<Column>) -> Self {
        Self { column }
    }
}

impl DocValuesAccessor for ColumnAccessor {
    fn read_doc(&mut self, doc: DocId, out: &mut Vec<FieldValue>) -> LeafResult<()> {
        out.extend_from_slice(self.column.values(doc));
        Ok(())
    }
}

/// Accessor over one key of a composite family column. Values stored under
/// other keys, including keys that merely share a prefix, are never read.
#[derive(Debug, Clone)]
pub struct KeyedAccessor {
    column: Arc<KeyedColumn>,
    key: String,
}

impl KeyedAccessor {
    pub fn new(column: Arc<KeyedColumn>, key: impl Into<String>) -> Self {
        Self {
            column,
            key: key.into(),
        }
    }
}

impl DocValuesAccessor for KeyedAccessor {
    fn read_doc(&mut self, doc: DocId, out: &mut Vec<FieldValue>) -> LeafResult<()> {
        out.extend(
            self.column
                .values_for(doc, &self.key)
                .map(|v| FieldValue::Keyword(v.to_string())),
        );
        Ok(())
    }
}

/// Accessor for a field with no values in the segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyAccessor;

impl DocValuesAccessor for EmptyAccessor {
    fn read_doc(&mut self, _doc: DocId, _out: &mut Vec<FieldValue>) -> LeafResult<()> {
        Ok(())
    }
}
