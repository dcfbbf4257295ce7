//! leafdoc Test Utilities
//!
//! Centralized test infrastructure for the leafdoc workspace:
//! - Fake resolvers and providers with fixed answers
//! - Counting and failure-injecting provider wrappers
//! - Proptest generators for names and values
//! - Fixtures for a small mapping and segment
//! - Assertions on error kinds

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

pub use leafdoc_core::{
    DocId, DocValuesAccessor, FieldDescriptor, FieldType, FieldValue, LeafError, LeafResult,
    LookupConfig, SchemaResolver, SegmentId, SegmentScope, ValueSource, ValueSourceProvider,
};
pub use leafdoc_mapping::MappingRegistry;
pub use leafdoc_storage::{FieldDataProvider, SegmentData, SegmentStore, SegmentWriter};

// ============================================================================
// TRACING
// ============================================================================

static TRACING: Once = Once::new();

/// Install a test subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `leafdoc=debug`. Output goes through the
/// test writer so it is captured per test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("leafdoc=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// FAKE COLLABORATORS
// ============================================================================

/// Resolver backed by a fixed name to descriptor table.
#[derive(Debug, Clone, Default)]
pub struct FakeResolver {
    table: HashMap<String, FieldDescriptor>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `name` to `descriptor`.
    pub fn with(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.table.insert(name.into(), descriptor);
        self
    }

    /// Map a concrete field to itself.
    pub fn with_field(self, name: &str, field_type: FieldType) -> Self {
        self.with(name, FieldDescriptor::primitive(name, field_type))
    }

    /// Map `alias` to the concrete field `target`.
    pub fn with_alias(self, alias: &str, target: &str, field_type: FieldType) -> Self {
        self.with(alias, FieldDescriptor::alias(alias, target, field_type))
    }
}

impl SchemaResolver for FakeResolver {
    fn resolve(&self, name: &str) -> LeafResult<FieldDescriptor> {
        self.table
            .get(name)
            .cloned()
            .ok_or_else(|| LeafError::not_found(name))
    }
}

/// Provider serving fixed per-document values keyed by canonical name.
///
/// Descriptors with no entry load an accessor with no values for any doc.
#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    data: HashMap<String, Arc<Vec<Vec<FieldValue>>>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `docs[d]` as the values of doc `d` for `canonical_name`.
    pub fn with_values(
        mut self,
        canonical_name: impl Into<String>,
        docs: Vec<Vec<FieldValue>>,
    ) -> Self {
        self.data.insert(canonical_name.into(), Arc::new(docs));
        self
    }
}

impl ValueSourceProvider for FakeProvider {
    fn provide(&self, descriptor: &FieldDescriptor) -> LeafResult<Box<dyn ValueSource>> {
        let name = descriptor.canonical_name();
        let docs = self.data.get(&name).cloned().unwrap_or_default();
        Ok(Box::new(FixedSource { name, docs }))
    }
}

struct FixedSource {
    name: String,
    docs: Arc<Vec<Vec<FieldValue>>>,
}

impl ValueSource for FixedSource {
    fn field_name(&self) -> &str {
        &self.name
    }

    fn load(&self, _segment: &SegmentScope) -> LeafResult<Box<dyn DocValuesAccessor>> {
        Ok(Box::new(FixedAccessor {
            docs: Arc::clone(&self.docs),
        }))
    }
}

struct FixedAccessor {
    docs: Arc<Vec<Vec<FieldValue>>>,
}

impl DocValuesAccessor for FixedAccessor {
    fn read_doc(&mut self, doc: DocId, out: &mut Vec<FieldValue>) -> LeafResult<()> {
        if let Some(values) = self.docs.get(doc as usize) {
            out.extend(values.iter().cloned());
        }
        Ok(())
    }
}

// ============================================================================
// PROVIDER WRAPPERS
// ============================================================================

#[derive(Debug, Default)]
struct Counts {
    provides: HashMap<String, usize>,
    loads: HashMap<String, usize>,
}

/// Wraps a provider and counts `provide` and `load` calls per canonical name.
pub struct CountingProvider<P> {
    inner: P,
    counts: Arc<Mutex<Counts>>,
}

impl<P: ValueSourceProvider> CountingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            counts: Arc::new(Mutex::new(Counts::default())),
        }
    }

    /// `provide` calls for `canonical_name`.
    pub fn provides(&self, canonical_name: &str) -> usize {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.provides.get(canonical_name).copied().unwrap_or(0)
    }

    /// `load` calls for `canonical_name`.
    pub fn loads(&self, canonical_name: &str) -> usize {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.loads.get(canonical_name).copied().unwrap_or(0)
    }

    /// `load` calls across all names.
    pub fn total_loads(&self) -> usize {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.loads.values().sum()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: ValueSourceProvider> ValueSourceProvider for CountingProvider<P> {
    fn provide(&self, descriptor: &FieldDescriptor) -> LeafResult<Box<dyn ValueSource>> {
        let name = descriptor.canonical_name();
        {
            let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
            *counts.provides.entry(name.clone()).or_default() += 1;
        }
        let inner = self.inner.provide(descriptor)?;
        Ok(Box::new(CountingSource {
            name,
            inner,
            counts: Arc::clone(&self.counts),
        }))
    }
}

struct CountingSource {
    name: String,
    inner: Box<dyn ValueSource>,
    counts: Arc<Mutex<Counts>>,
}

impl ValueSource for CountingSource {
    fn field_name(&self) -> &str {
        self.inner.field_name()
    }

    fn load(&self, segment: &SegmentScope) -> LeafResult<Box<dyn DocValuesAccessor>> {
        {
            let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
            *counts.loads.entry(self.name.clone()).or_default() += 1;
        }
        self.inner.load(segment)
    }
}

/// Wraps a provider so the first `failures` loads fail with `LoadFailure`.
pub struct FlakyProvider<P> {
    inner: P,
    remaining: Arc<AtomicUsize>,
}

impl<P: ValueSourceProvider> FlakyProvider<P> {
    pub fn new(inner: P, failures: usize) -> Self {
        Self {
            inner,
            remaining: Arc::new(AtomicUsize::new(failures)),
        }
    }

    /// Failures still to be injected.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }
}

impl<P: ValueSourceProvider> ValueSourceProvider for FlakyProvider<P> {
    fn provide(&self, descriptor: &FieldDescriptor) -> LeafResult<Box<dyn ValueSource>> {
        Ok(Box::new(FlakySource {
            inner: self.inner.provide(descriptor)?,
            remaining: Arc::clone(&self.remaining),
        }))
    }
}

struct FlakySource {
    inner: Box<dyn ValueSource>,
    remaining: Arc<AtomicUsize>,
}

impl ValueSource for FlakySource {
    fn field_name(&self) -> &str {
        self.inner.field_name()
    }

    fn load(&self, segment: &SegmentScope) -> LeafResult<Box<dyn DocValuesAccessor>> {
        let injected = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(LeafError::load_failure(
                self.inner.field_name(),
                "injected failure",
            ));
        }
        self.inner.load(segment)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for names and values.

    use super::*;
    use proptest::prelude::*;

    /// A single lowercase path segment.
    pub fn arb_segment_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,7}"
    }

    /// A dotted key of one to `max_depth` segments.
    pub fn arb_key(max_depth: usize) -> impl Strategy<Value = String> {
        prop::collection::vec(arb_segment_name(), 1..=max_depth.max(1)).prop_map(|s| s.join("."))
    }

    pub fn arb_field_type() -> impl Strategy<Value = FieldType> {
        prop_oneof![
            Just(FieldType::Long),
            Just(FieldType::Double),
            Just(FieldType::Keyword),
            Just(FieldType::Boolean),
        ]
    }

    /// A value of `field_type`. Doubles are finite.
    pub fn arb_value_of(field_type: FieldType) -> BoxedStrategy<FieldValue> {
        match field_type {
            FieldType::Long => any::<i64>().prop_map(FieldValue::Long).boxed(),
            FieldType::Double => (-1.0e9f64..1.0e9).prop_map(FieldValue::Double).boxed(),
            FieldType::Keyword => "[a-z0-9]{0,8}".prop_map(FieldValue::Keyword).boxed(),
            FieldType::Boolean => any::<bool>().prop_map(FieldValue::Boolean).boxed(),
        }
    }

    pub fn arb_field_value() -> impl Strategy<Value = FieldValue> {
        arb_field_type().prop_flat_map(arb_value_of)
    }

    /// Per-document values for `num_docs` documents, up to three per doc.
    pub fn arb_doc_values(
        field_type: FieldType,
        num_docs: usize,
    ) -> impl Strategy<Value = Vec<Vec<FieldValue>>> {
        prop::collection::vec(
            prop::collection::vec(arb_value_of(field_type), 0..=3),
            num_docs,
        )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built mapping and segment for common scenarios.
    //!
    //! The standard mapping has `price` (double), `count` (long), `tags`
    //! (keyword), `active` (boolean), `cost` (alias of `price`) and the
    //! composite family `labels`.

    use super::*;
    use serde_json::json;

    pub fn standard_mapping() -> MappingRegistry {
        MappingRegistry::builder()
            .field("price", FieldType::Double)
            .field("count", FieldType::Long)
            .field("tags", FieldType::Keyword)
            .field("active", FieldType::Boolean)
            .alias("cost", "price")
            .family("labels")
            .build()
            .unwrap_or_else(|e| panic!("standard mapping must build: {}", e))
    }

    /// Documents for the standard mapping.
    ///
    /// Doc 2 has no price and no labels.
    pub fn standard_documents() -> Vec<serde_json::Value> {
        vec![
            json!({
                "price": 10.5,
                "count": 3,
                "tags": ["red", "blue"],
                "active": true,
                "labels": { "env": "prod", "team": { "name": "core" } }
            }),
            json!({
                "price": 99.0,
                "count": 1,
                "tags": "green",
                "active": false,
                "labels": { "env": "dev" }
            }),
            json!({
                "count": 7,
                "tags": [],
                "active": true
            }),
        ]
    }

    /// Write [`standard_documents`] into a sealed segment.
    pub fn standard_segment(mapping: &MappingRegistry) -> SegmentData {
        let mut writer = SegmentWriter::new(mapping);
        for doc in standard_documents() {
            writer
                .add_document(&doc)
                .unwrap_or_else(|e| panic!("standard document must index: {}", e));
        }
        writer.finish()
    }

    /// Open the standard segment in a fresh store.
    pub fn standard_store(mapping: &MappingRegistry) -> (Arc<SegmentStore>, SegmentScope) {
        let store = Arc::new(SegmentStore::new());
        let scope = store
            .open(standard_segment(mapping))
            .unwrap_or_else(|e| panic!("standard segment must open: {}", e));
        (store, scope)
    }

    /// A scope over `max_doc` documents with a fresh id.
    pub fn scope(max_doc: DocId) -> SegmentScope {
        SegmentScope::new(SegmentId::now_v7(), max_doc)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on leafdoc error kinds.

    use super::*;

    pub fn assert_not_found<T: std::fmt::Debug>(result: &LeafResult<T>) {
        match result {
            Err(e) if e.is_not_found() => {}
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    pub fn assert_type_mismatch<T: std::fmt::Debug>(result: &LeafResult<T>) {
        match result {
            Err(e) if e.is_type_mismatch() => {}
            other => panic!("Expected TypeMismatch, got {:?}", other),
        }
    }

    pub fn assert_load_failure<T: std::fmt::Debug>(result: &LeafResult<T>) {
        match result {
            Err(e) if e.is_load_failure() => {}
            other => panic!("Expected LoadFailure, got {:?}", other),
        }
    }
}
