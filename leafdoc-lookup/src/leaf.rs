//! Per-segment memoizing field lookup.
//!
//! A [`LeafDocLookup`] answers `get(name)` for the documents of one segment.
//! The first successful `get` for a name resolves it, loads its values and
//! keeps the resulting view; every later `get` for the same name returns that
//! view. Failed attempts leave no trace, so the next `get` tries again from
//! scratch.
//!
//! The memo table is keyed by the name exactly as requested. A field and an
//! alias of it are two entries with two loads.
//!
//! # Example
//!
//! ```ignore
//! let mut lookup = LeafDocLookup::new(&mapping, &provider, scope);
//! lookup.advance(0)?;
//! let price = lookup.get("price")?.value()?.as_f64();
//! lookup.advance(1)?; // rebinds "price" without reloading
//! ```

use std::collections::HashMap;

use leafdoc_core::{
    DocId, LeafError, LeafResult, LookupConfig, SchemaResolver, SegmentScope, ValueSourceProvider,
};

use crate::stats::LookupStats;
use crate::view::DocValuesView;

/// Memoizing field lookup for one segment.
///
/// Owned by a single evaluation context; not shared between threads.
pub struct LeafDocLookup<'a, R: ?Sized, P: ?Sized> {
    resolver: &'a R,
    provider: &'a P,
    segment: SegmentScope,
    config: LookupConfig,
    doc: Option<DocId>,
    views: HashMap<String, DocValuesView>,
    stats: LookupStats,
    warned_memo_size: bool,
}

impl<'a, R, P> LeafDocLookup<'a, R, P>
where
    R: SchemaResolver + ?Sized,
    P: ValueSourceProvider + ?Sized,
{
    /// Create a lookup with default configuration.
    pub fn new(resolver: &'a R, provider: &'a P, segment: SegmentScope) -> Self {
        Self::with_config(resolver, provider, segment, LookupConfig::default())
    }

    /// Create a lookup with `config`.
    ///
    /// Only the memo settings are read. The reserved capacity is capped at
    /// [`LookupConfig::MAX_MEMO_CAPACITY`] even if `config` was never
    /// validated.
    pub fn with_config(
        resolver: &'a R,
        provider: &'a P,
        segment: SegmentScope,
        config: LookupConfig,
    ) -> Self {
        let capacity = config
            .initial_memo_capacity
            .min(LookupConfig::MAX_MEMO_CAPACITY);
        Self {
            resolver,
            provider,
            segment,
            views: HashMap::with_capacity(capacity),
            config,
            doc: None,
            stats: LookupStats::default(),
            warned_memo_size: false,
        }
    }

    /// View of `name` bound to the current document.
    ///
    /// Resolves and loads on the first successful call for `name`; later
    /// calls return the same view. Resolution and load errors are returned
    /// unchanged and nothing is memoized for them.
    pub fn get(&mut self, name: &str) -> LeafResult<&DocValuesView> {
        if self.views.contains_key(name) {
            self.stats.hits += 1;
            tracing::trace!(field = name, "Doc lookup hit");
        } else {
            self.stats.misses += 1;
            let view = match self.materialize(name) {
                Ok(view) => view,
                Err(e) => {
                    self.stats.failures += 1;
                    self.log_failure(name, &e);
                    return Err(e);
                }
            };
            self.stats.loads += 1;
            tracing::debug!(
                field = name,
                kind = %view.descriptor().kind(),
                segment = %self.segment.id(),
                "Loaded doc values"
            );
            self.views.insert(name.to_string(), view);
            self.check_memo_size();
        }
        self.views
            .get(name)
            .ok_or_else(|| LeafError::not_found(name))
    }

    /// Whether `name` resolves. Never loads and never fails.
    pub fn has(&self, name: &str) -> bool {
        self.views.contains_key(name) || self.resolver.exists(name)
    }

    /// Move to `doc` and rebind every view looked up so far.
    ///
    /// Names not yet looked up stay untouched until their first `get`, which
    /// binds them to `doc` directly. A `doc` outside the segment fails with
    /// `DocOutOfRange` and changes nothing. If a view fails to read `doc`,
    /// the remaining views are still rebound and the first error is
    /// returned.
    pub fn advance(&mut self, doc: DocId) -> LeafResult<()> {
        self.segment.check_doc(doc)?;
        self.doc = Some(doc);

        let mut first_err = None;
        for view in self.views.values_mut() {
            if let Err(e) = view.set_document(doc) {
                tracing::warn!(
                    field = view.field_name(),
                    doc,
                    error = %e,
                    "Failed to read doc values"
                );
                first_err.get_or_insert(e);
            }
        }
        tracing::trace!(doc, views = self.views.len(), "Advanced doc lookup");
        first_err.map_or(Ok(()), Err)
    }

    /// Previously materialized view of `name`, without resolving or loading.
    pub fn cached(&self, name: &str) -> Option<&DocValuesView> {
        self.views.get(name)
    }

    /// Names with a memoized view, sorted.
    pub fn cached_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.views.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Current document, if the lookup has been positioned.
    pub fn doc(&self) -> Option<DocId> {
        self.doc
    }

    pub fn segment(&self) -> &SegmentScope {
        &self.segment
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn stats(&self) -> LookupStats {
        self.stats
    }

    /// Number of memoized views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Resolve, provide, load and bind. Touches no lookup state.
    fn materialize(&self, name: &str) -> LeafResult<DocValuesView> {
        let descriptor = self.resolver.resolve(name)?;
        let source = self.provider.provide(&descriptor)?;
        let accessor = source.load(&self.segment)?;
        let mut view = DocValuesView::new(name, descriptor, accessor);
        if let Some(doc) = self.doc {
            view.set_document(doc)?;
        }
        Ok(view)
    }

    fn log_failure(&self, name: &str, err: &LeafError) {
        match err {
            LeafError::Resolve(_) => {
                tracing::debug!(field = name, error = %err, "Doc lookup failed to resolve")
            }
            _ => tracing::warn!(
                field = name,
                segment = %self.segment.id(),
                error = %err,
                "Doc lookup failed to load"
            ),
        }
    }

    fn check_memo_size(&mut self) {
        if !self.warned_memo_size && self.views.len() > self.config.memo_warn_threshold {
            self.warned_memo_size = true;
            tracing::warn!(
                views = self.views.len(),
                threshold = self.config.memo_warn_threshold,
                segment = %self.segment.id(),
                "Doc lookup memo table is unusually large"
            );
        }
    }
}

impl<R: ?Sized, P: ?Sized> std::fmt::Debug for LeafDocLookup<'_, R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafDocLookup")
            .field("segment", &self.segment)
            .field("doc", &self.doc)
            .field("views", &self.views.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafdoc_core::{
        DocValuesAccessor, DocValuesError, FieldDescriptor, FieldType, FieldValue, SegmentId,
        ValueSource,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Resolves "n" and "alias" to one long field and "odd" to a field whose
    // even documents are unreadable; everything else is unknown.
    struct TinySchema;

    impl SchemaResolver for TinySchema {
        fn resolve(&self, name: &str) -> LeafResult<FieldDescriptor> {
            match name {
                "n" => Ok(FieldDescriptor::primitive("n", FieldType::Long)),
                "odd" => Ok(FieldDescriptor::primitive("odd", FieldType::Long)),
                "alias" => Ok(FieldDescriptor::alias("alias", "n", FieldType::Long)),
                _ => Err(LeafError::not_found(name)),
            }
        }
    }

    // Every doc holds its own ordinal; the first `fail_loads` loads fail.
    #[derive(Default)]
    struct OrdinalProvider {
        fail_loads: usize,
        provided: AtomicUsize,
    }

    struct OrdinalSource {
        fail: bool,
        odd_only: bool,
    }

    struct OrdinalAccessor {
        odd_only: bool,
    }

    impl ValueSourceProvider for OrdinalProvider {
        fn provide(&self, descriptor: &FieldDescriptor) -> LeafResult<Box<dyn ValueSource>> {
            let n = self.provided.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(OrdinalSource {
                fail: n < self.fail_loads,
                odd_only: descriptor.storage_field() == "odd",
            }))
        }
    }

    impl ValueSource for OrdinalSource {
        fn field_name(&self) -> &str {
            "n"
        }

        fn load(&self, _: &SegmentScope) -> LeafResult<Box<dyn DocValuesAccessor>> {
            if self.fail {
                Err(LeafError::load_failure("n", "storage hiccup"))
            } else {
                Ok(Box::new(OrdinalAccessor {
                    odd_only: self.odd_only,
                }))
            }
        }
    }

    impl DocValuesAccessor for OrdinalAccessor {
        fn read_doc(&mut self, doc: DocId, out: &mut Vec<FieldValue>) -> LeafResult<()> {
            if self.odd_only && doc % 2 == 0 {
                return Err(LeafError::load_failure("odd", "corrupt block"));
            }
            out.push(FieldValue::Long(doc as i64));
            Ok(())
        }
    }

    fn scope() -> SegmentScope {
        SegmentScope::new(SegmentId::now_v7(), 10)
    }

    #[test]
    fn test_get_memoizes_by_name() {
        let provider = OrdinalProvider::default();
        let mut lookup = LeafDocLookup::new(&TinySchema, &provider, scope());

        let first = lookup.get("n").unwrap() as *const DocValuesView;
        let second = lookup.get("n").unwrap() as *const DocValuesView;
        assert!(std::ptr::eq(first, second));
        assert_eq!(provider.provided.load(Ordering::SeqCst), 1);
        assert_eq!(lookup.stats().hits, 1);
        assert_eq!(lookup.stats().misses, 1);
        assert_eq!(lookup.stats().loads, 1);
    }

    #[test]
    fn test_alias_gets_its_own_slot() {
        let provider = OrdinalProvider::default();
        let mut lookup = LeafDocLookup::new(&TinySchema, &provider, scope());
        lookup.advance(4).unwrap();

        let direct = lookup.get("n").unwrap().values().to_vec();
        let aliased = lookup.get("alias").unwrap().values().to_vec();
        assert_eq!(direct, aliased);
        assert_eq!(lookup.len(), 2);
        assert_eq!(provider.provided.load(Ordering::SeqCst), 2);
        assert_eq!(lookup.cached_names(), vec!["alias", "n"]);
    }

    #[test]
    fn test_not_found_is_never_cached() {
        let provider = OrdinalProvider::default();
        let mut lookup = LeafDocLookup::new(&TinySchema, &provider, scope());
        for _ in 0..3 {
            assert!(lookup.get("missing").unwrap_err().is_not_found());
        }
        assert!(lookup.is_empty());
        assert_eq!(lookup.stats().failures, 3);
        assert_eq!(provider.provided.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_load_failure_then_retry_succeeds() {
        let provider = OrdinalProvider {
            fail_loads: 1,
            ..Default::default()
        };
        let mut lookup = LeafDocLookup::new(&TinySchema, &provider, scope());

        assert!(lookup.get("n").unwrap_err().is_load_failure());
        assert!(lookup.cached("n").is_none());

        assert!(lookup.get("n").is_ok());
        assert!(lookup.get("n").is_ok());
        assert_eq!(provider.provided.load(Ordering::SeqCst), 2);
        assert_eq!(lookup.stats().loads, 1);
        assert_eq!(lookup.stats().failures, 1);
    }

    #[test]
    fn test_advance_rebinds_without_loading() {
        let provider = OrdinalProvider::default();
        let mut lookup = LeafDocLookup::new(&TinySchema, &provider, scope());
        lookup.advance(1).unwrap();
        assert_eq!(lookup.get("n").unwrap().value().unwrap(), &FieldValue::Long(1));

        lookup.advance(7).unwrap();
        assert_eq!(provider.provided.load(Ordering::SeqCst), 1);
        let view = lookup.cached("n").unwrap();
        assert_eq!(view.doc(), Some(7));
        assert_eq!(view.value().unwrap(), &FieldValue::Long(7));

        // first requested after the advance: already on doc 7
        assert_eq!(lookup.get("alias").unwrap().value().unwrap(), &FieldValue::Long(7));
    }

    #[test]
    fn test_advance_out_of_range_changes_nothing() {
        let provider = OrdinalProvider::default();
        let mut lookup = LeafDocLookup::new(&TinySchema, &provider, scope());
        lookup.advance(2).unwrap();
        lookup.get("n").unwrap();

        let err = lookup.advance(10).unwrap_err();
        assert!(matches!(
            err,
            LeafError::DocValues(DocValuesError::DocOutOfRange { doc: 10, max_doc: 10 })
        ));
        assert_eq!(lookup.doc(), Some(2));
        assert_eq!(lookup.cached("n").unwrap().doc(), Some(2));
    }

    #[test]
    fn test_advance_rebinds_all_views_despite_read_failure() {
        let provider = OrdinalProvider::default();
        let mut lookup = LeafDocLookup::new(&TinySchema, &provider, scope());
        lookup.advance(1).unwrap();
        lookup.get("n").unwrap();
        lookup.get("odd").unwrap();
        lookup.get("alias").unwrap();

        let err = lookup.advance(2).unwrap_err();
        assert_eq!(err, LeafError::load_failure("odd", "corrupt block"));
        assert_eq!(lookup.doc(), Some(2));
        for name in ["n", "alias"] {
            let view = lookup.cached(name).unwrap();
            assert_eq!(view.doc(), Some(2));
            assert_eq!(view.values(), &[FieldValue::Long(2)]);
        }
        let odd = lookup.cached("odd").unwrap();
        assert_eq!(odd.doc(), Some(2));
        assert!(odd.is_empty());

        // the failed view is still memoized and recovers on the next doc
        lookup.advance(3).unwrap();
        assert_eq!(lookup.cached("odd").unwrap().values(), &[FieldValue::Long(3)]);
        assert_eq!(provider.provided.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_capacity_is_capped_for_unvalidated_config() {
        let provider = OrdinalProvider::default();
        let config = LookupConfig::new().with_memo_capacity(usize::MAX);
        let mut lookup = LeafDocLookup::with_config(&TinySchema, &provider, scope(), config);
        assert_eq!(lookup.config().initial_memo_capacity, usize::MAX);
        lookup.get("n").unwrap();
        assert_eq!(lookup.len(), 1);
    }

    #[test]
    fn test_unpositioned_view_is_empty() {
        let provider = OrdinalProvider::default();
        let mut lookup = LeafDocLookup::new(&TinySchema, &provider, scope());
        let view = lookup.get("n").unwrap();
        assert_eq!(view.doc(), None);
        assert!(view.is_empty());
    }

    #[test]
    fn test_has_never_loads() {
        let provider = OrdinalProvider::default();
        let lookup = LeafDocLookup::new(&TinySchema, &provider, scope());
        assert!(lookup.has("n"));
        assert!(lookup.has("alias"));
        assert!(!lookup.has("missing"));
        assert_eq!(provider.provided.load(Ordering::SeqCst), 0);
        assert!(lookup.is_empty());
    }

    #[test]
    fn test_memo_warning_threshold_does_not_evict() {
        let provider = OrdinalProvider::default();
        let config = LookupConfig::new().with_memo_warn_threshold(1);
        let mut lookup = LeafDocLookup::with_config(&TinySchema, &provider, scope(), config);
        lookup.get("n").unwrap();
        lookup.get("alias").unwrap();
        assert_eq!(lookup.len(), 2);
        assert!(lookup.warned_memo_size);
    }

    #[test]
    fn test_debug_output() {
        let provider = OrdinalProvider::default();
        let lookup = LeafDocLookup::new(&TinySchema, &provider, scope());
        assert!(format!("{:?}", lookup).contains("LeafDocLookup"));
    }
}
