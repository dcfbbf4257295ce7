//! Query-scoped lookup factory.

use leafdoc_core::{LeafResult, LookupConfig, SchemaResolver, SegmentScope, ValueSourceProvider};

use crate::leaf::LeafDocLookup;

/// Holds the collaborators shared by one query execution and hands out a
/// fresh [`LeafDocLookup`] per segment.
///
/// Leaf lookups borrow the resolver and provider; they never share memo
/// state with each other.
#[derive(Debug, Clone)]
pub struct DocLookup<R, P> {
    resolver: R,
    provider: P,
    config: LookupConfig,
}

impl<R, P> DocLookup<R, P>
where
    R: SchemaResolver,
    P: ValueSourceProvider,
{
    /// Create a factory. Fails if `config` does not validate.
    ///
    /// Leaves read only the memo settings of `config`; separator and depth
    /// limit are the resolver's concern.
    pub fn new(resolver: R, provider: P, config: LookupConfig) -> LeafResult<Self> {
        config.validate()?;
        tracing::debug!(
            memo_capacity = config.initial_memo_capacity,
            memo_warn_threshold = config.memo_warn_threshold,
            "Created doc lookup"
        );
        Ok(Self {
            resolver,
            provider,
            config,
        })
    }

    pub fn with_defaults(resolver: R, provider: P) -> Self {
        Self {
            resolver,
            provider,
            config: LookupConfig::default(),
        }
    }

    /// A new, empty, unpositioned lookup for `segment`.
    pub fn leaf(&self, segment: SegmentScope) -> LeafDocLookup<'_, R, P> {
        LeafDocLookup::with_config(&self.resolver, &self.provider, segment, self.config.clone())
    }

    /// Whether `name` resolves, without touching any segment.
    pub fn has(&self, name: &str) -> bool {
        self.resolver.exists(name)
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafdoc_core::{
        DocId, DocValuesAccessor, FieldDescriptor, FieldType, FieldValue, LeafError, SegmentId,
        ValueSource,
    };

    #[derive(Debug)]
    struct OneField;

    impl SchemaResolver for OneField {
        fn resolve(&self, name: &str) -> LeafResult<FieldDescriptor> {
            if name == "flag" {
                Ok(FieldDescriptor::primitive("flag", FieldType::Boolean))
            } else {
                Err(LeafError::not_found(name))
            }
        }
    }

    #[derive(Debug)]
    struct AlwaysTrue;

    struct TrueSource;

    struct TrueAccessor;

    impl ValueSourceProvider for AlwaysTrue {
        fn provide(&self, _: &FieldDescriptor) -> LeafResult<Box<dyn ValueSource>> {
            Ok(Box::new(TrueSource))
        }
    }

    impl ValueSource for TrueSource {
        fn field_name(&self) -> &str {
            "flag"
        }

        fn load(&self, _: &SegmentScope) -> LeafResult<Box<dyn DocValuesAccessor>> {
            Ok(Box::new(TrueAccessor))
        }
    }

    impl DocValuesAccessor for TrueAccessor {
        fn read_doc(&mut self, _: DocId, out: &mut Vec<FieldValue>) -> LeafResult<()> {
            out.push(FieldValue::Boolean(true));
            Ok(())
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LookupConfig::new().with_depth_limit(0);
        assert!(DocLookup::new(OneField, AlwaysTrue, config).is_err());
    }

    #[test]
    fn test_new_rejects_oversized_memo_capacity() {
        let config = LookupConfig::new().with_memo_capacity(usize::MAX);
        let err = DocLookup::new(OneField, AlwaysTrue, config).unwrap_err();
        assert!(matches!(
            err,
            LeafError::Config(leafdoc_core::ConfigError::InvalidValue { ref field, .. })
                if field == "initial_memo_capacity"
        ));
    }

    #[test]
    fn test_leaves_do_not_share_memo_state() {
        let lookup = DocLookup::with_defaults(OneField, AlwaysTrue);
        let mut a = lookup.leaf(SegmentScope::new(SegmentId::now_v7(), 2));
        let mut b = lookup.leaf(SegmentScope::new(SegmentId::now_v7(), 3));

        a.advance(1).unwrap();
        assert_eq!(a.get("flag").unwrap().value().unwrap(), &FieldValue::Boolean(true));
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert_eq!(b.doc(), None);

        b.get("flag").unwrap();
        assert_eq!(b.stats().loads, 1);
    }

    #[test]
    fn test_leaf_inherits_config() {
        let config = LookupConfig::new().with_memo_capacity(64);
        let lookup = DocLookup::new(OneField, AlwaysTrue, config).unwrap();
        let leaf = lookup.leaf(SegmentScope::new(SegmentId::now_v7(), 1));
        assert_eq!(leaf.config().initial_memo_capacity, 64);
    }

    #[test]
    fn test_has_delegates_to_resolver() {
        let lookup = DocLookup::with_defaults(OneField, AlwaysTrue);
        assert!(lookup.has("flag"));
        assert!(!lookup.has("other"));
    }
}
