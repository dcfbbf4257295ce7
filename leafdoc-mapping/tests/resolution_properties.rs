//! Property tests for mapping resolution.

use leafdoc_core::{FieldDescriptor, FieldType, SchemaResolver};
use leafdoc_mapping::MappingRegistry;
use proptest::prelude::*;

fn registry() -> MappingRegistry {
    MappingRegistry::builder()
        .field("field", FieldType::Keyword)
        .alias("alias", "field")
        .family("json")
        .build()
        .expect("valid mapping")
}

fn arb_key() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 1..6).prop_map(|segments| segments.join("."))
}

/// Any non-empty key, including empty segments and far more segments than
/// the default depth limit.
fn arb_any_key() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9_]{0,4}", 1..40)
        .prop_map(|segments| segments.join("."))
        .prop_filter("key must not be empty", |key| !key.is_empty())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: any non-empty key under a family resolves to exactly that key.
    #[test]
    fn prop_family_admits_any_key(key in arb_any_key()) {
        let registry = registry();
        let name = format!("json.{}", key);
        let descriptor = registry.resolve(&name).expect("keyed member");
        prop_assert_eq!(descriptor, FieldDescriptor::keyed("json", key.clone()));
        prop_assert!(registry.exists(&name));
    }

    /// Property: distinct keys never resolve to equal descriptors.
    #[test]
    fn prop_distinct_keys_distinct_descriptors(a in arb_key(), b in arb_key()) {
        prop_assume!(a != b);
        let registry = registry();
        let da = registry.resolve(&format!("json.{}", a)).unwrap();
        let db = registry.resolve(&format!("json.{}", b)).unwrap();
        prop_assert_ne!(da, db);
    }

    /// Property: resolution is deterministic.
    #[test]
    fn prop_resolution_is_deterministic(name in "[a-z.]{0,12}") {
        let registry = registry();
        prop_assert_eq!(registry.resolve(&name), registry.resolve(&name));
        prop_assert_eq!(registry.exists(&name), registry.resolve(&name).is_ok());
    }

    /// Property: names outside the mapping never resolve.
    #[test]
    fn prop_unmapped_roots_not_found(name in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}") {
        let root = name.split('.').next().unwrap_or_default();
        prop_assume!(root != "field" && root != "alias" && root != "json");
        let err = registry().resolve(&name).unwrap_err();
        prop_assert!(err.is_not_found());
    }
}
