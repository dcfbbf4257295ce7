//! Dotted path helpers.

use leafdoc_core::{LeafResult, MappingError};

/// Check that `name` is a usable field path: non-empty, without empty
/// segments.
pub fn validate_name(name: &str, separator: char) -> LeafResult<()> {
    if name.is_empty() {
        return Err(MappingError::InvalidName {
            name: name.to_string(),
            reason: "field names must not be empty".to_string(),
        }
        .into());
    }
    if name.split(separator).any(str::is_empty) {
        return Err(MappingError::InvalidName {
            name: name.to_string(),
            reason: format!("field names must not contain empty `{}` segments", separator),
        }
        .into());
    }
    Ok(())
}

/// Proper prefixes of `name` ending right before a separator, shortest first.
///
/// `a.b.c` yields `a` and `a.b`.
pub fn proper_prefixes(name: &str, separator: char) -> impl Iterator<Item = &str> + '_ {
    name.match_indices(separator).map(move |(idx, _)| &name[..idx])
}

/// Number of segments in a composite member key, or `None` if any segment
/// is empty.
pub fn key_depth(key: &str, separator: char) -> Option<usize> {
    let mut depth = 0;
    for segment in key.split(separator) {
        if segment.is_empty() {
            return None;
        }
        depth += 1;
    }
    Some(depth)
}

/// Join two path parts with the separator. An empty parent yields `child`.
pub fn join(parent: &str, child: &str, separator: char) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        let mut out = String::with_capacity(parent.len() + child.len() + 1);
        out.push_str(parent);
        out.push(separator);
        out.push_str(child);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("field", '.').is_ok());
        assert!(validate_name("obj.field", '.').is_ok());
        assert!(validate_name("", '.').is_err());
        assert!(validate_name(".field", '.').is_err());
        assert!(validate_name("field.", '.').is_err());
        assert!(validate_name("a..b", '.').is_err());
    }

    #[test]
    fn test_proper_prefixes() {
        let prefixes: Vec<&str> = proper_prefixes("a.b.c", '.').collect();
        assert_eq!(prefixes, vec!["a", "a.b"]);
        assert_eq!(proper_prefixes("plain", '.').count(), 0);
    }

    #[test]
    fn test_key_depth() {
        assert_eq!(key_depth("key1", '.'), Some(1));
        assert_eq!(key_depth("a.b.c", '.'), Some(3));
        assert_eq!(key_depth("", '.'), None);
        assert_eq!(key_depth("a..b", '.'), None);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "a", '.'), "a");
        assert_eq!(join("a", "b", '/'), "a/b");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: joined segments are valid names and every join point is a prefix.
        #[test]
        fn prop_join_produces_valid_prefixed_names(
            segments in prop::collection::vec("[a-z][a-z0-9_]{0,6}", 1..5)
        ) {
            let name = segments
                .iter()
                .fold(String::new(), |acc, s| join(&acc, s, '.'));
            prop_assert!(validate_name(&name, '.').is_ok());
            prop_assert_eq!(proper_prefixes(&name, '.').count(), segments.len() - 1);
            prop_assert_eq!(key_depth(&name, '.'), Some(segments.len()));
        }
    }
}
