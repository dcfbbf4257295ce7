//! Configuration types

use crate::*;
use serde::{Deserialize, Serialize};

/// Tuning knobs shared by the mapping registry and the lookup cache.
///
/// Each consumer reads only its own group of fields:
///
/// - Mapping (`MappingRegistry`, `SegmentWriter`): `path_separator` and
///   `default_depth_limit`.
/// - Lookup (`DocLookup`, `LeafDocLookup`): `initial_memo_capacity` and
///   `memo_warn_threshold`.
///
/// Name resolution belongs to the resolver, so the mapping fields of a
/// config handed to a lookup have no effect there. Pass the same config to
/// both when they are built together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Separator between path segments, e.g. `json.key1`. Mapping only.
    pub path_separator: char,
    /// Maximum number of path segments a composite member key may have when
    /// a document is indexed, unless the family sets its own limit. Lookups
    /// accept keys of any depth. Mapping only.
    pub default_depth_limit: usize,
    /// Capacity reserved for the memo table of each leaf lookup. Lookup only;
    /// at most [`LookupConfig::MAX_MEMO_CAPACITY`].
    pub initial_memo_capacity: usize,
    /// Memo table size above which a leaf lookup logs a warning (once).
    /// Lookup only.
    pub memo_warn_threshold: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            path_separator: '.',
            default_depth_limit: 20,
            initial_memo_capacity: 16,
            memo_warn_threshold: 1024,
        }
    }
}

impl LookupConfig {
    /// Largest accepted `initial_memo_capacity`.
    pub const MAX_MEMO_CAPACITY: usize = 1 << 16;

    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_separator(mut self, separator: char) -> Self {
        self.path_separator = separator;
        self
    }

    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.default_depth_limit = limit;
        self
    }

    pub fn with_memo_capacity(mut self, capacity: usize) -> Self {
        self.initial_memo_capacity = capacity;
        self
    }

    pub fn with_memo_warn_threshold(mut self, threshold: usize) -> Self {
        self.memo_warn_threshold = threshold;
        self
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(LeafError::Config) if invalid.
    ///
    /// Validates:
    /// - path_separator is neither whitespace nor alphanumeric
    /// - default_depth_limit > 0
    /// - initial_memo_capacity <= MAX_MEMO_CAPACITY
    /// - memo_warn_threshold > 0
    pub fn validate(&self) -> LeafResult<()> {
        if self.path_separator.is_whitespace() || self.path_separator.is_alphanumeric() {
            return Err(LeafError::Config(ConfigError::InvalidValue {
                field: "path_separator".to_string(),
                value: format!("{:?}", self.path_separator),
                reason: "path_separator must be a punctuation character".to_string(),
            }));
        }

        if self.default_depth_limit == 0 {
            return Err(LeafError::Config(ConfigError::InvalidValue {
                field: "default_depth_limit".to_string(),
                value: self.default_depth_limit.to_string(),
                reason: "default_depth_limit must be greater than 0".to_string(),
            }));
        }

        if self.initial_memo_capacity > Self::MAX_MEMO_CAPACITY {
            return Err(LeafError::Config(ConfigError::InvalidValue {
                field: "initial_memo_capacity".to_string(),
                value: self.initial_memo_capacity.to_string(),
                reason: format!(
                    "initial_memo_capacity must be at most {}",
                    Self::MAX_MEMO_CAPACITY
                ),
            }));
        }

        if self.memo_warn_threshold == 0 {
            return Err(LeafError::Config(ConfigError::InvalidValue {
                field: "memo_warn_threshold".to_string(),
                value: self.memo_warn_threshold.to_string(),
                reason: "memo_warn_threshold must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `LEAFDOC_PATH_SEPARATOR`: Path separator character (default: `.`)
    /// - `LEAFDOC_DEPTH_LIMIT`: Default composite key depth limit (default: 20)
    /// - `LEAFDOC_MEMO_CAPACITY`: Initial memo table capacity (default: 16)
    /// - `LEAFDOC_MEMO_WARN_THRESHOLD`: Memo size warning threshold (default: 1024)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            path_separator: std::env::var("LEAFDOC_PATH_SEPARATOR")
                .ok()
                .and_then(|s| single_char(&s))
                .unwrap_or(defaults.path_separator),
            default_depth_limit: std::env::var("LEAFDOC_DEPTH_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_depth_limit),
            initial_memo_capacity: std::env::var("LEAFDOC_MEMO_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.initial_memo_capacity),
            memo_warn_threshold: std::env::var("LEAFDOC_MEMO_WARN_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.memo_warn_threshold),
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LookupConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = LookupConfig::new()
            .with_path_separator('/')
            .with_depth_limit(4)
            .with_memo_capacity(64)
            .with_memo_warn_threshold(10);

        assert_eq!(config.path_separator, '/');
        assert_eq!(config.default_depth_limit, 4);
        assert_eq!(config.initial_memo_capacity, 64);
        assert_eq!(config.memo_warn_threshold, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_alphanumeric_separator() {
        let err = LookupConfig::new()
            .with_path_separator('a')
            .validate()
            .unwrap_err();
        match err {
            LeafError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "path_separator")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_zero_depth_limit() {
        assert!(LookupConfig::new().with_depth_limit(0).validate().is_err());
    }

    #[test]
    fn test_validate_bounds_memo_capacity() {
        assert!(LookupConfig::new()
            .with_memo_capacity(LookupConfig::MAX_MEMO_CAPACITY)
            .validate()
            .is_ok());

        for capacity in [LookupConfig::MAX_MEMO_CAPACITY + 1, usize::MAX] {
            let err = LookupConfig::new()
                .with_memo_capacity(capacity)
                .validate()
                .unwrap_err();
            match err {
                LeafError::Config(ConfigError::InvalidValue { field, .. }) => {
                    assert_eq!(field, "initial_memo_capacity")
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_validate_rejects_zero_warn_threshold() {
        assert!(LookupConfig::new()
            .with_memo_warn_threshold(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: LookupConfig =
            serde_json::from_str(r#"{"default_depth_limit": 3}"#).expect("parse config");
        assert_eq!(config.default_depth_limit, 3);
        assert_eq!(config.path_separator, '.');
        assert_eq!(config.memo_warn_threshold, 1024);
    }

    #[test]
    fn test_single_char() {
        assert_eq!(single_char("/"), Some('/'));
        assert_eq!(single_char(""), None);
        assert_eq!(single_char("ab"), None);
    }
}
