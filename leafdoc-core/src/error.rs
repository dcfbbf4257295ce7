//! Error types for leafdoc operations

use crate::DocId;
use thiserror::Error;

/// Name resolution errors raised by a schema resolver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No field mapped for name: {name}")]
    NotFound { name: String },

    #[error("Type mismatch for {name}: {reason}")]
    TypeMismatch { name: String, reason: String },
}

/// Value source loading errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to load values for {field}: {reason}")]
    LoadFailure { field: String, reason: String },
}

/// Errors raised while reading per-document values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocValuesError {
    #[error("Document has no value for {field}, check the value count before reading")]
    EmptyValues { field: String },

    #[error("Document {doc} is outside the segment (max_doc {max_doc})")]
    DocOutOfRange { doc: DocId, max_doc: DocId },
}

/// Mapping definition errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Invalid field name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Mapping conflict on {name}: {reason}")]
    Conflict { name: String, reason: String },

    #[error("Alias {alias} points to unmapped field {target}")]
    AliasTargetMissing { alias: String, target: String },

    #[error("Alias {alias} must point to a concrete field, but {target} is not one")]
    AliasTargetNotConcrete { alias: String, target: String },

    #[error("Unsupported field type {field_type} for {name}")]
    UnsupportedType { name: String, field_type: String },

    #[error("Malformed definition for {name}: {reason}")]
    Malformed { name: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all leafdoc errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LeafError {
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Doc values error: {0}")]
    DocValues(#[from] DocValuesError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl LeafError {
    /// Shorthand for a [`ResolveError::NotFound`].
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::Resolve(ResolveError::NotFound { name: name.into() })
    }

    /// Shorthand for a [`ResolveError::TypeMismatch`].
    pub fn type_mismatch(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolve(ResolveError::TypeMismatch {
            name: name.into(),
            reason: reason.into(),
        })
    }

    /// Shorthand for a [`LoadError::LoadFailure`].
    pub fn load_failure(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load(LoadError::LoadFailure {
            field: field.into(),
            reason: reason.into(),
        })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Resolve(ResolveError::NotFound { .. }))
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::Resolve(ResolveError::TypeMismatch { .. }))
    }

    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Load(LoadError::LoadFailure { .. }))
    }
}

/// Result type alias for leafdoc operations.
pub type LeafResult<T> = Result<T, LeafError>;

// =============================================================================
// TESTS
// =============================================================================
