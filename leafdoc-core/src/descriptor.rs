//! Resolved field identities.
//!
//! A [`FieldDescriptor`] is what a schema resolver hands back for a requested
//! name. Aliases are already followed by the time a descriptor exists, so
//! consumers only ever match on three closed variants.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::FieldType;

/// Discriminant of a [`FieldDescriptor`], for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DescriptorKind {
    Primitive,
    Alias,
    KeyedMember,
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Primitive => "primitive",
            Self::Alias => "alias",
            Self::KeyedMember => "keyed_member",
        };
        f.write_str(s)
    }
}

/// Canonical identity of a resolvable field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldDescriptor {
    /// A concrete field addressed by its own name.
    Primitive { name: String, field_type: FieldType },

    /// A concrete field reached through an alias. `target` is canonical.
    Alias {
        alias: String,
        target: String,
        field_type: FieldType,
    },

    /// One key of a dynamic composite family, e.g. family `json`, key `key1`.
    KeyedMember { family: String, key: String },
}

impl FieldDescriptor {
    pub fn primitive(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::Primitive {
            name: name.into(),
            field_type,
        }
    }

    pub fn alias(
        alias: impl Into<String>,
        target: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self::Alias {
            alias: alias.into(),
            target: target.into(),
            field_type,
        }
    }

    pub fn keyed(family: impl Into<String>, key: impl Into<String>) -> Self {
        Self::KeyedMember {
            family: family.into(),
            key: key.into(),
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            Self::Primitive { .. } => DescriptorKind::Primitive,
            Self::Alias { .. } => DescriptorKind::Alias,
            Self::KeyedMember { .. } => DescriptorKind::KeyedMember,
        }
    }

    /// Name of the column holding this field's values in a segment.
    ///
    /// Keyed members share their family's column; the key selects within it.
    pub fn storage_field(&self) -> &str {
        match self {
            Self::Primitive { name, .. } => name,
            Self::Alias { target, .. } => target,
            Self::KeyedMember { family, .. } => family,
        }
    }

    /// Canonical name, with keyed members spelled as `family.key`.
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Primitive { name, .. } => name.clone(),
            Self::Alias { target, .. } => target.clone(),
            Self::KeyedMember { family, key } => format!("{}.{}", family, key),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::KeyedMember { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Declared value type. Keyed members always hold keywords.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Primitive { field_type, .. } | Self::Alias { field_type, .. } => *field_type,
            Self::KeyedMember { .. } => FieldType::Keyword,
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { name, field_type } => write!(f, "{} ({})", name, field_type),
            Self::Alias {
                alias,
                target,
                field_type,
            } => write!(f, "{} -> {} ({})", alias, target, field_type),
            Self::KeyedMember { family, key } => write!(f, "{}[{}]", family, key),
        }
    }
}
