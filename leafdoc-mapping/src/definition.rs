//! JSON mapping definitions.
//!
//! Accepts the familiar `properties` layout:
//!
//! ```json
//! {
//!   "properties": {
//!     "field": { "type": "long" },
//!     "alias": { "type": "alias", "path": "field" },
//!     "json":  { "type": "flattened", "depth_limit": 5 },
//!     "obj":   { "properties": { "price": { "type": "double" } } }
//!   }
//! }
//! ```
//!
//! Objects (explicit `"type": "object"` or just `properties`) are flattened
//! into dotted paths. Unknown parameters on a property are ignored.

use std::collections::BTreeMap;

use leafdoc_core::{FieldType, LeafResult, LookupConfig, MappingError};
use serde::Deserialize;

use crate::path;
use crate::registry::{MappingBuilder, MappingRegistry};

#[derive(Debug, Deserialize)]
struct MappingDef {
    #[serde(default)]
    properties: BTreeMap<String, PropertyDef>,
}

#[derive(Debug, Deserialize)]
struct PropertyDef {
    #[serde(rename = "type")]
    field_type: Option<String>,
    path: Option<String>,
    depth_limit: Option<usize>,
    properties: Option<BTreeMap<String, PropertyDef>>,
}

impl MappingRegistry {
    /// Build a registry from a JSON mapping definition.
    pub fn from_json(value: serde_json::Value, config: LookupConfig) -> LeafResult<Self> {
        let def: MappingDef = serde_json::from_value(value).map_err(|e| MappingError::Malformed {
            name: "<root>".to_string(),
            reason: e.to_string(),
        })?;
        let builder = MappingBuilder::new().with_config(config);
        add_properties(builder, "", def.properties)?.build()
    }

    /// Parse and build a registry from a JSON mapping string.
    pub fn from_json_str(s: &str, config: LookupConfig) -> LeafResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| MappingError::Malformed {
                name: "<root>".to_string(),
                reason: e.to_string(),
            })?;
        Self::from_json(value, config)
    }
}

fn add_properties(
    mut builder: MappingBuilder,
    parent: &str,
    properties: BTreeMap<String, PropertyDef>,
) -> LeafResult<MappingBuilder> {
    for (child, def) in properties {
        let name = path::join(parent, &child, builder.separator());
        builder = add_property(builder, name, def)?;
    }
    Ok(builder)
}

fn add_property(
    builder: MappingBuilder,
    name: String,
    def: PropertyDef,
) -> LeafResult<MappingBuilder> {
    match def.field_type.as_deref() {
        None | Some("object") => {
            let properties = def.properties.unwrap_or_default();
            add_properties(builder, &name, properties)
        }
        Some("alias") => {
            let target = def.path.ok_or_else(|| MappingError::Malformed {
                name: name.clone(),
                reason: "alias requires a `path`".to_string(),
            })?;
            Ok(builder.alias(name, target))
        }
        Some("flattened") => {
            if def.properties.is_some() {
                return Err(MappingError::Malformed {
                    name,
                    reason: "flattened fields cannot declare properties".to_string(),
                }
                .into());
            }
            Ok(match def.depth_limit {
                Some(limit) => builder.family_with_depth_limit(name, limit),
                None => builder.family(name),
            })
        }
        Some(other) => {
            let field_type = FieldType::parse(other).ok_or_else(|| MappingError::UnsupportedType {
                name: name.clone(),
                field_type: other.to_string(),
            })?;
            if def.properties.is_some() {
                return Err(MappingError::Malformed {
                    name,
                    reason: format!("{} fields cannot declare properties", field_type),
                }
                .into());
            }
            Ok(builder.field(name, field_type))
        }
    }
}
