//! Segment data and the writer that builds it from JSON documents.

use std::collections::HashMap;
use std::sync::Arc;

use leafdoc_core::{
    DocId, FieldType, FieldValue, LeafResult, MappingError, SegmentId, SegmentScope,
};
use leafdoc_mapping::{path, MappingRegistry};
use serde_json::Value;

use crate::column::{Column, ColumnBuilder, KeyedColumn, KeyedColumnBuilder};

/// Immutable columns of one segment.
#[derive(Debug, Clone)]
pub struct SegmentData {
    scope: SegmentScope,
    columns: HashMap<String, Arc<Column>>,
    keyed: HashMap<String, Arc<KeyedColumn>>,
}

impl SegmentData {
    pub fn scope(&self) -> SegmentScope {
        self.scope
    }

    pub fn id(&self) -> SegmentId {
        self.scope.id()
    }

    pub fn max_doc(&self) -> DocId {
        self.scope.max_doc()
    }

    /// Column of the concrete field `name`, if any document has values for it.
    pub fn column(&self, name: &str) -> Option<Arc<Column>> {
        self.columns.get(name).cloned()
    }

    /// Column of the composite family `family`, if any document has values for it.
    pub fn keyed_column(&self, family: &str) -> Option<Arc<KeyedColumn>> {
        self.keyed.get(family).cloned()
    }

    /// Names of all concrete field columns, sorted.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Staged values of one document, committed only if the whole document parses.
#[derive(Default)]
struct StagedDoc {
    values: Vec<(String, FieldType, FieldValue)>,
    keyed: Vec<(String, String, String)>,
}

/// Builds a [`SegmentData`] from JSON documents, assigning ordinals in
/// insertion order.
///
/// Concrete fields accept a scalar or an array of scalars of their type.
/// Composite families accept any JSON object; nested objects become dotted
/// keys and every leaf is stored as a keyword. Unmapped fields are skipped.
pub struct SegmentWriter<'m> {
    mapping: &'m MappingRegistry,
    next_doc: DocId,
    columns: HashMap<String, ColumnBuilder>,
    keyed: HashMap<String, KeyedColumnBuilder>,
}

impl<'m> SegmentWriter<'m> {
    pub fn new(mapping: &'m MappingRegistry) -> Self {
        Self {
            mapping,
            next_doc: 0,
            columns: HashMap::new(),
            keyed: HashMap::new(),
        }
    }

    /// Number of documents written so far.
    pub fn num_docs(&self) -> DocId {
        self.next_doc
    }

    /// Add one document and return its ordinal.
    ///
    /// On error nothing from the document is written.
    pub fn add_document(&mut self, doc: &Value) -> LeafResult<DocId> {
        let object = doc.as_object().ok_or_else(|| MappingError::Malformed {
            name: "<document>".to_string(),
            reason: "documents must be JSON objects".to_string(),
        })?;

        let mut staged = StagedDoc::default();
        self.stage_object("", object, &mut staged)?;

        let doc_id = self.next_doc;
        for (name, field_type, value) in staged.values {
            self.columns
                .entry(name)
                .or_insert_with(|| ColumnBuilder::new(field_type))
                .add(doc_id, value);
        }
        for (family, key, value) in staged.keyed {
            self.keyed
                .entry(family)
                .or_insert_with(KeyedColumnBuilder::new)
                .add(doc_id, key, value);
        }
        self.next_doc += 1;
        Ok(doc_id)
    }

    /// Seal the segment under a fresh id.
    pub fn finish(self) -> SegmentData {
        let max_doc = self.next_doc;
        let scope = SegmentScope::new(SegmentId::now_v7(), max_doc);
        let columns = self
            .columns
            .into_iter()
            .map(|(name, builder)| (name, Arc::new(builder.finish(max_doc))))
            .collect();
        let keyed = self
            .keyed
            .into_iter()
            .map(|(name, builder)| (name, Arc::new(builder.finish(max_doc))))
            .collect();
        tracing::debug!(segment = %scope.id(), max_doc, "Sealed segment");
        SegmentData {
            scope,
            columns,
            keyed,
        }
    }

    fn stage_object(
        &self,
        parent: &str,
        object: &serde_json::Map<String, Value>,
        staged: &mut StagedDoc,
    ) -> LeafResult<()> {
        let separator = self.mapping.config().path_separator;
        for (child, value) in object {
            let name = path::join(parent, child, separator);
            if let Some(depth_limit) = self.mapping.family_depth_limit(&name) {
                stage_keyed(&name, "", value, depth_limit, separator, staged)?;
            } else if self.mapping.is_concrete_field(&name) {
                if let Some(field_type) = self.mapping.field_type(&name) {
                    stage_values(&name, field_type, value, staged)?;
                }
            } else if self.mapping.is_alias(&name) {
                return Err(MappingError::Malformed {
                    name,
                    reason: "aliases cannot be written to".to_string(),
                }
                .into());
            } else if let Value::Object(inner) = value {
                self.stage_object(&name, inner, staged)?;
            } else {
                tracing::trace!(field = %name, "Skipping unmapped field");
            }
        }
        Ok(())
    }
}

fn stage_values(
    name: &str,
    field_type: FieldType,
    value: &Value,
    staged: &mut StagedDoc,
) -> LeafResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => {
            for item in items {
                if item.is_array() {
                    return Err(MappingError::Malformed {
                        name: name.to_string(),
                        reason: "nested arrays are not supported".to_string(),
                    }
                    .into());
                }
                stage_values(name, field_type, item, staged)?;
            }
            Ok(())
        }
        scalar => {
            let coerced = coerce(name, field_type, scalar)?;
            staged.values.push((name.to_string(), field_type, coerced));
            Ok(())
        }
    }
}

fn coerce(name: &str, field_type: FieldType, value: &Value) -> LeafResult<FieldValue> {
    let coerced = match (field_type, value) {
        (FieldType::Long, Value::Number(n)) => n.as_i64().map(FieldValue::Long),
        (FieldType::Long, Value::String(s)) => s.trim().parse().ok().map(FieldValue::Long),
        (FieldType::Double, Value::Number(n)) => n.as_f64().map(FieldValue::Double),
        (FieldType::Double, Value::String(s)) => s.trim().parse().ok().map(FieldValue::Double),
        (FieldType::Keyword, Value::String(s)) => Some(FieldValue::Keyword(s.clone())),
        (FieldType::Keyword, Value::Number(n)) => Some(FieldValue::Keyword(n.to_string())),
        (FieldType::Keyword, Value::Bool(b)) => Some(FieldValue::Keyword(b.to_string())),
        (FieldType::Boolean, Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
        (FieldType::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Some(FieldValue::Boolean(true)),
            "false" => Some(FieldValue::Boolean(false)),
            _ => None,
        },
        _ => None,
    };
    coerced.ok_or_else(|| {
        MappingError::Malformed {
            name: name.to_string(),
            reason: format!("cannot store {} as {}", value, field_type),
        }
        .into()
    })
}

fn stage_keyed(
    family: &str,
    key: &str,
    value: &Value,
    depth_limit: usize,
    separator: char,
    staged: &mut StagedDoc,
) -> LeafResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::Object(object) => {
            for (child, inner) in object {
                let child_key = path::join(key, child, separator);
                if path::key_depth(&child_key, separator).map_or(true, |d| d > depth_limit) {
                    return Err(MappingError::Malformed {
                        name: path::join(family, &child_key, separator),
                        reason: format!(
                            "key exceeds depth limit {} or has empty segments",
                            depth_limit
                        ),
                    }
                    .into());
                }
                stage_keyed(family, &child_key, inner, depth_limit, separator, staged)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                stage_keyed(family, key, item, depth_limit, separator, staged)?;
            }
            Ok(())
        }
        scalar if key.is_empty() => Err(MappingError::Malformed {
            name: family.to_string(),
            reason: format!("composite family expects an object, got {}", scalar),
        }
        .into()),
        Value::String(s) => {
            staged.keyed.push((family.to_string(), key.to_string(), s.clone()));
            Ok(())
        }
        scalar => {
            staged
                .keyed
                .push((family.to_string(), key.to_string(), scalar.to_string()));
            Ok(())
        }
    }
}
