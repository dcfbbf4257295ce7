//! Mapping registry: the reference [`SchemaResolver`].
//!
//! A registry holds three kinds of entries: concrete fields, aliases to
//! concrete fields, and composite families. Families admit any key below
//! them, so `json.key1` and `json.never.seen.before` both resolve without
//! being declared.
//!
//! # Resolution Order
//!
//! 1. An exact concrete field or alias.
//! 2. An exact family name fails with `TypeMismatch`: families only expose
//!    keyed members.
//! 3. Path prefixes, shortest first. A family prefix yields a keyed member
//!    for any non-empty key; the family's depth limit only applies when
//!    documents are indexed. A concrete field or alias prefix fails with
//!    `TypeMismatch`.
//! 4. Anything else is `NotFound`.

use std::collections::HashMap;

use leafdoc_core::{
    FieldDescriptor, FieldType, LeafError, LeafResult, LookupConfig, MappingError, SchemaResolver,
};

use crate::path;

/// A registered mapping entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MappingEntry {
    Field(FieldType),
    Alias { target: String, field_type: FieldType },
    Family { depth_limit: usize },
}

impl MappingEntry {
    fn describe(&self) -> &'static str {
        match self {
            Self::Field(_) => "field",
            Self::Alias { .. } => "alias",
            Self::Family { .. } => "composite family",
        }
    }
}

/// Immutable set of field mappings.
#[derive(Debug, Clone)]
pub struct MappingRegistry {
    entries: HashMap<String, MappingEntry>,
    config: LookupConfig,
}

impl MappingRegistry {
    /// Start building a registry with default configuration.
    pub fn builder() -> MappingBuilder {
        MappingBuilder::new()
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Type of the concrete field `name`, following aliases.
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        match self.entries.get(name)? {
            MappingEntry::Field(t) => Some(*t),
            MappingEntry::Alias { field_type, .. } => Some(*field_type),
            MappingEntry::Family { .. } => None,
        }
    }

    /// Whether `name` is a concrete field (not an alias, not a family).
    pub fn is_concrete_field(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(MappingEntry::Field(_)))
    }

    pub fn is_alias(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(MappingEntry::Alias { .. }))
    }

    pub fn is_family(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(MappingEntry::Family { .. }))
    }

    /// Depth limit of the family `name`.
    pub fn family_depth_limit(&self, name: &str) -> Option<usize> {
        match self.entries.get(name)? {
            MappingEntry::Family { depth_limit } => Some(*depth_limit),
            _ => None,
        }
    }

    /// Concrete field names, sorted.
    pub fn field_names(&self) -> Vec<&str> {
        self.names_where(|e| matches!(e, MappingEntry::Field(_)))
    }

    /// Alias names, sorted.
    pub fn alias_names(&self) -> Vec<&str> {
        self.names_where(|e| matches!(e, MappingEntry::Alias { .. }))
    }

    /// Family names, sorted.
    pub fn family_names(&self) -> Vec<&str> {
        self.names_where(|e| matches!(e, MappingEntry::Family { .. }))
    }

    /// Total number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn names_where(&self, pred: impl Fn(&MappingEntry) -> bool) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, e)| pred(e))
            .map(|(n, _)| n.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    fn resolve_member(&self, name: &str) -> LeafResult<FieldDescriptor> {
        let separator = self.config.path_separator;
        for prefix in path::proper_prefixes(name, separator) {
            match self.entries.get(prefix) {
                Some(MappingEntry::Family { .. }) => {
                    let key = &name[prefix.len() + separator.len_utf8()..];
                    if key.is_empty() {
                        return Err(LeafError::not_found(name));
                    }
                    return Ok(FieldDescriptor::keyed(prefix, key));
                }
                Some(entry) => {
                    return Err(LeafError::type_mismatch(
                        name,
                        format!(
                            "`{}` is a {}, not a composite family, and has no sub-fields",
                            prefix,
                            entry.describe()
                        ),
                    ));
                }
                None => continue,
            }
        }
        Err(LeafError::not_found(name))
    }
}

impl SchemaResolver for MappingRegistry {
    fn resolve(&self, name: &str) -> LeafResult<FieldDescriptor> {
        match self.entries.get(name) {
            Some(MappingEntry::Field(field_type)) => {
                Ok(FieldDescriptor::primitive(name, *field_type))
            }
            Some(MappingEntry::Alias { target, field_type }) => {
                Ok(FieldDescriptor::alias(name, target.clone(), *field_type))
            }
            Some(MappingEntry::Family { .. }) => Err(LeafError::type_mismatch(
                name,
                format!(
                    "composite family only exposes keyed members such as `{}{}<key>`",
                    name, self.config.path_separator
                ),
            )),
            None => self.resolve_member(name),
        }
    }
}

/// Builder for [`MappingRegistry`].
///
/// Entries are validated together in [`MappingBuilder::build`], so they may
/// be declared in any order (an alias before its target, for instance).
#[derive(Debug, Clone, Default)]
pub struct MappingBuilder {
    config: LookupConfig,
    fields: Vec<(String, FieldType)>,
    aliases: Vec<(String, String)>,
    families: Vec<(String, Option<usize>)>,
}

impl MappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: LookupConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare a concrete field.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push((name.into(), field_type));
        self
    }

    /// Declare an alias to a concrete field.
    pub fn alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((name.into(), target.into()));
        self
    }

    /// Declare a composite family using the configured default depth limit.
    pub fn family(mut self, name: impl Into<String>) -> Self {
        self.families.push((name.into(), None));
        self
    }

    /// Declare a composite family with its own key depth limit.
    pub fn family_with_depth_limit(mut self, name: impl Into<String>, depth_limit: usize) -> Self {
        self.families.push((name.into(), Some(depth_limit)));
        self
    }

    pub(crate) fn separator(&self) -> char {
        self.config.path_separator
    }

    /// Validate every declaration and build the registry.
    pub fn build(self) -> LeafResult<MappingRegistry> {
        self.config.validate()?;
        let separator = self.config.path_separator;
        let mut entries: HashMap<String, MappingEntry> =
            HashMap::with_capacity(self.fields.len() + self.aliases.len() + self.families.len());

        for (name, field_type) in self.fields {
            insert_entry(&mut entries, name, MappingEntry::Field(field_type), separator)?;
        }

        for (name, depth_limit) in self.families {
            let depth_limit = depth_limit.unwrap_or(self.config.default_depth_limit);
            if depth_limit == 0 {
                return Err(MappingError::Malformed {
                    name,
                    reason: "depth_limit must be greater than 0".to_string(),
                }
                .into());
            }
            insert_entry(&mut entries, name, MappingEntry::Family { depth_limit }, separator)?;
        }

        let alias_names: Vec<String> = self.aliases.iter().map(|(n, _)| n.clone()).collect();
        for (name, target) in self.aliases {
            let field_type = match entries.get(&target) {
                Some(MappingEntry::Field(t)) => *t,
                Some(_) => {
                    return Err(MappingError::AliasTargetNotConcrete {
                        alias: name,
                        target,
                    }
                    .into())
                }
                None if alias_names.contains(&target) => {
                    return Err(MappingError::AliasTargetNotConcrete {
                        alias: name,
                        target,
                    }
                    .into())
                }
                None => return Err(MappingError::AliasTargetMissing { alias: name, target }.into()),
            };
            insert_entry(
                &mut entries,
                name,
                MappingEntry::Alias { target, field_type },
                separator,
            )?;
        }

        check_prefix_conflicts(&entries, separator)?;

        let registry = MappingRegistry {
            entries,
            config: self.config,
        };
        tracing::debug!(
            fields = registry.field_names().len(),
            aliases = registry.alias_names().len(),
            families = registry.family_names().len(),
            "Built mapping registry"
        );
        Ok(registry)
    }
}

fn insert_entry(
    entries: &mut HashMap<String, MappingEntry>,
    name: String,
    entry: MappingEntry,
    separator: char,
) -> LeafResult<()> {
    path::validate_name(&name, separator)?;
    if let Some(existing) = entries.get(&name) {
        return Err(MappingError::Conflict {
            reason: format!(
                "already mapped as a {}, cannot also map it as a {}",
                existing.describe(),
                entry.describe()
            ),
            name,
        }
        .into());
    }
    entries.insert(name, entry);
    Ok(())
}

/// Leaves and families cannot have declared sub-fields.
fn check_prefix_conflicts(
    entries: &HashMap<String, MappingEntry>,
    separator: char,
) -> LeafResult<()> {
    for name in entries.keys() {
        for prefix in path::proper_prefixes(name, separator) {
            if let Some(parent) = entries.get(prefix) {
                return Err(MappingError::Conflict {
                    name: name.clone(),
                    reason: format!(
                        "`{}` is mapped as a {} and cannot have sub-fields",
                        prefix,
                        parent.describe()
                    ),
                }
                .into());
            }
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
