//! Collaborator traits consumed by the lookup cache.
//!
//! A lookup resolves names through a [`SchemaResolver`] and loads values
//! through a [`ValueSourceProvider`]. Both are shared by every leaf lookup of
//! a query execution, so they must be `Send + Sync`; the accessors they load
//! belong to one leaf lookup and are driven from a single thread.

use std::sync::Arc;

use crate::{DocId, FieldDescriptor, FieldValue, LeafResult, SegmentScope};

/// Resolves requested field names to canonical descriptors.
///
/// # Implementation Requirements
///
/// - Aliases must be followed before returning; callers never see an alias
///   that points at another alias.
/// - Names under a registered composite family must resolve to
///   [`FieldDescriptor::KeyedMember`] for any key, including keys never seen
///   before.
/// - Unknown names fail with `ResolveError::NotFound`; names of the wrong
///   shape for their field fail with `ResolveError::TypeMismatch`.
pub trait SchemaResolver: Send + Sync {
    /// Resolve `name` to its descriptor.
    fn resolve(&self, name: &str) -> LeafResult<FieldDescriptor>;

    /// Whether `name` resolves. Never fails.
    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }
}

/// Hands out lazy value sources for resolved descriptors.
pub trait ValueSourceProvider: Send + Sync {
    /// Obtain the value source for `descriptor`. Cheap; no values are read.
    fn provide(&self, descriptor: &FieldDescriptor) -> LeafResult<Box<dyn ValueSource>>;
}

/// A lazy per-segment source of raw values for one resolved field.
pub trait ValueSource: Send + Sync {
    /// Name of the field this source reads, for diagnostics.
    fn field_name(&self) -> &str;

    /// Retrieve the field's values within `segment`.
    ///
    /// This is where the expensive work happens. Failures are
    /// `LoadError::LoadFailure`.
    fn load(&self, segment: &SegmentScope) -> LeafResult<Box<dyn DocValuesAccessor>>;
}

/// Per-document reader over a loaded field.
pub trait DocValuesAccessor {
    /// Append the values of `doc` to `out`.
    ///
    /// `out` is owned by the caller and reused across documents; accessors
    /// must only push onto it.
    fn read_doc(&mut self, doc: DocId, out: &mut Vec<FieldValue>) -> LeafResult<()>;
}

impl<T: SchemaResolver + ?Sized> SchemaResolver for Arc<T> {
    fn resolve(&self, name: &str) -> LeafResult<FieldDescriptor> {
        (**self).resolve(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }
}

impl<T: ValueSourceProvider + ?Sized> ValueSourceProvider for Arc<T> {
    fn provide(&self, descriptor: &FieldDescriptor) -> LeafResult<Box<dyn ValueSource>> {
        (**self).provide(descriptor)
    }
}

impl<T: SchemaResolver + ?Sized> SchemaResolver for &T {
    fn resolve(&self, name: &str) -> LeafResult<FieldDescriptor> {
        (**self).resolve(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }
}

impl<T: ValueSourceProvider + ?Sized> ValueSourceProvider for &T {
    fn provide(&self, descriptor: &FieldDescriptor) -> LeafResult<Box<dyn ValueSource>> {
        (**self).provide(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldType, LeafError};

    struct OneField;

    impl SchemaResolver for OneField {
        fn resolve(&self, name: &str) -> LeafResult<FieldDescriptor> {
            if name == "field" {
                Ok(FieldDescriptor::primitive("field", FieldType::Long))
            } else {
                Err(LeafError::not_found(name))
            }
        }
    }

    #[test]
    fn test_exists_default_maps_errors_to_false() {
        assert!(OneField.exists("field"));
        assert!(!OneField.exists("other"));
    }

    fn field_exists<R: SchemaResolver>(resolver: R) -> bool {
        resolver.exists("field")
    }

    #[test]
    fn test_arc_and_ref_delegate() {
        assert!(field_exists(Arc::new(OneField)));
        assert!(field_exists(&OneField));
        let shared: Arc<dyn SchemaResolver> = Arc::new(OneField);
        assert!(field_exists(shared.clone()));
        assert!(shared.resolve("nope").unwrap_err().is_not_found());
    }
}
