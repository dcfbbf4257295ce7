//! Document value views.
//!
//! A [`DocValuesView`] is what consumers read: the values one field holds for
//! the document the owning lookup is positioned on. Moving to another
//! document refills the same buffer, so a view's allocation is reused for the
//! whole segment.

use std::fmt;

use leafdoc_core::{
    DocId, DocValuesAccessor, DocValuesError, FieldDescriptor, FieldValue, LeafResult,
};

/// Uniform read view over a loaded field, bound to one document at a time.
pub struct DocValuesView {
    name: String,
    descriptor: FieldDescriptor,
    accessor: Box<dyn DocValuesAccessor>,
    doc: Option<DocId>,
    values: Vec<FieldValue>,
}

impl DocValuesView {
    /// Wrap a loaded accessor. The view starts unbound and empty.
    pub fn new(
        name: impl Into<String>,
        descriptor: FieldDescriptor,
        accessor: Box<dyn DocValuesAccessor>,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor,
            accessor,
            doc: None,
            values: Vec::new(),
        }
    }

    /// Rebind to `doc`, replacing the current values.
    ///
    /// On error the view is left bound to `doc` with no values.
    pub(crate) fn set_document(&mut self, doc: DocId) -> LeafResult<()> {
        self.values.clear();
        self.doc = Some(doc);
        if let Err(e) = self.accessor.read_doc(doc, &mut self.values) {
            self.values.clear();
            return Err(e);
        }
        Ok(())
    }

    /// The name this view was requested under.
    pub fn field_name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Document the view is bound to, if any.
    pub fn doc(&self) -> Option<DocId> {
        self.doc
    }

    /// Number of values in the current document.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    /// The first (for single-valued fields, the only) value.
    ///
    /// Fails with `EmptyValues` when the document has none; check
    /// [`is_empty`](Self::is_empty) first when values are optional.
    pub fn value(&self) -> LeafResult<&FieldValue> {
        self.values.first().ok_or_else(|| {
            DocValuesError::EmptyValues {
                field: self.name.clone(),
            }
            .into()
        })
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldValue> {
        self.values.iter()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }
}

impl<'v> IntoIterator for &'v DocValuesView {
    type Item = &'v FieldValue;
    type IntoIter = std::slice::Iter<'v, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Debug for DocValuesView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocValuesView")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("doc", &self.doc)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
