//! Registry of open segments.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use leafdoc_core::{LeafError, LeafResult, SegmentId, SegmentScope};

use crate::segment::SegmentData;

/// Open segments, shared between value sources.
#[derive(Debug, Default)]
pub struct SegmentStore {
    segments: RwLock<HashMap<SegmentId, Arc<SegmentData>>>,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a segment and return its scope.
    pub fn open(&self, segment: SegmentData) -> LeafResult<SegmentScope> {
        let scope = segment.scope();
        self.write()?.insert(scope.id(), Arc::new(segment));
        tracing::debug!(segment = %scope.id(), max_doc = scope.max_doc(), "Opened segment");
        Ok(scope)
    }

    /// Close a segment. Accessors already loaded from it keep working.
    pub fn close(&self, id: SegmentId) -> LeafResult<bool> {
        let removed = self.write()?.remove(&id).is_some();
        if removed {
            tracing::debug!(segment = %id, "Closed segment");
        }
        Ok(removed)
    }

    pub fn get(&self, id: SegmentId) -> LeafResult<Option<Arc<SegmentData>>> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Scopes of all open segments, in id order.
    pub fn scopes(&self) -> LeafResult<Vec<SegmentScope>> {
        let mut scopes: Vec<SegmentScope> = self.read()?.values().map(|s| s.scope()).collect();
        scopes.sort_by_key(|s| s.id());
        Ok(scopes)
    }

    pub fn len(&self) -> LeafResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> LeafResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> LeafResult<RwLockReadGuard<'_, HashMap<SegmentId, Arc<SegmentData>>>> {
        self.segments.read().map_err(|_| lock_poisoned())
    }

    fn write(&self) -> LeafResult<RwLockWriteGuard<'_, HashMap<SegmentId, Arc<SegmentData>>>> {
        self.segments.write().map_err(|_| lock_poisoned())
    }
}

fn lock_poisoned() -> LeafError {
    LeafError::load_failure("<segment store>", "segment store lock poisoned")
}
