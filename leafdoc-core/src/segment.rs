//! Segment identity and scope

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{DocId, DocValuesError, LeafResult};

/// Identifier of an immutable index segment, using UUIDv7 so ids sort by
/// creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(Uuid);

impl SegmentId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn now_v7() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The segment a lookup cache is evaluating.
///
/// Documents are addressed by ordinals in `0..max_doc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentScope {
    id: SegmentId,
    max_doc: DocId,
}

impl SegmentScope {
    pub fn new(id: SegmentId, max_doc: DocId) -> Self {
        Self { id, max_doc }
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn max_doc(&self) -> DocId {
        self.max_doc
    }

    pub fn contains(&self, doc: DocId) -> bool {
        doc < self.max_doc
    }

    /// Check that `doc` addresses a document of this segment.
    pub fn check_doc(&self, doc: DocId) -> LeafResult<()> {
        if self.contains(doc) {
            Ok(())
        } else {
            Err(DocValuesError::DocOutOfRange {
                doc,
                max_doc: self.max_doc,
            }
            .into())
        }
    }
}
