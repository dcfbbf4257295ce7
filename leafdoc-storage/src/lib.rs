//! leafdoc Storage - Segment Columns and Field Data
//!
//! In-memory per-segment doc value columns and the reference
//! [`ValueSourceProvider`](leafdoc_core::ValueSourceProvider) that loads them.
//!
//! # Layout
//!
//! - [`SegmentWriter`] ingests JSON documents against a mapping and seals them
//!   into a [`SegmentData`].
//! - [`SegmentStore`] keeps open segments by id.
//! - [`FieldDataProvider`] resolves descriptors to value sources that load
//!   column accessors from the store.

pub mod column;
pub mod provider;
pub mod segment;
pub mod store;

pub use column::{Column, KeyedColumn, KeyedValue};
pub use provider::{ColumnAccessor, EmptyAccessor, FieldDataProvider, KeyedAccessor};
pub use segment::{SegmentData, SegmentWriter};
pub use store::SegmentStore;
