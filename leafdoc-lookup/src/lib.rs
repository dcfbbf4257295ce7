//! leafdoc Lookup - Per-Segment Field Value Cache
//!
//! Scripts and other per-document evaluators read field values by name. A
//! [`LeafDocLookup`] serves those reads for one segment: each name is
//! resolved and loaded at most once, and the loaded view is rebound as the
//! lookup advances from document to document.
//!
//! # Layout
//!
//! - [`DocLookup`] holds the resolver, provider and config for a query and
//!   creates one [`LeafDocLookup`] per segment.
//! - [`LeafDocLookup`] owns the memo table of [`DocValuesView`]s.
//! - [`LookupStats`] counts hits, misses, loads and failures.

pub mod leaf;
pub mod search;
pub mod stats;
pub mod view;

pub use leaf::LeafDocLookup;
pub use search::DocLookup;
pub use stats::LookupStats;
pub use view::DocValuesView;
