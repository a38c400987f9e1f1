//! explorar - Dataset Navigation and Selection in Pure Rust
//!
//! An in-process library for navigating hierarchical dataset metadata
//! (data sources → indices / index patterns → fields) and managing the
//! "current dataset" selection of an analytics session.
//!
//! # Design Principles
//!
//! 1. **Pluggable handlers** - one strategy object per dataset type,
//!    registered by type tag with an explicit default fallback
//! 2. **Injected clients** - saved objects, search and index patterns are
//!    consumed behind trait objects, never owned
//! 3. **Id-only caching** - cached tree nodes hold ids, not live object
//!    references, so external mutation cannot stale the cache
//! 4. **Change-only updates** - selection changes broadcast to subscribers
//!    without replaying the current value
//!
//! # Quick Start
//!
//! ```
//! use explorar::{DatasetManager, QueryServices};
//! use explorar::structure::{tags, DataStructure};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> explorar::Result<()> {
//! let manager = DatasetManager::new(QueryServices::in_memory());
//!
//! // Navigate from the root and select the first leaf found.
//! let root = DataStructure::new("", "Root", tags::ROOT);
//! let options = manager.fetch_options(&[root]).await?;
//! println!("{} option(s) at the root", options.len());
//!
//! // Selection state is read synchronously, updates are change-only.
//! assert!(manager.dataset().is_none());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::redundant_clone,
        clippy::similar_names
    )
)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::map_unwrap_or)]

pub mod cache;
pub mod dataset;
pub mod error;
pub mod handlers;
pub mod manager;
pub mod services;
pub mod structure;

pub use cache::{CachedDataStructure, DataStructureCache};
pub use dataset::{DataSourceReference, Dataset};
pub use error::{Error, Result};
pub use handlers::{DatasetHandler, IndexHandler, IndexPatternHandler};
pub use manager::{DatasetManager, OnConflict};
pub use services::{
    FieldSpec, GetFieldsOptions, IndexPattern, IndexPatternSpec, IndexPatternsService,
    QueryServices, SavedObject, SavedObjectsClient, SavedObjectsFindOptions, SearchClient,
    SearchRequest, SearchResponse, UiSettings,
};
pub use structure::{DataStructure, DataStructureMeta, MetaType};
