//! Id-keyed cache of navigated tree nodes.
//!
//! Cache entries are [`CachedDataStructure`] projections holding ids only,
//! never live object references, so external mutation of the live tree can
//! never leave the cache pointing at stale objects. Entries are rebuilt
//! from live nodes via [`CachedDataStructure::from_structure`], a pure
//! projection. There is no TTL and no size bound; eviction is manual,
//! per-id or full.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::structure::DataStructure;

/// Reduced, id-only projection of a [`DataStructure`] for cache storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDataStructure {
    /// Identifier of the projected node.
    pub id: String,
    /// Display title of the projected node.
    pub title: String,
    /// Type tag of the projected node.
    #[serde(rename = "type")]
    pub ds_type: String,
    /// Id of the parent node, empty when the node is a root.
    pub parent: String,
    /// Ids of the child nodes, empty when children were never fetched.
    pub children: Vec<String>,
}

impl CachedDataStructure {
    /// Projects a live node into its cached representation.
    pub fn from_structure(structure: &DataStructure) -> Self {
        Self {
            id: structure.id.clone(),
            title: structure.title.clone(),
            ds_type: structure.ds_type.clone(),
            parent: structure
                .parent
                .as_ref()
                .map(|p| p.id.clone())
                .unwrap_or_default(),
            children: structure
                .children
                .as_ref()
                .map(|children| children.iter().map(|c| c.id.clone()).collect())
                .unwrap_or_default(),
        }
    }
}

/// Keyed store mapping full hierarchical ids to cached node projections.
///
/// The store itself has no interior mutability;
/// [`DatasetManager`](crate::manager::DatasetManager) guards it with a
/// lock alongside its live-node side map.
#[derive(Debug, Default)]
pub struct DataStructureCache {
    entries: HashMap<String, CachedDataStructure>,
}

impl DataStructureCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the cached projection for a full id.
    pub fn get(&self, id: &str) -> Option<&CachedDataStructure> {
        self.entries.get(id)
    }

    /// Stores a projection under a full id, replacing any previous entry.
    pub fn set(&mut self, id: impl Into<String>, value: CachedDataStructure) {
        self.entries.insert(id.into(), value);
    }

    /// Removes the entry for a full id.
    pub fn clear(&mut self, id: &str) {
        self.entries.remove(id);
    }

    /// Removes all entries.
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
