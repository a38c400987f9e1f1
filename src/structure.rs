//! Tree nodes for interactive dataset navigation.
//!
//! A [`DataStructure`] is one node in the navigable metadata hierarchy
//! (data source → index / index pattern → field). Nodes are created
//! per-fetch and are not persisted; the id-only cache projection lives in
//! [`crate::cache`].

use serde::{Deserialize, Serialize};

/// Well-known structure type tags.
///
/// Handlers are registered under their terminal (leaf) tag; the remaining
/// tags mark intermediate tree levels. The tag space is open: external
/// handlers may introduce their own tags.
pub mod tags {
    /// Root of the navigation tree.
    pub const ROOT: &str = "ROOT";
    /// A registered data source (remote cluster).
    pub const DATA_SOURCE: &str = "DATA_SOURCE";
    /// Category node grouping all indices reachable from the root.
    pub const INDEXES: &str = "INDEXES";
    /// A concrete index under a data source. Terminal for the index handler.
    pub const INDEX: &str = "INDEX";
    /// Category node grouping all saved index patterns.
    pub const INDEX_PATTERNS: &str = "INDEX_PATTERNS";
    /// A saved index pattern. Terminal for the index-pattern handler.
    pub const INDEX_PATTERN: &str = "INDEX_PATTERN";
    /// A field of an index or index pattern.
    pub const FIELD: &str = "FIELD";
    /// A date field usable as the time axis of a dataset.
    pub const TIME_FIELD: &str = "TIME_FIELD";
}

/// Synthetic data source representing the cluster explorar itself talks to.
///
/// It is always listed first, before any saved data-source objects, and is
/// identified by an empty id (requests without a data source id target the
/// local cluster).
pub const LOCAL_CLUSTER_ID: &str = "";
/// Display title of the synthetic local cluster entry.
pub const LOCAL_CLUSTER_TITLE: &str = "Local cluster";

/// Separator used in full ids below a data source node.
pub const DATA_SOURCE_SEPARATOR: &str = "::";
/// Separator used in full ids below any other node.
pub const HIERARCHY_SEPARATOR: &str = ".";

/// Category of a [`DataStructureMeta`] tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetaType {
    /// Meta attached by a handler describing its dataset type.
    Type,
    /// Meta attached to an individual node.
    Custom,
    /// Meta describing a feature category.
    Feature,
}

/// Presentation-only descriptive tag for a tree node.
///
/// Carries no behavioral contract except `time_field_name`, which handlers
/// copy onto the [`Dataset`](crate::dataset::Dataset) produced from the
/// node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStructureMeta {
    /// Which kind of meta tag this is.
    pub meta_type: MetaType,
    /// Icon identifier for UI rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Tooltip text for UI rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Default time field carried over from index-pattern metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_field_name: Option<String>,
}

impl DataStructureMeta {
    /// Creates an empty meta tag of the given category.
    pub fn new(meta_type: MetaType) -> Self {
        Self {
            meta_type,
            icon: None,
            tooltip: None,
            time_field_name: None,
        }
    }

    /// Sets the icon identifier.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Sets the tooltip text.
    #[must_use]
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Sets the default time field.
    #[must_use]
    pub fn with_time_field(mut self, name: impl Into<String>) -> Self {
        self.time_field_name = Some(name.into());
        self
    }
}

/// A node in the navigable metadata tree.
///
/// `parent` is a back-reference to the enclosing node and `children` are
/// populated lazily by a handler fetch. Instances are per-request values;
/// nothing in the crate holds them beyond the manager's explicit side map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStructure {
    /// Identifier, unique within the parent's scope.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Type tag identifying which handler owns this node.
    #[serde(rename = "type")]
    pub ds_type: String,
    /// The enclosing node, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<DataStructure>>,
    /// Child nodes, populated by a fetch. `None` means not yet fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DataStructure>>,
    /// Presentation-only descriptive tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<DataStructureMeta>,
}

impl DataStructure {
    /// Creates a node with no parent, children or meta.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        ds_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ds_type: ds_type.into(),
            parent: None,
            children: None,
            meta: None,
        }
    }

    /// Sets the parent back-reference.
    #[must_use]
    pub fn with_parent(mut self, parent: DataStructure) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Sets the child nodes.
    #[must_use]
    pub fn with_children(mut self, children: Vec<DataStructure>) -> Self {
        self.children = Some(children);
        self
    }

    /// Sets the meta tag.
    #[must_use]
    pub fn with_meta(mut self, meta: DataStructureMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Derives the full hierarchical id of this node.
    ///
    /// Walks `parent` links root-first and joins ids with a separator that
    /// depends on the parent's type: `::` directly under a data source,
    /// `.` otherwise. The full id is stable for a given tree path and is
    /// the cache key used by [`crate::cache::DataStructureCache`].
    pub fn full_id(&self) -> String {
        match &self.parent {
            None => self.id.clone(),
            Some(parent) => {
                let separator = if parent.ds_type == tags::DATA_SOURCE {
                    DATA_SOURCE_SEPARATOR
                } else {
                    HIERARCHY_SEPARATOR
                };
                format!("{}{}{}", parent.full_id(), separator, self.id)
            }
        }
    }

    /// Shallow copy suitable for use as a child's `parent` back-reference:
    /// the node itself without its children.
    pub fn as_parent(&self) -> DataStructure {
        DataStructure {
            id: self.id.clone(),
            title: self.title.clone(),
            ds_type: self.ds_type.clone(),
            parent: self.parent.clone(),
            children: None,
            meta: self.meta.clone(),
        }
    }

    /// Returns the synthetic local-cluster data source node.
    pub fn local_cluster() -> Self {
        Self::new(LOCAL_CLUSTER_ID, LOCAL_CLUSTER_TITLE, tags::DATA_SOURCE)
    }

    /// True if this node represents the synthetic local cluster.
    pub fn is_local_cluster(&self) -> bool {
        self.ds_type == tags::DATA_SOURCE && self.id == LOCAL_CLUSTER_ID
    }
}
