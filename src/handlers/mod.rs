//! Pluggable per-type dataset handlers.
//!
//! A [`DatasetHandler`] is the strategy object for one dataset type: it
//! converts between tree nodes and flattened datasets, fetches child nodes
//! through the injected [`QueryServices`], and decides leaf-ness. Handlers
//! are registered with [`DatasetManager`](crate::manager::DatasetManager)
//! under their [`id`](DatasetHandler::id); nodes with an unregistered type
//! dispatch to the index-pattern handler as the registry default.

mod index;
mod index_pattern;

pub use index::{IndexHandler, DATA_SOURCE_PAGE_SIZE, INDEX_AGG_SIZE};
pub use index_pattern::{IndexPatternHandler, INDEX_PATTERN_PAGE_SIZE};

use async_trait::async_trait;

use crate::{
    dataset::{DataSourceReference, Dataset},
    error::Result,
    services::QueryServices,
    structure::{tags, DataStructure, DataStructureMeta, MetaType},
};

/// Capability contract implemented once per dataset type.
#[async_trait]
pub trait DatasetHandler: Send + Sync {
    /// The terminal (leaf) structure type tag this handler owns. Also the
    /// registration key in the manager's handler map.
    fn id(&self) -> &str;

    /// Human-readable name of the dataset type.
    fn display_name(&self) -> &str;

    /// Static presentation meta attached to structures this handler builds.
    fn meta(&self) -> DataStructureMeta;

    /// Converts a tree node into a flattened dataset.
    ///
    /// Pure and total over any node of this handler's type: preserves id,
    /// title and type, resolves `data_source` from the node's parent
    /// (absent when the node has no parent) and carries the node's time
    /// field, if any.
    fn to_dataset(&self, structure: &DataStructure) -> Dataset {
        Dataset {
            id: structure.id.clone(),
            title: structure.title.clone(),
            ds_type: structure.ds_type.clone(),
            time_field_name: structure
                .meta
                .as_ref()
                .and_then(|m| m.time_field_name.clone()),
            data_source: structure.parent.as_ref().map(|p| data_source_reference(p)),
        }
    }

    /// Inverse of [`to_dataset`](DatasetHandler::to_dataset).
    ///
    /// Pure and total: attaches this handler's static meta (plus the
    /// dataset's time field) and resolves `parent` from `data_source`
    /// (absent when the dataset has none).
    fn to_data_structure(&self, dataset: &Dataset) -> DataStructure {
        let mut meta = self.meta();
        meta.time_field_name = dataset.time_field_name.clone();

        let mut structure =
            DataStructure::new(&dataset.id, &dataset.title, &dataset.ds_type).with_meta(meta);
        if let Some(reference) = &dataset.data_source {
            structure = structure.with_parent(parent_from_reference(reference));
        }
        structure
    }

    /// Fetches the navigation options below the last node of `path`.
    ///
    /// The only I/O-bearing operation of the contract. Behavior branches on
    /// the last path element's type: the tree root yields one category node
    /// with populated children, category nodes return their already
    /// populated children without I/O, concrete dataset nodes yield typed
    /// field children, and field nodes yield a breadcrumb node pointing
    /// back at their owner.
    ///
    /// # Errors
    ///
    /// Client failures propagate unmodified; there is no retry. An empty
    /// `path` is an invalid call.
    async fn fetch_options(
        &self,
        services: &QueryServices,
        path: &[DataStructure],
    ) -> Result<Vec<DataStructure>>;

    /// True iff the node is a selectable dataset (no further navigation).
    fn is_leaf(&self, structure: &DataStructure) -> bool {
        structure.ds_type == self.id()
    }
}

/// Mirrors a parent node into a denormalized data source reference.
pub(crate) fn data_source_reference(parent: &DataStructure) -> DataSourceReference {
    DataSourceReference {
        id: parent.id.clone(),
        title: parent.title.clone(),
        source_type: parent.ds_type.clone(),
    }
}

/// Mirrors a data source reference back into a parent node.
pub(crate) fn parent_from_reference(reference: &DataSourceReference) -> DataStructure {
    DataStructure::new(&reference.id, &reference.title, &reference.source_type)
}

/// Wraps field metadata as typed children of `owner`, splitting date
/// fields into the time-field sub-type.
pub(crate) fn fields_to_children(
    owner: &DataStructure,
    fields: &[crate::services::FieldSpec],
) -> Vec<DataStructure> {
    let parent = owner.as_parent();
    fields
        .iter()
        .map(|field| {
            let tag = if field.is_date() {
                tags::TIME_FIELD
            } else {
                tags::FIELD
            };
            DataStructure::new(&field.name, &field.name, tag)
                .with_parent(parent.clone())
                .with_meta(
                    DataStructureMeta::new(MetaType::Custom).with_tooltip(&field.field_type),
                )
        })
        .collect()
}

/// Breadcrumb for a field node: a synthetic node referencing the dataset
/// the field belongs to, used to navigate back up the tree.
pub(crate) fn field_breadcrumb(path: &[DataStructure]) -> Vec<DataStructure> {
    let Some(field) = path.last() else {
        return Vec::new();
    };
    let owner = field
        .parent
        .as_deref()
        .cloned()
        .or_else(|| path.len().checked_sub(2).and_then(|i| path.get(i)).cloned());

    match owner {
        Some(owner) => {
            let tooltip = format!("Contains field '{}'", field.title);
            let meta = DataStructureMeta::new(MetaType::Custom).with_tooltip(tooltip);
            vec![owner.as_parent().with_meta(meta)]
        }
        None => Vec::new(),
    }
}
