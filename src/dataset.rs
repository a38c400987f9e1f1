//! Flattened, queryable dataset references.
//!
//! A [`Dataset`] is produced from a leaf [`DataStructure`] by the handler
//! owning that leaf's type. It is the unit of "current selection" state
//! held by [`DatasetManager`](crate::manager::DatasetManager): exactly one
//! dataset (or none) is active at a time.
//!
//! [`DataStructure`]: crate::structure::DataStructure

use serde::{Deserialize, Serialize};

/// Default engine type for data source references.
pub const DEFAULT_SOURCE_TYPE: &str = "OPENSEARCH";

/// Denormalized pointer to the data source a dataset originates from.
///
/// This is a value copy, not an ownership relation: mutating the source
/// tree after conversion does not affect an existing reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceReference {
    /// Data source id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Engine type of the data source.
    #[serde(rename = "type")]
    pub source_type: String,
}

impl DataSourceReference {
    /// Creates a reference with the default engine type.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source_type: DEFAULT_SOURCE_TYPE.to_string(),
        }
    }

    /// Sets the engine type.
    #[must_use]
    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = source_type.into();
        self
    }
}

/// A flattened, directly queryable reference to a searchable collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Identifier, mirrors the source structure node.
    pub id: String,
    /// Display title, mirrors the source structure node.
    pub title: String,
    /// Type tag of the owning handler.
    #[serde(rename = "type")]
    pub ds_type: String,
    /// Default time field, carried over from index-pattern metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_field_name: Option<String>,
    /// Originating data source, absent for the local cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceReference>,
}

impl Dataset {
    /// Creates a dataset with no time field or data source.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        ds_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ds_type: ds_type.into(),
            time_field_name: None,
            data_source: None,
        }
    }

    /// Sets the default time field.
    #[must_use]
    pub fn with_time_field(mut self, name: impl Into<String>) -> Self {
        self.time_field_name = Some(name.into());
        self
    }

    /// Sets the originating data source.
    #[must_use]
    pub fn with_data_source(mut self, data_source: DataSourceReference) -> Self {
        self.data_source = Some(data_source);
        self
    }
}
