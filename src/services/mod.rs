//! Injected clients consumed by handlers and the manager.
//!
//! explorar owns none of these collaborators: production deployments back
//! them with a saved-objects HTTP client, a search API and a ui-settings
//! store. The [`memory`] module ships in-memory implementations for tests
//! and offline use, mirroring how storage backends are abstracted behind a
//! trait object elsewhere in this stack.
//!
//! Result sets are bounded by the caller-supplied page sizes; there is no
//! cursor or continuation handling, so results beyond the bound are
//! silently truncated.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use memory::{
    MemoryIndexPatterns, MemorySavedObjects, MemorySearch, MemoryUiSettings,
};

use crate::{dataset::DataSourceReference, error::Result};

/// Saved-object type under which data sources are stored.
pub const DATA_SOURCE_OBJECT_TYPE: &str = "data-source";
/// Saved-object type under which index patterns are stored.
pub const INDEX_PATTERN_OBJECT_TYPE: &str = "index-pattern";
/// Ui-settings key holding the default index pattern id.
pub const DEFAULT_INDEX_SETTING: &str = "defaultIndex";

/// Query options for [`SavedObjectsClient::find`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SavedObjectsFindOptions {
    /// Saved-object type to list.
    pub object_type: String,
    /// Optional full-text search string.
    pub search: Option<String>,
    /// Attribute names the search applies to.
    pub search_fields: Vec<String>,
    /// Page bound. Results beyond it are silently truncated.
    pub per_page: u32,
    /// Attribute names to return.
    pub fields: Vec<String>,
}

impl SavedObjectsFindOptions {
    /// Creates options listing all objects of a type up to `per_page`.
    pub fn new(object_type: impl Into<String>, per_page: u32) -> Self {
        Self {
            object_type: object_type.into(),
            per_page,
            ..Self::default()
        }
    }

    /// Restricts the returned attributes.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }
}

/// A saved object returned by [`SavedObjectsClient::find`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedObject {
    /// Object id.
    pub id: String,
    /// Saved-object type.
    #[serde(rename = "type")]
    pub object_type: String,
    /// Raw attribute document.
    pub attributes: Value,
}

impl SavedObject {
    /// Creates a saved object from its parts.
    pub fn new(id: impl Into<String>, object_type: impl Into<String>, attributes: Value) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
            attributes,
        }
    }

    /// Reads a string attribute, if present.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Display title: the `title` attribute, falling back to the id.
    pub fn title(&self) -> &str {
        self.attr_str("title").unwrap_or(&self.id)
    }
}

/// Client over the saved-objects store.
#[async_trait]
pub trait SavedObjectsClient: Send + Sync {
    /// Lists saved objects matching the options, up to `per_page`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store is unreachable or the
    /// query fails. Errors propagate to callers unmodified.
    async fn find(&self, options: &SavedObjectsFindOptions) -> Result<Vec<SavedObject>>;
}

/// A search request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    /// Target data source; `None` targets the local cluster.
    pub data_source_id: Option<String>,
    /// Raw request body (query DSL).
    pub body: Value,
}

/// A search response envelope. Only aggregations are consumed here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Aggregation results, if the request asked for any.
    pub aggregations: Option<Value>,
}

impl SearchResponse {
    /// Extracts the bucket keys of a terms aggregation.
    ///
    /// A missing aggregation or malformed buckets yield an empty vector, a
    /// soft miss rather than an error.
    pub fn terms_bucket_keys(&self, name: &str) -> Vec<String> {
        self.aggregations
            .as_ref()
            .and_then(|aggs| aggs.get(name))
            .and_then(|agg| agg.get("buckets"))
            .and_then(Value::as_array)
            .map(|buckets| {
                buckets
                    .iter()
                    .filter_map(|b| b.get("key").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Client executing search requests.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Executes a search request.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails; errors propagate to callers
    /// unmodified.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

/// Field metadata for an index or index pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Field type as reported by the engine (e.g. `date`, `keyword`).
    #[serde(rename = "type")]
    pub field_type: String,
}

impl FieldSpec {
    /// Creates a field spec.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }

    /// True if the field can serve as a time axis.
    pub fn is_date(&self) -> bool {
        self.field_type == "date"
    }
}

/// Options for [`IndexPatternsService::get_fields_for_wildcard`].
#[derive(Debug, Clone)]
pub struct GetFieldsOptions {
    /// Index name or wildcard pattern to resolve fields for.
    pub pattern: String,
    /// Target data source; `None` targets the local cluster.
    pub data_source_id: Option<String>,
}

/// Specification used to materialize an index pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPatternSpec {
    /// Pattern id, mirrors the dataset id.
    pub id: String,
    /// Pattern title (the index expression).
    pub title: String,
    /// Default time field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_field_name: Option<String>,
    /// Originating data source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceReference>,
}

/// A materialized index pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPattern {
    /// Pattern id.
    pub id: String,
    /// Pattern title (the index expression).
    pub title: String,
    /// Default time field.
    pub time_field_name: Option<String>,
    /// Originating data source.
    pub data_source: Option<DataSourceReference>,
    /// Resolved fields, empty when field fetch was skipped.
    pub fields: Vec<FieldSpec>,
}

impl IndexPattern {
    /// Builds a pattern from a spec without resolving fields.
    pub fn from_spec(spec: IndexPatternSpec) -> Self {
        Self {
            id: spec.id,
            title: spec.title,
            time_field_name: spec.time_field_name,
            data_source: spec.data_source,
            fields: Vec::new(),
        }
    }
}

/// Service resolving fields and materializing index patterns.
#[async_trait]
pub trait IndexPatternsService: Send + Sync {
    /// Resolves field metadata for an index name or wildcard pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if field resolution fails. An unknown pattern is a
    /// soft miss and yields an empty vector instead.
    async fn get_fields_for_wildcard(&self, options: &GetFieldsOptions) -> Result<Vec<FieldSpec>>;

    /// Materializes an index pattern from a spec.
    ///
    /// With `skip_fetch_fields` the pattern is created without resolving
    /// fields, which is how temporary patterns for ad-hoc selections are
    /// built.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern cannot be created.
    async fn create(&self, spec: IndexPatternSpec, skip_fetch_fields: bool) -> Result<IndexPattern>;

    /// Stores a materialized pattern in the service's session cache.
    fn save_to_cache(&self, id: &str, pattern: IndexPattern);

    /// Looks up a pattern by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails; a missing pattern is a
    /// soft miss and yields `Ok(None)`.
    async fn get(&self, id: &str) -> Result<Option<IndexPattern>>;
}

/// Read accessor over ui settings.
pub trait UiSettings: Send + Sync {
    /// Reads a setting value, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Bundle of all injected clients, cheap to clone and share.
#[derive(Clone)]
pub struct QueryServices {
    /// Saved-objects store client.
    pub saved_objects: Arc<dyn SavedObjectsClient>,
    /// Search execution client.
    pub search: Arc<dyn SearchClient>,
    /// Index-patterns service.
    pub index_patterns: Arc<dyn IndexPatternsService>,
    /// Ui-settings accessor.
    pub ui_settings: Arc<dyn UiSettings>,
}

impl QueryServices {
    /// Builds a fully in-memory service bundle for tests and offline use.
    pub fn in_memory() -> Self {
        Self {
            saved_objects: Arc::new(MemorySavedObjects::new()),
            search: Arc::new(MemorySearch::new()),
            index_patterns: Arc::new(MemoryIndexPatterns::new()),
            ui_settings: Arc::new(MemoryUiSettings::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_saved_object_title_fallback() {
        let with_title = SavedObject::new(
            "ds1",
            DATA_SOURCE_OBJECT_TYPE,
            json!({ "title": "Cluster A" }),
        );
        assert_eq!(with_title.title(), "Cluster A");

        let without_title = SavedObject::new("ds2", DATA_SOURCE_OBJECT_TYPE, json!({}));
        assert_eq!(without_title.title(), "ds2");
    }

    #[test]
    fn test_terms_bucket_keys() {
        let response = SearchResponse {
            aggregations: Some(json!({
                "indices": {
                    "buckets": [
                        { "key": "logs-1", "doc_count": 10 },
                        { "key": "logs-2", "doc_count": 3 }
                    ]
                }
            })),
        };
        assert_eq!(response.terms_bucket_keys("indices"), vec!["logs-1", "logs-2"]);
    }

    #[test]
    fn test_terms_bucket_keys_soft_misses() {
        let empty = SearchResponse::default();
        assert!(empty.terms_bucket_keys("indices").is_empty());

        let wrong_shape = SearchResponse {
            aggregations: Some(json!({ "indices": { "value": 3 } })),
        };
        assert!(wrong_shape.terms_bucket_keys("indices").is_empty());
    }

    #[test]
    fn test_field_spec_is_date() {
        assert!(FieldSpec::new("@timestamp", "date").is_date());
        assert!(!FieldSpec::new("message", "text").is_date());
    }

    #[test]
    fn test_index_pattern_from_spec() {
        let spec = IndexPatternSpec {
            id: "ds1::logs".to_string(),
            title: "logs".to_string(),
            time_field_name: Some("@timestamp".to_string()),
            data_source: None,
        };
        let pattern = IndexPattern::from_spec(spec);
        assert_eq!(pattern.id, "ds1::logs");
        assert!(pattern.fields.is_empty());
    }
}
