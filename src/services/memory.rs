//! In-memory service implementations.
//!
//! Useful for tests and offline environments where no live cluster is
//! available. All state is stored in memory and lost on drop.
//!
//! # Thread Safety
//!
//! Every implementation is thread-safe and can be shared across tasks.

use std::{
    collections::HashMap,
    sync::RwLock,
};

use async_trait::async_trait;

use super::{
    FieldSpec, GetFieldsOptions, IndexPattern, IndexPatternSpec, IndexPatternsService,
    SavedObject, SavedObjectsClient, SavedObjectsFindOptions, SearchClient, SearchRequest,
    SearchResponse, UiSettings,
};
use crate::error::{Error, Result};

/// In-memory saved-objects store.
#[derive(Debug, Default)]
pub struct MemorySavedObjects {
    objects: RwLock<Vec<SavedObject>>,
}

impl MemorySavedObjects {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with objects.
    pub fn with_objects(objects: Vec<SavedObject>) -> Self {
        Self {
            objects: RwLock::new(objects),
        }
    }

    /// Adds an object to the store.
    pub fn insert(&self, object: SavedObject) {
        if let Ok(mut objects) = self.objects.write() {
            objects.push(object);
        }
    }
}

#[async_trait]
impl SavedObjectsClient for MemorySavedObjects {
    async fn find(&self, options: &SavedObjectsFindOptions) -> Result<Vec<SavedObject>> {
        let objects = self
            .objects
            .read()
            .map_err(|_| Error::saved_objects("Failed to acquire read lock"))?;

        let matches: Vec<SavedObject> = objects
            .iter()
            .filter(|o| o.object_type == options.object_type)
            .take(options.per_page as usize)
            .cloned()
            .collect();

        Ok(matches)
    }
}

/// In-memory search client serving canned index listings.
///
/// Index names are registered per data source (keyed by data source id,
/// empty string for the local cluster) and served back as a terms
/// aggregation over `_index`, the shape the index handler issues.
#[derive(Debug, Default)]
pub struct MemorySearch {
    indices: RwLock<HashMap<String, Vec<String>>>,
}

impl MemorySearch {
    /// Creates a client with no indices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers index names for a data source id.
    pub fn set_indices(&self, data_source_id: impl Into<String>, names: Vec<String>) {
        if let Ok(mut indices) = self.indices.write() {
            indices.insert(data_source_id.into(), names);
        }
    }
}

#[async_trait]
impl SearchClient for MemorySearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let indices = self
            .indices
            .read()
            .map_err(|_| Error::search("Failed to acquire read lock"))?;

        let key = request.data_source_id.clone().unwrap_or_default();
        let names = indices.get(&key).cloned().unwrap_or_default();

        let buckets: Vec<serde_json::Value> = names
            .into_iter()
            .map(|name| serde_json::json!({ "key": name, "doc_count": 1 }))
            .collect();

        Ok(SearchResponse {
            aggregations: Some(serde_json::json!({
                "indices": { "buckets": buckets }
            })),
        })
    }
}

/// In-memory index-patterns service.
#[derive(Debug, Default)]
pub struct MemoryIndexPatterns {
    patterns: RwLock<HashMap<String, IndexPattern>>,
    fields: RwLock<HashMap<String, Vec<FieldSpec>>>,
}

impl MemoryIndexPatterns {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers field metadata for an index name or pattern.
    pub fn set_fields(&self, pattern: impl Into<String>, fields: Vec<FieldSpec>) {
        if let Ok(mut map) = self.fields.write() {
            map.insert(pattern.into(), fields);
        }
    }
}

#[async_trait]
impl IndexPatternsService for MemoryIndexPatterns {
    async fn get_fields_for_wildcard(&self, options: &GetFieldsOptions) -> Result<Vec<FieldSpec>> {
        let fields = self
            .fields
            .read()
            .map_err(|_| Error::index_pattern("Failed to acquire read lock"))?;
        Ok(fields.get(&options.pattern).cloned().unwrap_or_default())
    }

    async fn create(&self, spec: IndexPatternSpec, skip_fetch_fields: bool) -> Result<IndexPattern> {
        let mut pattern = IndexPattern::from_spec(spec);
        if !skip_fetch_fields {
            let options = GetFieldsOptions {
                pattern: pattern.title.clone(),
                data_source_id: pattern.data_source.as_ref().map(|s| s.id.clone()),
            };
            pattern.fields = self.get_fields_for_wildcard(&options).await?;
        }
        Ok(pattern)
    }

    fn save_to_cache(&self, id: &str, pattern: IndexPattern) {
        if let Ok(mut patterns) = self.patterns.write() {
            patterns.insert(id.to_string(), pattern);
        }
    }

    async fn get(&self, id: &str) -> Result<Option<IndexPattern>> {
        let patterns = self
            .patterns
            .read()
            .map_err(|_| Error::index_pattern("Failed to acquire read lock"))?;
        Ok(patterns.get(id).cloned())
    }
}

/// In-memory ui-settings store.
#[derive(Debug, Default)]
pub struct MemoryUiSettings {
    settings: RwLock<HashMap<String, String>>,
}

impl MemoryUiSettings {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a setting value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut settings) = self.settings.write() {
            settings.insert(key.into(), value.into());
        }
    }
}

impl UiSettings for MemoryUiSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.settings
            .read()
            .ok()
            .and_then(|settings| settings.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::{DATA_SOURCE_OBJECT_TYPE, INDEX_PATTERN_OBJECT_TYPE};

    #[tokio::test]
    async fn test_saved_objects_filters_by_type() {
        let store = MemorySavedObjects::with_objects(vec![
            SavedObject::new("ds1", DATA_SOURCE_OBJECT_TYPE, json!({ "title": "A" })),
            SavedObject::new("pat1", INDEX_PATTERN_OBJECT_TYPE, json!({ "title": "logs-*" })),
        ]);

        let options = SavedObjectsFindOptions::new(DATA_SOURCE_OBJECT_TYPE, 100);
        let found = store.find(&options).await.ok();
        assert!(found.is_some());
        if let Some(found) = found {
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].id, "ds1");
        }
    }

    #[tokio::test]
    async fn test_saved_objects_truncates_at_page_bound() {
        let store = MemorySavedObjects::new();
        for i in 0..5 {
            store.insert(SavedObject::new(
                format!("ds{i}"),
                DATA_SOURCE_OBJECT_TYPE,
                json!({}),
            ));
        }

        let options = SavedObjectsFindOptions::new(DATA_SOURCE_OBJECT_TYPE, 3);
        let found = store.find(&options).await.ok();
        assert_eq!(found.map(|f| f.len()), Some(3));
    }

    #[tokio::test]
    async fn test_search_serves_terms_aggregation() {
        let search = MemorySearch::new();
        search.set_indices("ds1", vec!["logs-1".to_string(), "logs-2".to_string()]);

        let request = SearchRequest {
            data_source_id: Some("ds1".to_string()),
            body: json!({}),
        };
        let response = search.search(&request).await.ok();
        assert!(response.is_some());
        if let Some(response) = response {
            assert_eq!(response.terms_bucket_keys("indices"), vec!["logs-1", "logs-2"]);
        }
    }

    #[tokio::test]
    async fn test_search_unknown_source_yields_no_buckets() {
        let search = MemorySearch::new();
        let request = SearchRequest {
            data_source_id: None,
            body: json!({}),
        };
        let response = search.search(&request).await.ok();
        assert!(response.is_some());
        if let Some(response) = response {
            assert!(response.terms_bucket_keys("indices").is_empty());
        }
    }

    #[tokio::test]
    async fn test_index_patterns_create_and_get() {
        let service = MemoryIndexPatterns::new();
        let spec = IndexPatternSpec {
            id: "logs".to_string(),
            title: "logs".to_string(),
            time_field_name: None,
            data_source: None,
        };

        let pattern = service.create(spec, true).await.ok();
        assert!(pattern.is_some());
        if let Some(pattern) = pattern {
            service.save_to_cache("logs", pattern);
        }

        let fetched = service.get("logs").await.ok().flatten();
        assert_eq!(fetched.map(|p| p.title), Some("logs".to_string()));

        let missing = service.get("absent").await.ok().flatten();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_index_patterns_create_resolves_fields() {
        let service = MemoryIndexPatterns::new();
        service.set_fields("logs", vec![FieldSpec::new("@timestamp", "date")]);

        let spec = IndexPatternSpec {
            id: "logs".to_string(),
            title: "logs".to_string(),
            time_field_name: None,
            data_source: None,
        };
        let pattern = service.create(spec, false).await.ok();
        assert_eq!(pattern.map(|p| p.fields.len()), Some(1));
    }

    #[tokio::test]
    async fn test_poisoned_store_reports_client_variant() {
        let store = std::sync::Arc::new(MemorySavedObjects::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.objects.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        let options = SavedObjectsFindOptions::new(DATA_SOURCE_OBJECT_TYPE, 10);
        let result = store.find(&options).await;
        assert!(matches!(result, Err(Error::SavedObjects { .. })));
    }

    #[test]
    fn test_ui_settings_roundtrip() {
        let settings = MemoryUiSettings::new();
        assert!(settings.get("defaultIndex").is_none());
        settings.set("defaultIndex", "logs");
        assert_eq!(settings.get("defaultIndex"), Some("logs".to_string()));
    }
}
