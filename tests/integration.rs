//! Integration tests for explorar.

use std::sync::Arc;

use serde_json::json;

use explorar::{
    handlers::DatasetHandler,
    services::{
        FieldSpec, IndexPatternsService, MemoryIndexPatterns, MemorySavedObjects, MemorySearch,
        MemoryUiSettings, SavedObject, DATA_SOURCE_OBJECT_TYPE, DEFAULT_INDEX_SETTING,
        INDEX_PATTERN_OBJECT_TYPE,
    },
    structure::tags,
    DataStructure, DatasetManager, IndexHandler, QueryServices,
};

struct TestCluster {
    services: QueryServices,
    saved_objects: Arc<MemorySavedObjects>,
    search: Arc<MemorySearch>,
    index_patterns: Arc<MemoryIndexPatterns>,
    ui_settings: Arc<MemoryUiSettings>,
}

/// Builds a service bundle backed by in-memory stores, with handles to the
/// concrete stores for seeding.
fn test_cluster() -> TestCluster {
    let saved_objects = Arc::new(MemorySavedObjects::new());
    let search = Arc::new(MemorySearch::new());
    let index_patterns = Arc::new(MemoryIndexPatterns::new());
    let ui_settings = Arc::new(MemoryUiSettings::new());
    let services = QueryServices {
        saved_objects: saved_objects.clone(),
        search: search.clone(),
        index_patterns: index_patterns.clone(),
        ui_settings: ui_settings.clone(),
    };
    TestCluster {
        services,
        saved_objects,
        search,
        index_patterns,
        ui_settings,
    }
}

#[tokio::test]
async fn test_index_flow_from_root_to_selection() {
    let cluster = test_cluster();
    cluster.saved_objects.insert(SavedObject::new(
        "ds1",
        DATA_SOURCE_OBJECT_TYPE,
        json!({ "title": "Cluster A" }),
    ));
    cluster
        .search
        .set_indices("ds1", vec!["logs-2024".to_string()]);
    cluster.index_patterns.set_fields(
        "logs-2024",
        vec![
            FieldSpec::new("@timestamp", "date"),
            FieldSpec::new("message", "text"),
        ],
    );

    let manager = DatasetManager::new(cluster.services.clone());
    let handler = IndexHandler::new();

    // Root: one category node, Local cluster listed before saved sources.
    let root = DataStructure::new("", "Root", tags::ROOT);
    let categories = handler
        .fetch_options(&cluster.services, &[root.clone()])
        .await
        .unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].ds_type, tags::INDEXES);
    let sources = categories[0].children.clone().unwrap();
    assert_eq!(sources[0].title, "Local cluster");
    assert_eq!(sources[1].title, "Cluster A");

    // Data source: indices discovered via the terms aggregation.
    let source = sources[1].clone();
    let indices = handler
        .fetch_options(&cluster.services, &[root.clone(), source.clone()])
        .await
        .unwrap();
    assert_eq!(indices.len(), 1);
    let index = indices[0].clone();
    assert_eq!(index.id, "ds1::logs-2024");
    assert!(manager.is_leaf(&index).unwrap());

    // Index: typed field children.
    let fields = handler
        .fetch_options(&cluster.services, &[root, source.clone(), index.clone()])
        .await
        .unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].ds_type, tags::TIME_FIELD);

    // Leaf to dataset, then select it: the selection is made queryable.
    let dataset = manager.to_dataset(&[source, index]).unwrap();
    assert_eq!(dataset.id, "ds1::logs-2024");
    assert_eq!(
        dataset.data_source.as_ref().map(|s| s.id.as_str()),
        Some("ds1")
    );

    let mut updates = manager.updates();
    let field_specs = vec![
        FieldSpec::new("@timestamp", "date"),
        FieldSpec::new("message", "text"),
    ];
    manager
        .set_dataset(Some(dataset.clone()), Some(field_specs.clone()))
        .await
        .unwrap();
    assert_eq!(manager.dataset(), Some(dataset.clone()));
    assert_eq!(updates.recv().await.unwrap(), Some(dataset));

    let materialized = cluster.index_patterns.get("ds1::logs-2024").await.unwrap();
    assert!(materialized.is_some());
    if let Some(pattern) = materialized {
        assert_eq!(pattern.title, "logs-2024");
        assert_eq!(pattern.fields, field_specs);
    }
}

#[tokio::test]
async fn test_index_pattern_flow_through_manager_fallback() {
    let cluster = test_cluster();
    cluster.saved_objects.insert(SavedObject::new(
        "pat1",
        INDEX_PATTERN_OBJECT_TYPE,
        json!({ "title": "logs-*", "timeFieldName": "@timestamp" }),
    ));
    cluster
        .index_patterns
        .set_fields("logs-*", vec![FieldSpec::new("@timestamp", "date")]);

    let manager = DatasetManager::new(cluster.services);

    // ROOT has no registered handler, so the manager falls back to the
    // index-pattern handler.
    let root = DataStructure::new("", "Root", tags::ROOT);
    let categories = manager.fetch_options(&[root.clone()]).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].ds_type, tags::INDEX_PATTERNS);

    let patterns = categories[0].children.clone().unwrap();
    assert_eq!(patterns.len(), 1);
    let pattern = patterns[0].clone();
    assert!(manager.is_leaf(&pattern).unwrap());

    let fields = manager
        .fetch_options(&[root, pattern.clone()])
        .await
        .unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].ds_type, tags::TIME_FIELD);

    let dataset = manager.to_dataset(&[pattern]).unwrap();
    assert_eq!(dataset.ds_type, tags::INDEX_PATTERN);
    assert_eq!(dataset.time_field_name.as_deref(), Some("@timestamp"));
}

#[tokio::test]
async fn test_cache_round_trip_and_eviction() {
    let cluster = test_cluster();
    let manager = DatasetManager::new(cluster.services);

    let source = DataStructure::new("ds1", "Cluster A", tags::DATA_SOURCE);
    let index = DataStructure::new("logs", "logs", tags::INDEX)
        .with_parent(source.clone())
        .with_children(vec![DataStructure::new("ts", "ts", tags::TIME_FIELD)]);
    let pattern = DataStructure::new("pat1", "logs-*", tags::INDEX_PATTERN);

    manager
        .cache_data_structures(&[index.clone(), pattern.clone()])
        .unwrap();

    // Cache key uses the data-source separator, projection holds ids only.
    let cached = manager.cached_data_structure("ds1::logs").unwrap();
    assert_eq!(cached.parent, "ds1");
    assert_eq!(cached.children, vec!["ts"]);

    // The side map resolves the full id back into the live node.
    assert_eq!(manager.live_data_structure("ds1::logs"), Some(index));

    manager.clear_cache(Some("ds1::logs"));
    assert!(manager.cached_data_structure("ds1::logs").is_none());
    assert!(manager.cached_data_structure("pat1").is_some());

    manager.clear_cache(None);
    assert!(manager.cached_data_structure("pat1").is_none());
}

#[tokio::test]
async fn test_selection_lifecycle_notifications() {
    let cluster = test_cluster();
    let manager = DatasetManager::new(cluster.services);

    let mut updates = manager.updates();

    let first = manager
        .to_dataset(&[DataStructure::new("a", "a", tags::INDEX)])
        .unwrap();
    manager.set_dataset(Some(first.clone()), None).await.unwrap();
    manager.set_dataset(None, None).await.unwrap();

    assert_eq!(updates.recv().await.unwrap(), Some(first));
    assert_eq!(updates.recv().await.unwrap(), None);
    assert_eq!(manager.dataset(), None);
}

#[tokio::test]
async fn test_default_dataset_bootstrap() {
    let cluster = test_cluster();
    cluster.saved_objects.insert(SavedObject::new(
        "pat1",
        INDEX_PATTERN_OBJECT_TYPE,
        json!({ "title": "logs-*", "timeFieldName": "@timestamp" }),
    ));

    let manager = DatasetManager::new(cluster.services);

    // Nothing configured: a soft miss, not an error.
    assert!(manager.fetch_default_dataset().await.unwrap().is_none());

    // Configure the default and materialize the pattern it refers to.
    cluster.ui_settings.set(DEFAULT_INDEX_SETTING, "pat1");
    cluster.index_patterns.save_to_cache(
        "pat1",
        explorar::IndexPattern {
            id: "pat1".to_string(),
            title: "logs-*".to_string(),
            time_field_name: Some("@timestamp".to_string()),
            data_source: None,
            fields: Vec::new(),
        },
    );

    let dataset = manager.fetch_default_dataset().await.unwrap().unwrap();
    assert_eq!(dataset.id, "pat1");
    assert_eq!(dataset.time_field_name.as_deref(), Some("@timestamp"));

    // The bootstrap result becomes the current selection like any other.
    manager.set_dataset(Some(dataset.clone()), None).await.unwrap();
    assert_eq!(manager.dataset(), Some(dataset));
}
