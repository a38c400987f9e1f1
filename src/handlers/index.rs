//! Handler for concrete indices reachable through data sources.
//!
//! Navigation shape: root → `INDEXES` category → data sources (the
//! synthetic local cluster first, then saved data-source objects) →
//! indices discovered via a terms aggregation over `_index` → fields.

use async_trait::async_trait;
use serde_json::json;

use super::{field_breadcrumb, fields_to_children, DatasetHandler};
use crate::{
    error::{Error, Result},
    services::{
        GetFieldsOptions, QueryServices, SavedObjectsFindOptions, SearchRequest,
        DATA_SOURCE_OBJECT_TYPE,
    },
    structure::{tags, DataStructure, DataStructureMeta, MetaType, DATA_SOURCE_SEPARATOR},
};

/// Page bound for the data source listing. Larger result sets are
/// silently truncated.
pub const DATA_SOURCE_PAGE_SIZE: u32 = 10_000;

/// Terms aggregation size for index discovery. Clusters with more indices
/// are silently truncated.
pub const INDEX_AGG_SIZE: u32 = 100;

/// Handler for the `INDEX` dataset type.
#[derive(Debug, Default)]
pub struct IndexHandler;

impl IndexHandler {
    /// Creates the handler.
    pub fn new() -> Self {
        Self
    }

    async fn fetch_data_sources(&self, services: &QueryServices) -> Result<Vec<DataStructure>> {
        let options = SavedObjectsFindOptions::new(DATA_SOURCE_OBJECT_TYPE, DATA_SOURCE_PAGE_SIZE)
            .with_fields(vec!["title".to_string()]);
        let objects = services.saved_objects.find(&options).await?;

        let mut sources = vec![DataStructure::local_cluster()];
        sources.extend(objects.into_iter().map(|object| {
            DataStructure::new(&object.id, object.title(), tags::DATA_SOURCE)
        }));
        Ok(sources)
    }

    async fn fetch_indices(
        &self,
        services: &QueryServices,
        source: &DataStructure,
    ) -> Result<Vec<DataStructure>> {
        let request = SearchRequest {
            data_source_id: (!source.is_local_cluster()).then(|| source.id.clone()),
            body: json!({
                "size": 0,
                "aggs": {
                    "indices": {
                        "terms": { "field": "_index", "size": INDEX_AGG_SIZE }
                    }
                }
            }),
        };
        let response = services.search.search(&request).await?;

        let parent = source.as_parent();
        let indices = response
            .terms_bucket_keys("indices")
            .into_iter()
            .map(|name| {
                let id = if source.id.is_empty() {
                    name.clone()
                } else {
                    format!("{}{}{}", source.id, DATA_SOURCE_SEPARATOR, name)
                };
                DataStructure::new(id, name, tags::INDEX)
                    .with_parent(parent.clone())
                    .with_meta(DataStructureMeta::new(MetaType::Custom))
            })
            .collect();
        Ok(indices)
    }

    async fn fetch_fields(
        &self,
        services: &QueryServices,
        index: &DataStructure,
    ) -> Result<Vec<DataStructure>> {
        let options = GetFieldsOptions {
            pattern: index.title.clone(),
            data_source_id: data_source_id_of(index),
        };
        let fields = services
            .index_patterns
            .get_fields_for_wildcard(&options)
            .await?;
        Ok(fields_to_children(index, &fields))
    }
}

#[async_trait]
impl DatasetHandler for IndexHandler {
    fn id(&self) -> &str {
        tags::INDEX
    }

    fn display_name(&self) -> &str {
        "Indexes"
    }

    fn meta(&self) -> DataStructureMeta {
        DataStructureMeta::new(MetaType::Type)
            .with_icon("database")
            .with_tooltip("OpenSearch Indexes")
    }

    async fn fetch_options(
        &self,
        services: &QueryServices,
        path: &[DataStructure],
    ) -> Result<Vec<DataStructure>> {
        let current = path
            .last()
            .ok_or_else(|| Error::invalid_config("fetch path must not be empty"))?;

        match current.ds_type.as_str() {
            tags::DATA_SOURCE => self.fetch_indices(services, current).await,
            tags::INDEX => self.fetch_fields(services, current).await,
            tags::FIELD | tags::TIME_FIELD => Ok(field_breadcrumb(path)),
            // Category children are populated at root fetch time; no I/O.
            tags::INDEXES => Ok(current.children.clone().unwrap_or_default()),
            _ => {
                let children = self.fetch_data_sources(services).await?;
                Ok(vec![DataStructure::new(
                    tags::INDEXES,
                    self.display_name(),
                    tags::INDEXES,
                )
                .with_meta(self.meta())
                .with_children(children)])
            }
        }
    }
}

/// Data source id an index belongs to: its parent when linked, otherwise
/// the `::`-prefixed part of its own id.
fn data_source_id_of(index: &DataStructure) -> Option<String> {
    if let Some(parent) = &index.parent {
        if parent.ds_type == tags::DATA_SOURCE && !parent.is_local_cluster() {
            return Some(parent.id.clone());
        }
        return None;
    }
    index
        .id
        .split_once(DATA_SOURCE_SEPARATOR)
        .map(|(source, _)| source.to_string())
        .filter(|source| !source.is_empty())
}
