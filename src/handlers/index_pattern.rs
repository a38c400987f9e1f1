//! Handler for saved index patterns. The registry default.
//!
//! Navigation shape: root → `INDEX_PATTERNS` category → saved patterns →
//! fields. Patterns carry their default time field through node meta so a
//! converted dataset stays time-aware.

use async_trait::async_trait;

use super::{field_breadcrumb, fields_to_children, DatasetHandler};
use crate::{
    error::{Error, Result},
    services::{
        GetFieldsOptions, QueryServices, SavedObjectsFindOptions, INDEX_PATTERN_OBJECT_TYPE,
    },
    structure::{tags, DataStructure, DataStructureMeta, MetaType},
};

/// Page bound for the index pattern listing. Larger result sets are
/// silently truncated.
pub const INDEX_PATTERN_PAGE_SIZE: u32 = 100;

/// Handler for the `INDEX_PATTERN` dataset type.
#[derive(Debug, Default)]
pub struct IndexPatternHandler;

impl IndexPatternHandler {
    /// Creates the handler.
    pub fn new() -> Self {
        Self
    }

    async fn fetch_patterns(&self, services: &QueryServices) -> Result<Vec<DataStructure>> {
        let options =
            SavedObjectsFindOptions::new(INDEX_PATTERN_OBJECT_TYPE, INDEX_PATTERN_PAGE_SIZE)
                .with_fields(vec!["title".to_string(), "timeFieldName".to_string()]);
        let objects = services.saved_objects.find(&options).await?;

        let patterns = objects
            .into_iter()
            .map(|object| {
                let mut meta = DataStructureMeta::new(MetaType::Custom);
                if let Some(time_field) = object.attr_str("timeFieldName") {
                    meta = meta.with_time_field(time_field);
                }
                DataStructure::new(&object.id, object.title(), tags::INDEX_PATTERN)
                    .with_meta(meta)
            })
            .collect();
        Ok(patterns)
    }

    async fn fetch_fields(
        &self,
        services: &QueryServices,
        pattern: &DataStructure,
    ) -> Result<Vec<DataStructure>> {
        let options = GetFieldsOptions {
            pattern: pattern.title.clone(),
            data_source_id: pattern
                .parent
                .as_ref()
                .filter(|p| p.ds_type == tags::DATA_SOURCE && !p.is_local_cluster())
                .map(|p| p.id.clone()),
        };
        let fields = services
            .index_patterns
            .get_fields_for_wildcard(&options)
            .await?;
        Ok(fields_to_children(pattern, &fields))
    }
}

#[async_trait]
impl DatasetHandler for IndexPatternHandler {
    fn id(&self) -> &str {
        tags::INDEX_PATTERN
    }

    fn display_name(&self) -> &str {
        "Index patterns"
    }

    fn meta(&self) -> DataStructureMeta {
        DataStructureMeta::new(MetaType::Type)
            .with_icon("indexPatternApp")
            .with_tooltip("Saved index patterns")
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
            tags::INDEX_PATTERN => self.fetch_fields(services, current).await,
            tags::FIELD | tags::TIME_FIELD => Ok(field_breadcrumb(path)),
            // Category children are populated at root fetch time; no I/O.
            tags::INDEX_PATTERNS => Ok(current.children.clone().unwrap_or_default()),
            _ => {
                let children = self.fetch_patterns(services).await?;
                Ok(vec![DataStructure::new(
                    tags::INDEX_PATTERNS,
                    self.display_name(),
                    tags::INDEX_PATTERNS,
                )
                .with_meta(self.meta())
                .with_children(children)])
            }
        }
    }
}
