//! Registry and selection state for dataset handlers.
//!
//! [`DatasetManager`] holds the registered handlers keyed by type, the
//! current dataset selection, and the structure cache. Tree operations are
//! delegated to the handler resolved from the *last* element of the caller
//! supplied path; nodes of unregistered types fall back to the
//! index-pattern handler.
//!
//! # Update stream semantics
//!
//! The manager exposes two separate primitives for selection state, and the
//! asymmetry is deliberate:
//!
//! - [`dataset`](DatasetManager::dataset) reads the current value
//!   synchronously.
//! - [`updates`](DatasetManager::updates) is a hot, change-only broadcast:
//!   a new subscriber is **not** replayed the current value and only
//!   observes subsequent [`set_dataset`](DatasetManager::set_dataset)
//!   calls. Every call emits, with no equality deduplication. A late
//!   subscriber must call `dataset()` on attach to learn the current
//!   selection.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

use tokio::sync::broadcast;

use crate::{
    cache::{CachedDataStructure, DataStructureCache},
    dataset::Dataset,
    error::{Error, Result},
    handlers::{parent_from_reference, DatasetHandler, IndexHandler, IndexPatternHandler},
    services::{FieldSpec, IndexPatternSpec, QueryServices, DEFAULT_INDEX_SETTING},
    structure::{tags, DataStructure},
};

/// Capacity of the update broadcast channel. Slow subscribers lag rather
/// than block the publisher.
const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Registry default: nodes of unregistered types dispatch here.
const DEFAULT_HANDLER_TYPE: &str = tags::INDEX_PATTERN;

/// Policy applied when a handler is registered under an id that is already
/// taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnConflict {
    /// Last writer wins; the previous handler is replaced silently.
    #[default]
    Replace,
    /// Registration fails with [`Error::HandlerConflict`].
    Reject,
}

/// Orchestrator over registered dataset handlers, the structure cache and
/// the current selection.
pub struct DatasetManager {
    services: QueryServices,
    on_conflict: OnConflict,
    handlers: RwLock<HashMap<String, Arc<dyn DatasetHandler>>>,
    cache: Mutex<DataStructureCache>,
    // Live nodes by full id, used to resolve cached children back into
    // full objects; the cache itself stores ids only.
    live: Mutex<HashMap<String, DataStructure>>,
    current: RwLock<Option<Dataset>>,
    updates: broadcast::Sender<Option<Dataset>>,
}

impl DatasetManager {
    /// Creates a manager with the index and index-pattern handlers
    /// registered and the `Replace` conflict policy.
    pub fn new(services: QueryServices) -> Self {
        Self::with_conflict_policy(services, OnConflict::default())
    }

    /// Creates a manager with an explicit conflict policy. The two default
    /// handlers are registered before the policy applies.
    pub fn with_conflict_policy(services: QueryServices, on_conflict: OnConflict) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let mut handlers: HashMap<String, Arc<dyn DatasetHandler>> = HashMap::new();
        let index: Arc<dyn DatasetHandler> = Arc::new(IndexHandler::new());
        let index_pattern: Arc<dyn DatasetHandler> = Arc::new(IndexPatternHandler::new());
        handlers.insert(index.id().to_string(), index);
        handlers.insert(index_pattern.id().to_string(), index_pattern);

        Self {
            services,
            on_conflict,
            handlers: RwLock::new(handlers),
            cache: Mutex::new(DataStructureCache::new()),
            live: Mutex::new(HashMap::new()),
            current: RwLock::new(None),
            updates,
        }
    }

    /// Registers a handler under its [`id`](DatasetHandler::id).
    ///
    /// # Errors
    ///
    /// Under [`OnConflict::Reject`], registering an id twice returns
    /// [`Error::HandlerConflict`]. Under [`OnConflict::Replace`] the last
    /// writer wins and registration never conflicts.
    pub fn register_handler(&self, handler: Arc<dyn DatasetHandler>) -> Result<()> {
        let id = handler.id().to_string();
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| Error::storage("Failed to acquire handler lock"))?;

        if self.on_conflict == OnConflict::Reject && handlers.contains_key(&id) {
            return Err(Error::handler_conflict(id));
        }

        tracing::debug!(handler = %id, "registering dataset handler");
        handlers.insert(id, handler);
        Ok(())
    }

    /// Resolves the handler owning a node's type, falling back to the
    /// index-pattern handler for unregistered types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHandler`] only when the fallback itself is
    /// unregistered, which cannot happen after construction and indicates
    /// a programming error.
    pub fn handler_for(&self, structure: &DataStructure) -> Result<Arc<dyn DatasetHandler>> {
        self.handler_for_type(&structure.ds_type)
    }

    fn handler_for_type(&self, ds_type: &str) -> Result<Arc<dyn DatasetHandler>> {
        let handlers = self
            .handlers
            .read()
            .map_err(|_| Error::storage("Failed to acquire handler lock"))?;

        if let Some(handler) = handlers.get(ds_type) {
            return Ok(handler.clone());
        }
        handlers
            .get(DEFAULT_HANDLER_TYPE)
            .cloned()
            .ok_or_else(|| Error::no_handler(ds_type))
    }

    /// Converts the last node of `path` into a dataset via its handler.
    ///
    /// # Errors
    ///
    /// Fails on an empty path or when no handler resolves.
    pub fn to_dataset(&self, path: &[DataStructure]) -> Result<Dataset> {
        let current = last_of(path)?;
        let handler = self.handler_for(current)?;
        Ok(handler.to_dataset(current))
    }

    /// True iff the node is a selectable dataset for its handler.
    ///
    /// # Errors
    ///
    /// Fails when no handler resolves.
    pub fn is_leaf(&self, structure: &DataStructure) -> Result<bool> {
        Ok(self.handler_for(structure)?.is_leaf(structure))
    }

    /// Fetches navigation options below the last node of `path`,
    /// dispatching on that node's type.
    ///
    /// # Errors
    ///
    /// Fails on an empty path, when no handler resolves, or when the
    /// handler's clients fail; client errors propagate unmodified.
    pub async fn fetch_options(&self, path: &[DataStructure]) -> Result<Vec<DataStructure>> {
        let current = last_of(path)?;
        let handler = self.handler_for(current)?;
        tracing::debug!(
            handler = %handler.id(),
            node = %current.id,
            node_type = %current.ds_type,
            "fetching dataset options"
        );
        handler.fetch_options(&self.services, path).await
    }

    /// Caches nodes by full id: an id-only projection in the cache plus
    /// the live object in the side map.
    ///
    /// # Errors
    ///
    /// Fails only on internal lock poisoning.
    pub fn cache_data_structures(&self, structures: &[DataStructure]) -> Result<()> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::storage("Failed to acquire cache lock"))?;
        let mut live = self
            .live
            .lock()
            .map_err(|_| Error::storage("Failed to acquire cache lock"))?;

        for structure in structures {
            let full_id = structure.full_id();
            cache.set(full_id.clone(), CachedDataStructure::from_structure(structure));
            live.insert(full_id, structure.clone());
        }
        Ok(())
    }

    /// Returns the cached projection for a full id.
    pub fn cached_data_structure(&self, full_id: &str) -> Option<CachedDataStructure> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(full_id).cloned())
    }

    /// Returns the last-seen live node for a full id, used to resolve
    /// cached children back into full objects.
    pub fn live_data_structure(&self, full_id: &str) -> Option<DataStructure> {
        self.live
            .lock()
            .ok()
            .and_then(|live| live.get(full_id).cloned())
    }

    /// Evicts one cached entry, or everything when `full_id` is `None`.
    pub fn clear_cache(&self, full_id: Option<&str>) {
        if let (Ok(mut cache), Ok(mut live)) = (self.cache.lock(), self.live.lock()) {
            match full_id {
                Some(id) => {
                    cache.clear(id);
                    live.remove(id);
                }
                None => {
                    cache.clear_all();
                    live.clear();
                }
            }
        }
    }

    /// Sets (or clears) the current dataset and notifies subscribers.
    ///
    /// Selecting a dataset first materializes a temporary index pattern
    /// through the index-patterns service so the selection is immediately
    /// queryable. When the caller already holds field metadata for the
    /// selection (an ad-hoc pick from a fetched tree), passing it as
    /// `fields` seeds the materialized pattern, which is otherwise created
    /// without resolving fields. Clearing with `None` skips the side
    /// effect entirely. On a failed materialization the previous selection
    /// stays in place and nothing is emitted.
    ///
    /// # Errors
    ///
    /// Propagates index-patterns service failures unmodified.
    pub async fn set_dataset(
        &self,
        dataset: Option<Dataset>,
        fields: Option<Vec<FieldSpec>>,
    ) -> Result<()> {
        if let Some(dataset) = &dataset {
            let spec = IndexPatternSpec {
                id: dataset.id.clone(),
                title: dataset.title.clone(),
                time_field_name: dataset.time_field_name.clone(),
                data_source: dataset.data_source.clone(),
            };
            let mut pattern = self.services.index_patterns.create(spec, true).await?;
            if let Some(fields) = fields {
                pattern.fields = fields;
            }
            self.services
                .index_patterns
                .save_to_cache(&dataset.id, pattern);
            tracing::debug!(dataset = %dataset.id, "materialized temporary index pattern");
        }

        {
            let mut current = self
                .current
                .write()
                .map_err(|_| Error::storage("Failed to acquire selection lock"))?;
            *current = dataset.clone();
        }

        // No subscribers is fine; the value is still the current state.
        let _ = self.updates.send(dataset);
        Ok(())
    }

    /// Synchronous read of the current dataset.
    pub fn dataset(&self) -> Option<Dataset> {
        self.current.read().ok().and_then(|current| current.clone())
    }

    /// Subscribes to selection changes. Change-only: the current value is
    /// not replayed (see the module docs).
    pub fn updates(&self) -> broadcast::Receiver<Option<Dataset>> {
        self.updates.subscribe()
    }

    /// Resolves the configured default index pattern into a dataset.
    ///
    /// Reads the `defaultIndex` ui setting, loads the pattern and converts
    /// it via the index-pattern handler. Every soft miss (no setting
    /// configured, pattern not found) yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Propagates index-patterns service failures unmodified.
    pub async fn fetch_default_dataset(&self) -> Result<Option<Dataset>> {
        let Some(default_id) = self.services.ui_settings.get(DEFAULT_INDEX_SETTING) else {
            return Ok(None);
        };
        let Some(pattern) = self.services.index_patterns.get(&default_id).await? else {
            tracing::debug!(pattern = %default_id, "default index pattern not found");
            return Ok(None);
        };

        let handler = self.handler_for_type(tags::INDEX_PATTERN)?;
        let mut meta = handler.meta();
        meta.time_field_name = pattern.time_field_name.clone();

        let mut structure =
            DataStructure::new(&pattern.id, &pattern.title, tags::INDEX_PATTERN).with_meta(meta);
        if let Some(source) = &pattern.data_source {
            structure = structure.with_parent(parent_from_reference(source));
        }
        Ok(Some(handler.to_dataset(&structure)))
    }
}

fn last_of(path: &[DataStructure]) -> Result<&DataStructure> {
    path.last()
        .ok_or_else(|| Error::invalid_config("path must not be empty"))
}
