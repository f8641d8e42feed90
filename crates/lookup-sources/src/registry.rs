//! In-memory source definition registry.

use crate::{
    definition::SourceDefinition,
    error::{Result, SourceError},
    loader::SourceLoader,
};
use lookup_core::SourceId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// In-memory cache of source definitions.
///
/// Listing methods return definitions in backend-priority order
/// (`priority`, then id), which is the order search results are merged in.
#[derive(Clone)]
pub struct SourceRegistry {
    definitions: Arc<RwLock<HashMap<SourceId, SourceDefinition>>>,
}

impl SourceRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry and load all definitions from the given loader.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn load_from(loader: &SourceLoader) -> Result<Self> {
        let registry = Self::new();
        registry.reload(loader)?;
        Ok(registry)
    }

    /// Replace the cache with freshly loaded definitions.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn reload(&self, loader: &SourceLoader) -> Result<()> {
        let definitions = loader.load_all()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        cache.clear();
        for definition in definitions {
            cache.insert(definition.id().clone(), definition);
        }

        info!(count = cache.len(), "reloaded source definitions");

        Ok(())
    }

    /// Get a source definition by ID.
    ///
    /// # Errors
    /// Returns error if the source is not found.
    pub fn get(&self, source_id: &SourceId) -> Result<SourceDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache
            .get(source_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                source_id: source_id.to_string(),
            })
    }

    /// All definitions in priority order.
    #[must_use]
    pub fn get_all(&self) -> Vec<SourceDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        let mut all: Vec<_> = cache.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.source.priority, a.id()).cmp(&(b.source.priority, b.id()))
        });
        all
    }

    /// Enabled definitions in priority order.
    #[must_use]
    pub fn enabled(&self) -> Vec<SourceDefinition> {
        self.get_all()
            .into_iter()
            .filter(|def| def.source.enabled)
            .collect()
    }

    /// Number of definitions in the registry.
    #[must_use]
    pub fn count(&self) -> usize {
        self.definitions
            .read()
            .expect("acquire read lock on definitions")
            .len()
    }

    /// Check if a source exists in the registry.
    #[must_use]
    pub fn contains(&self, source_id: &SourceId) -> bool {
        self.definitions
            .read()
            .expect("acquire read lock on definitions")
            .contains_key(source_id)
    }

    /// Add or update a source definition.
    ///
    /// # Errors
    /// Returns error if the definition fails validation.
    pub fn insert(&self, definition: SourceDefinition) -> Result<()> {
        definition.validate()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        let source_id = definition.id().clone();
        cache.insert(source_id.clone(), definition);

        debug!(source_id = %source_id, "inserted source definition");

        Ok(())
    }

    /// Remove a source definition.
    ///
    /// Returns `true` if the source was present, `false` otherwise.
    pub fn remove(&self, source_id: &SourceId) -> bool {
        let removed = self
            .definitions
            .write()
            .expect("acquire write lock on definitions")
            .remove(source_id)
            .is_some();

        if removed {
            debug!(source_id = %source_id, "removed source definition");
        }

        removed
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
