//! Category to adapter registry.

use crate::adapter::{Adapter, CommandAdapter, PendingAdapter};
use crate::config::AdapterConfig;
use crate::types::KNOWN_CATEGORIES;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Maps a category name to the adapter that evaluates it.
///
/// Populated once at startup by the integration layer. Categories outside
/// [`KNOWN_CATEGORIES`] may be registered too.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a [`PendingAdapter`] for every known category.
    #[must_use]
    pub fn with_pending_defaults() -> Self {
        let mut registry = Self::new();
        for category in KNOWN_CATEGORIES {
            registry.register(category, PendingAdapter::new(category));
        }
        registry
    }

    /// Pending defaults, with a [`CommandAdapter`] for each configured category.
    #[must_use]
    pub fn from_config(adapters: &BTreeMap<String, AdapterConfig>) -> Self {
        let mut registry = Self::with_pending_defaults();
        for (category, config) in adapters {
            if let Some(adapter) = CommandAdapter::from_argv(&config.command, config.timeout_ms) {
                registry.register(category.clone(), adapter);
            }
        }
        registry
    }

    /// Register `adapter` for `category`, returning the adapter it replaced.
    pub fn register(
        &mut self,
        category: impl Into<String>,
        adapter: impl Adapter + 'static,
    ) -> Option<Arc<dyn Adapter>> {
        self.register_shared(category, Arc::new(adapter))
    }

    /// Register an adapter that is shared with other categories or owners.
    pub fn register_shared(
        &mut self,
        category: impl Into<String>,
        adapter: Arc<dyn Adapter>,
    ) -> Option<Arc<dyn Adapter>> {
        self.adapters.insert(category.into(), adapter)
    }

    #[must_use]
    pub fn get(&self, category: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(category).cloned()
    }

    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.adapters.contains_key(category)
    }

    /// Registered category names, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("categories", &self.categories())
            .finish()
    }
}
