//! Driver registry for managing available store drivers

use std::collections::BTreeMap;
use std::sync::Arc;

use docroute_core::{DocrouteError, Result, StoreDriver, uri_scheme};

/// Registry of available store drivers
pub struct DriverRegistry {
    drivers: BTreeMap<String, Arc<dyn StoreDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: BTreeMap::new(),
        }
    }

    /// Create a registry with all built-in drivers registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "mongodb")]
        registry.register(Arc::new(crate::mongodb::MongoDbDriver::new()));
        #[cfg(feature = "memory")]
        registry.register(Arc::new(crate::memory::MemoryDriver::new()));

        registry
    }

    /// Register a new driver, replacing any driver with the same id
    pub fn register(&mut self, driver: Arc<dyn StoreDriver>) {
        let id = driver.id().to_string();
        tracing::info!(driver = %id, "registering store driver");
        self.drivers.insert(id, driver);
    }

    /// Get a driver by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn StoreDriver>> {
        let driver = self.drivers.get(id).cloned();
        if driver.is_none() {
            tracing::warn!(driver = %id, "driver not found in registry");
        }
        driver
    }

    /// Find the driver that serves a store URI, by its scheme
    pub fn for_uri(&self, uri: &str) -> Result<Arc<dyn StoreDriver>> {
        let Some(scheme) = uri_scheme(uri) else {
            return Err(DocrouteError::Configuration(
                "store URI has no scheme (expected e.g. mongodb://host:27017)".to_string(),
            ));
        };

        self.drivers
            .values()
            .find(|driver| driver.accepts_uri(uri))
            .cloned()
            .ok_or_else(|| {
                DocrouteError::Configuration(format!(
                    "no driver registered for URI scheme '{}' (available: {})",
                    scheme,
                    self.list().join(", ")
                ))
            })
    }

    /// List all registered driver ids, sorted
    pub fn list(&self) -> Vec<&str> {
        self.drivers.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a driver is registered
    pub fn has(&self, id: &str) -> bool {
        self.drivers.contains_key(id)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
