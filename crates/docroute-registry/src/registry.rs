//! The model registry: connection cache, model cache and schema registry

use std::sync::Arc;

use docroute_core::{
    DocrouteError, Namespace, Result, SchemaRegistry, StoreConnection, StoreDriver,
};
use docroute_drivers::DriverRegistry;
use serde::Serialize;

use crate::{ConnectionCache, ModelAccessor, ModelCache, RegistryConfig};

/// Counts reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Databases with a ready connection
    pub databases: usize,
    /// (database, collection) pairs with a ready accessor
    pub models: usize,
}

/// Process-wide registry of connections and model accessors
///
/// Built once at startup and shared by every request handler.
pub struct ModelRegistry {
    connections: Arc<ConnectionCache>,
    models: ModelCache,
    schemas: Arc<SchemaRegistry>,
}

impl ModelRegistry {
    /// Create a registry over an explicit driver
    pub fn new(driver: Arc<dyn StoreDriver>, config: RegistryConfig, schemas: SchemaRegistry) -> Self {
        tracing::info!(
            driver = driver.id(),
            schemas = ?schemas.type_names(),
            "model registry created"
        );
        let connections = Arc::new(ConnectionCache::new(driver, config));
        let schemas = Arc::new(schemas);
        let models = ModelCache::new(Arc::clone(&connections), Arc::clone(&schemas));
        Self {
            connections,
            models,
            schemas,
        }
    }

    /// Create a registry, picking the driver from the configured store URI
    pub fn from_drivers(
        drivers: &DriverRegistry,
        config: RegistryConfig,
        schemas: SchemaRegistry,
    ) -> Result<Self> {
        let driver = drivers.for_uri(config.uri())?;
        Ok(Self::new(driver, config, schemas))
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn connections(&self) -> &ConnectionCache {
        &self.connections
    }

    pub fn models(&self) -> &ModelCache {
        &self.models
    }

    /// Get the connection for a database, establishing it if needed
    pub async fn connection(&self, database: &str) -> Result<Arc<dyn StoreConnection>> {
        self.connections.get_connection(database).await
    }

    /// Get the accessor for (database, collection), building it if needed
    pub async fn model(&self, database: &str, collection: &str) -> Result<Arc<ModelAccessor>> {
        let namespace = Namespace::new(database, collection)?;
        self.models.get_model(&namespace).await
    }

    /// Drop a collection and forget its accessor.
    ///
    /// Fails with `NotFound` and changes nothing when the collection does not
    /// exist.
    #[tracing::instrument(skip(self))]
    pub async fn drop_collection(&self, database: &str, collection: &str) -> Result<()> {
        let namespace = Namespace::new(database, collection)?;
        let connection = self.connections.get_connection(database).await?;

        if !connection.collection_exists(collection).await? {
            tracing::debug!("collection does not exist");
            return Err(DocrouteError::NotFound(format!(
                "Collection '{}' does not exist in database '{}'.",
                collection, database
            )));
        }

        connection.drop_collection(collection).await.map_err(|e| {
            tracing::error!(error = %e, "failed to drop collection");
            e
        })?;
        self.models.invalidate(&namespace);

        tracing::info!("collection dropped");
        Ok(())
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            databases: self.connections.len(),
            models: self.models.len(),
        }
    }

    /// Forget every accessor and close every connection
    pub async fn close_all(&self) -> usize {
        self.models.clear();
        self.connections.close_all().await
    }
}
