//! Connection cache: one lazily established connection per database

use std::sync::Arc;

use docroute_core::{
    ConnectionConfig, DocrouteError, Result, StoreConnection, StoreDriver, validate_name,
};

use crate::RegistryConfig;
use crate::slots::{Lookup, SlotMap};

/// Caches one ready connection per database name
///
/// Connections are established on first use and kept for the lifetime of
/// the process; there is no eviction and no retry. A failed establishment
/// leaves nothing behind, so the next call starts over.
pub struct ConnectionCache {
    driver: Arc<dyn StoreDriver>,
    config: RegistryConfig,
    slots: SlotMap<String, Arc<dyn StoreConnection>>,
}

impl ConnectionCache {
    pub fn new(driver: Arc<dyn StoreDriver>, config: RegistryConfig) -> Self {
        Self {
            driver,
            config,
            slots: SlotMap::new(),
        }
    }

    /// Get the connection for `database`, establishing it if needed
    pub async fn get_connection(&self, database: &str) -> Result<Arc<dyn StoreConnection>> {
        validate_name("database", database)?;

        let driver = Arc::clone(&self.driver);
        let config = self.config.connection_config(database);
        let (connection, lookup) = self
            .slots
            .get_or_init(database.to_string(), move || establish(driver, config))
            .await?;

        if lookup == Lookup::Hit {
            tracing::debug!(database = %database, "connection cache hit");
        }
        Ok(connection)
    }

    /// The cached connection for `database`, without establishing one
    pub fn cached(&self, database: &str) -> Option<Arc<dyn StoreConnection>> {
        self.slots.get(&database.to_string())
    }

    /// Number of cached connections
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names of databases with a cached connection, sorted
    pub fn databases(&self) -> Vec<String> {
        let mut databases = self.slots.ready_keys();
        databases.sort();
        databases
    }

    /// Close and forget every cached connection
    #[tracing::instrument(skip(self))]
    pub async fn close_all(&self) -> usize {
        let connections = self.slots.drain_ready();
        let count = connections.len();
        for (database, connection) in connections {
            if let Err(e) = connection.close().await {
                tracing::warn!(database = %database, error = %e, "failed to close connection");
            }
        }
        tracing::info!(count, "closed cached connections");
        count
    }
}

/// Open one connection, bounded by the configured connect timeout
#[tracing::instrument(skip(driver, config), fields(database = %config.database, driver = driver.id()))]
async fn establish(
    driver: Arc<dyn StoreDriver>,
    config: ConnectionConfig,
) -> Result<Arc<dyn StoreConnection>> {
    tracing::info!("establishing connection");

    let attempt = tokio::time::timeout(config.connect_timeout, driver.connect(&config)).await;
    let connection = match attempt {
        Ok(result) => result,
        Err(_) => Err(DocrouteError::Connection(format!(
            "timed out after {}ms connecting to database '{}'",
            config.connect_timeout.as_millis(),
            config.database
        ))),
    }
    .map_err(|e| {
        tracing::error!(error = %e, "failed to connect");
        e
    })?;

    tracing::info!("connection established");
    Ok(connection)
}
