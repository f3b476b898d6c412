//! Memory driver implementation

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docroute_core::{
    ConnectionConfig, DocrouteError, Document, DocumentId, Result, StoreConnection, StoreDriver,
};
use parking_lot::RwLock;

use crate::MemoryStore;

/// In-memory document store driver
pub struct MemoryDriver {
    store: MemoryStore,
    connect_delay: Option<Duration>,
    refused: RwLock<HashSet<String>>,
    failures_pending: AtomicUsize,
    attempts: AtomicUsize,
    opened: AtomicUsize,
}

impl MemoryDriver {
    /// Create a driver over a fresh, empty store
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Create a driver over an existing store
    pub fn with_store(store: MemoryStore) -> Self {
        tracing::debug!("memory driver initialized");
        Self {
            store,
            connect_delay: None,
            refused: RwLock::new(HashSet::new()),
            failures_pending: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
            opened: AtomicUsize::new(0),
        }
    }

    /// Make every connect wait this long before becoming ready
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Refuse every connection to `database`, as a store rejecting credentials would
    pub fn refuse_database(&self, database: &str) {
        self.refused.write().insert(database.to_string());
    }

    /// Accept connections to a previously refused database again
    pub fn accept_database(&self, database: &str) {
        self.refused.write().remove(database);
    }

    /// Make the next `count` connect attempts fail
    pub fn fail_next_connects(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Number of connect attempts so far, failed or not
    pub fn connect_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of connections successfully opened so far
    pub fn connections_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// The store shared by every connection of this driver
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    fn take_pending_failure(&self) -> bool {
        self.failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreDriver for MemoryDriver {
    fn id(&self) -> &'static str {
        "memory"
    }

    fn display_name(&self) -> &'static str {
        "In-memory"
    }

    fn uri_schemes(&self) -> &'static [&'static str] {
        &["memory"]
    }

    #[tracing::instrument(skip(self, config), fields(database = %config.database))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn StoreConnection>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }

        if self.take_pending_failure() {
            return Err(DocrouteError::Connection(format!(
                "memory store unavailable for database '{}'",
                config.database
            )));
        }

        if self.refused.read().contains(&config.database) {
            return Err(DocrouteError::Connection(format!(
                "authentication failed for database '{}'",
                config.database
            )));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("memory connection ready");
        Ok(Arc::new(MemoryConnection::new(
            self.store.clone(),
            config.database.clone(),
        )))
    }
}

/// Connection to one database of a [`MemoryStore`]
pub struct MemoryConnection {
    store: MemoryStore,
    database: String,
    closed: AtomicBool,
}

impl MemoryConnection {
    pub fn new(store: MemoryStore, database: String) -> Self {
        Self {
            store,
            database,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DocrouteError::Connection("Connection is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    fn driver_name(&self) -> &str {
        "memory"
    }

    fn database(&self) -> &str {
        &self.database
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.ensure_not_closed()?;
        Ok(self.store.find_all(&self.database, collection))
    }

    async fn find_by_id(&self, collection: &str, id: DocumentId) -> Result<Option<Document>> {
        self.ensure_not_closed()?;
        Ok(self.store.find_by_id(&self.database, collection, id))
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document> {
        self.ensure_not_closed()?;
        Ok(self.store.insert(&self.database, collection, document))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        changes: Document,
    ) -> Result<Option<Document>> {
        self.ensure_not_closed()?;
        Ok(self.store.update(&self.database, collection, id, changes))
    }

    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> Result<Option<Document>> {
        self.ensure_not_closed()?;
        Ok(self.store.delete(&self.database, collection, id))
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        self.ensure_not_closed()?;
        Ok(self.store.collection_exists(&self.database, collection))
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        self.ensure_not_closed()?;
        self.store.drop_collection(&self.database, collection);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
