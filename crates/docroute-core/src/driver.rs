//! Store driver and connection traits

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{Document, DocumentId, Result};

/// Default time allowed for a connection to become ready
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for establishing a connection to one database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Store endpoint shared by every database (e.g. `mongodb://host:27017`)
    pub uri: String,

    /// Database the connection is scoped to
    pub database: String,

    /// Upper bound on waiting for the connection to become ready
    pub connect_timeout: Duration,

    /// Application name reported to the store, if it supports one
    pub app_name: Option<String>,
}

impl ConnectionConfig {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            app_name: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// The URI scheme, without the `://` suffix
    pub fn scheme(&self) -> Option<&str> {
        uri_scheme(&self.uri)
    }
}

/// Extract the scheme of a store URI (`mongodb+srv://x` -> `mongodb+srv`)
pub fn uri_scheme(uri: &str) -> Option<&str> {
    uri.split_once("://").map(|(scheme, _)| scheme)
}

/// A document store driver
///
/// Drivers are stateless factories: every call to [`StoreDriver::connect`]
/// produces a new, ready connection scoped to one database.
#[async_trait]
pub trait StoreDriver: Send + Sync {
    /// Unique driver identifier (e.g. "mongodb")
    fn id(&self) -> &'static str;

    /// Human readable name
    fn display_name(&self) -> &'static str;

    /// URI schemes this driver accepts
    fn uri_schemes(&self) -> &'static [&'static str];

    /// Whether this driver can serve the given store URI
    fn accepts_uri(&self, uri: &str) -> bool {
        uri_scheme(uri).is_some_and(|scheme| self.uri_schemes().contains(&scheme))
    }

    /// Open a connection and wait until it is ready for use.
    ///
    /// Implementations must not return a half-initialized connection: either
    /// the handle is usable or an error is returned.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn StoreConnection>>;
}

/// A live connection to one database
///
/// Collection arguments are physical collection names. Operations map
/// one-to-one onto single store operations; none of them create indexes.
#[async_trait]
pub trait StoreConnection: Send + Sync {
    /// Get the driver name (e.g. "mongodb", "memory")
    fn driver_name(&self) -> &str;

    /// The database this connection is scoped to
    fn database(&self) -> &str;

    /// All documents of a collection, in natural order
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// One document by id
    async fn find_by_id(&self, collection: &str, id: DocumentId) -> Result<Option<Document>>;

    /// Insert a document, assigning a fresh `_id`, and return it as stored
    async fn insert(&self, collection: &str, document: Document) -> Result<Document>;

    /// Set the given fields on a document and return the updated document
    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        changes: Document,
    ) -> Result<Option<Document>>;

    /// Remove a document and return it as it was
    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> Result<Option<Document>>;

    /// Whether a collection physically exists in the database
    async fn collection_exists(&self, collection: &str) -> Result<bool>;

    /// Drop a collection and all its documents
    async fn drop_collection(&self, collection: &str) -> Result<()>;

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}
