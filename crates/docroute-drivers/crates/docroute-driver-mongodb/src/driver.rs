//! MongoDB driver implementation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bson::{Document as BsonDocument, doc};
use docroute_core::{
    ConnectionConfig, DocrouteError, Document, DocumentId, Result, StoreConnection, StoreDriver,
};
use futures::TryStreamExt;
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection};

use crate::convert::{from_bson_document, to_bson_document};

/// MongoDB document store driver
pub struct MongoDbDriver;

impl MongoDbDriver {
    /// Create a new MongoDB driver instance
    pub fn new() -> Self {
        tracing::debug!("MongoDB driver initialized");
        Self
    }

    /// Client options for one database: the configured endpoint with the
    /// database as default and both connect and server selection bounded by
    /// the connect timeout.
    pub async fn client_options(&self, config: &ConnectionConfig) -> Result<ClientOptions> {
        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            DocrouteError::Connection(format!("Failed to parse MongoDB options: {}", e))
        })?;
        options.default_database = Some(config.database.clone());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);
        if let Some(app_name) = &config.app_name {
            options.app_name = Some(app_name.clone());
        }
        Ok(options)
    }
}

impl Default for MongoDbDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreDriver for MongoDbDriver {
    fn id(&self) -> &'static str {
        "mongodb"
    }

    fn display_name(&self) -> &'static str {
        "MongoDB"
    }

    fn uri_schemes(&self) -> &'static [&'static str] {
        &["mongodb", "mongodb+srv"]
    }

    #[tracing::instrument(skip(self, config), fields(database = %config.database))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn StoreConnection>> {
        tracing::debug!("connecting to MongoDB");

        let options = self.client_options(config).await?;
        let client = Client::with_options(options).map_err(|e| {
            DocrouteError::Connection(format!("Failed to create MongoDB client: {}", e))
        })?;

        // The client connects lazily; ping so the handle is ready (or the
        // failure surfaces) before anyone caches it.
        client
            .database(&config.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DocrouteError::Connection(format!("Failed to connect to MongoDB: {}", e)))?;

        tracing::debug!("MongoDB connection ready");
        Ok(Arc::new(MongoDbConnection::new(
            client,
            config.database.clone(),
        )))
    }
}

/// MongoDB connection wrapper implementing the StoreConnection trait
pub struct MongoDbConnection {
    client: Client,
    database: String,
    closed: AtomicBool,
}

impl MongoDbConnection {
    /// Create a new MongoDB connection wrapper
    pub fn new(client: Client, database: String) -> Self {
        Self {
            client,
            database,
            closed: AtomicBool::new(false),
        }
    }

    /// Get the database object
    pub fn db(&self) -> mongodb::Database {
        self.client.database(&self.database)
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.db().collection::<BsonDocument>(name)
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DocrouteError::Connection("Connection is closed".to_string()));
        }
        Ok(())
    }
}

/// Map a driver error: losing the server is a connection failure, anything
/// else is a failure of the operation itself.
pub(crate) fn map_error(error: MongoError) -> DocrouteError {
    match *error.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Authentication { .. } | ErrorKind::Io(_) => {
            DocrouteError::Connection(error.to_string())
        }
        _ => DocrouteError::Store(error.to_string()),
    }
}

fn id_filter(id: DocumentId) -> BsonDocument {
    doc! { "_id": id.object_id() }
}

#[async_trait]
impl StoreConnection for MongoDbConnection {
    fn driver_name(&self) -> &str {
        "mongodb"
    }

    fn database(&self) -> &str {
        &self.database
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.ensure_not_closed()?;
        let cursor = self
            .collection(collection)
            .find(doc! {})
            .await
            .map_err(map_error)?;
        let documents: Vec<BsonDocument> = cursor.try_collect().await.map_err(map_error)?;
        Ok(documents.into_iter().map(from_bson_document).collect())
    }

    async fn find_by_id(&self, collection: &str, id: DocumentId) -> Result<Option<Document>> {
        self.ensure_not_closed()?;
        let found = self
            .collection(collection)
            .find_one(id_filter(id))
            .await
            .map_err(map_error)?;
        Ok(found.map(from_bson_document))
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document> {
        self.ensure_not_closed()?;
        let fields = to_bson_document(&document)?;

        let mut stored = doc! { "_id": DocumentId::generate().object_id() };
        for (key, value) in fields {
            stored.insert(key, value);
        }

        self.collection(collection)
            .insert_one(&stored)
            .await
            .map_err(map_error)?;
        Ok(from_bson_document(stored))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        changes: Document,
    ) -> Result<Option<Document>> {
        self.ensure_not_closed()?;
        // `$set` with no fields is rejected by the server; nothing to change
        // means the update is a lookup.
        if changes.is_empty() {
            return self.find_by_id(collection, id).await;
        }

        let fields = to_bson_document(&changes)?;
        let updated = self
            .collection(collection)
            .find_one_and_update(id_filter(id), doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_error)?;
        Ok(updated.map(from_bson_document))
    }

    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> Result<Option<Document>> {
        self.ensure_not_closed()?;
        let deleted = self
            .collection(collection)
            .find_one_and_delete(id_filter(id))
            .await
            .map_err(map_error)?;
        Ok(deleted.map(from_bson_document))
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        self.ensure_not_closed()?;
        let names = self
            .db()
            .list_collection_names()
            .filter(doc! { "name": collection })
            .await
            .map_err(map_error)?;
        Ok(!names.is_empty())
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        self.ensure_not_closed()?;
        self.collection(collection)
            .drop()
            .await
            .map_err(map_error)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.client.clone().shutdown().await;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
