//! Model accessors and the model cache

use std::sync::{Arc, Weak};

use docroute_core::{
    DocrouteError, Document, DocumentId, Namespace, Result, SchemaDescriptor, SchemaRegistry,
    StoreConnection,
};

use crate::ConnectionCache;
use crate::slots::{Lookup, SlotMap};

/// Document operations on one collection of one database
///
/// Bound once to a connection, a physical collection and a schema. The
/// connection is held weakly: the connection cache owns it, and an accessor
/// outliving the cache entry fails with a connection error instead of
/// keeping the connection alive.
pub struct ModelAccessor {
    namespace: Namespace,
    schema: SchemaDescriptor,
    connection: Weak<dyn StoreConnection>,
}

impl ModelAccessor {
    pub fn new(
        namespace: Namespace,
        schema: SchemaDescriptor,
        connection: &Arc<dyn StoreConnection>,
    ) -> Self {
        Self {
            namespace,
            schema,
            connection: Arc::downgrade(connection),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn database(&self) -> &str {
        self.namespace.database()
    }

    /// Physical collection name, exactly as requested
    pub fn collection(&self) -> &str {
        self.namespace.collection()
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    fn connection(&self) -> Result<Arc<dyn StoreConnection>> {
        self.connection.upgrade().ok_or_else(|| {
            DocrouteError::Connection(format!(
                "connection to database '{}' is no longer available",
                self.namespace.database()
            ))
        })
    }

    pub async fn find_all(&self) -> Result<Vec<Document>> {
        self.connection()?.find_all(self.collection()).await
    }

    /// Find one document. A malformed id is a store error; an unknown id is `None`.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document>> {
        let id = DocumentId::parse(id)?;
        self.connection()?.find_by_id(self.collection(), id).await
    }

    /// Validate against the schema and insert
    pub async fn insert(&self, document: Document) -> Result<Document> {
        let document = self.schema.prepare_insert(document)?;
        self.connection()?.insert(self.collection(), document).await
    }

    /// Validate the supplied fields and apply them to one document
    pub async fn update_by_id(&self, id: &str, changes: Document) -> Result<Option<Document>> {
        let id = DocumentId::parse(id)?;
        let changes = self.schema.prepare_update(changes)?;
        self.connection()?
            .update_by_id(self.collection(), id, changes)
            .await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<Option<Document>> {
        let id = DocumentId::parse(id)?;
        self.connection()?.delete_by_id(self.collection(), id).await
    }
}

impl std::fmt::Debug for ModelAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelAccessor")
            .field("namespace", &self.namespace)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Caches one accessor per (database, collection)
pub struct ModelCache {
    connections: Arc<ConnectionCache>,
    schemas: Arc<SchemaRegistry>,
    slots: SlotMap<Namespace, Arc<ModelAccessor>>,
}

impl ModelCache {
    pub fn new(connections: Arc<ConnectionCache>, schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            connections,
            schemas,
            slots: SlotMap::new(),
        }
    }

    /// Get the accessor for a namespace, building it on first use.
    ///
    /// Building needs the database connection; its failure is the only way
    /// this fails. Schema resolution always succeeds (unbound collections get
    /// the open schema).
    pub async fn get_model(&self, namespace: &Namespace) -> Result<Arc<ModelAccessor>> {
        let connections = Arc::clone(&self.connections);
        let schemas = Arc::clone(&self.schemas);
        let key = namespace.clone();
        let (model, lookup) = self
            .slots
            .get_or_init(namespace.clone(), move || build_model(connections, schemas, key))
            .await?;

        if lookup == Lookup::Hit {
            tracing::debug!(namespace = %namespace, "model cache hit");
        }
        Ok(model)
    }

    /// Forget the accessor for a namespace, whether ready or being built
    pub fn invalidate(&self, namespace: &Namespace) -> bool {
        let removed = self.slots.remove(namespace);
        if removed {
            tracing::debug!(namespace = %namespace, "model invalidated");
        }
        removed
    }

    /// The cached accessor for a namespace, without building one
    pub fn cached(&self, namespace: &Namespace) -> Option<Arc<ModelAccessor>> {
        self.slots.get(namespace)
    }

    /// Number of cached accessors
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every cached accessor
    pub fn clear(&self) {
        self.slots.drain_ready();
    }
}

#[tracing::instrument(skip(connections, schemas), fields(database = %namespace.database(), collection = %namespace.collection()))]
async fn build_model(
    connections: Arc<ConnectionCache>,
    schemas: Arc<SchemaRegistry>,
    namespace: Namespace,
) -> Result<Arc<ModelAccessor>> {
    let connection = connections.get_connection(namespace.database()).await?;
    let schema = schemas.descriptor_for_collection(namespace.collection());
    tracing::info!(schema = %schema, "model created");
    Ok(Arc::new(ModelAccessor::new(namespace, schema, &connection)))
}
