//! Shared document storage behind memory connections

use std::collections::HashMap;
use std::sync::Arc;

use docroute_core::{Document, DocumentId, ID_FIELD};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

type Collection = IndexMap<DocumentId, Document>;
type Database = HashMap<String, Collection>;

/// Documents of every database, keyed by database then collection.
///
/// Clone-friendly via Arc; collections keep insertion order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    databases: Arc<RwLock<HashMap<String, Database>>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_all(&self, database: &str, collection: &str) -> Vec<Document> {
        self.databases
            .read()
            .get(database)
            .and_then(|db| db.get(collection))
            .map(|coll| coll.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn find_by_id(&self, database: &str, collection: &str, id: DocumentId) -> Option<Document> {
        self.databases
            .read()
            .get(database)
            .and_then(|db| db.get(collection))
            .and_then(|coll| coll.get(&id))
            .cloned()
    }

    /// Insert under a fresh id. Creates the collection on first insert.
    pub fn insert(&self, database: &str, collection: &str, document: Document) -> Document {
        let id = DocumentId::generate();
        let mut stored = Document::new();
        stored.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
        stored.extend(document);

        self.databases
            .write()
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .insert(id, stored.clone());
        stored
    }

    pub fn update(
        &self,
        database: &str,
        collection: &str,
        id: DocumentId,
        changes: Document,
    ) -> Option<Document> {
        let mut databases = self.databases.write();
        let stored = databases
            .get_mut(database)
            .and_then(|db| db.get_mut(collection))
            .and_then(|coll| coll.get_mut(&id))?;
        for (key, value) in changes {
            stored.insert(key, value);
        }
        Some(stored.clone())
    }

    pub fn delete(&self, database: &str, collection: &str, id: DocumentId) -> Option<Document> {
        self.databases
            .write()
            .get_mut(database)
            .and_then(|db| db.get_mut(collection))
            .and_then(|coll| coll.shift_remove(&id))
    }

    pub fn collection_exists(&self, database: &str, collection: &str) -> bool {
        self.databases
            .read()
            .get(database)
            .is_some_and(|db| db.contains_key(collection))
    }

    /// Create an empty collection if it does not exist yet
    pub fn create_collection(&self, database: &str, collection: &str) {
        self.databases
            .write()
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default();
    }

    /// Drop a collection. Returns true if it existed.
    pub fn drop_collection(&self, database: &str, collection: &str) -> bool {
        self.databases
            .write()
            .get_mut(database)
            .is_some_and(|db| db.remove(collection).is_some())
    }

    /// Names of the collections in a database, sorted
    pub fn collection_names(&self, database: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .databases
            .read()
            .get(database)
            .map(|db| db.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}
