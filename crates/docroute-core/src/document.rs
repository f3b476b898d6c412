//! Documents, document ids and collection namespaces

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{DocrouteError, Result};

/// A schemaless JSON document as accepted from and returned to clients
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Name of the identifier field every stored document carries
pub const ID_FIELD: &str = "_id";

/// Identifier of a stored document (a 12-byte object id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parse a 24 hex digit id as sent in request paths
    pub fn parse(raw: &str) -> Result<Self> {
        ObjectId::parse_str(raw).map(Self).map_err(|_| {
            DocrouteError::Store(format!(
                "Cast to ObjectId failed for value \"{}\" (type string) at path \"{}\"",
                raw, ID_FIELD
            ))
        })
    }

    /// Read the id out of a stored document, if it carries a well-formed one
    pub fn of(document: &Document) -> Option<Self> {
        document
            .get(ID_FIELD)
            .and_then(|v| v.as_str())
            .and_then(|s| ObjectId::parse_str(s).ok())
            .map(Self)
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for DocumentId {
    type Err = DocrouteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// A (database, collection) pair
///
/// Used as the model cache key. Kept as two fields rather than a joined
/// string so that names containing any separator can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace {
    database: String,
    collection: String,
}

impl Namespace {
    /// Build a namespace, rejecting empty names
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Result<Self> {
        let database = database.into();
        let collection = collection.into();
        validate_name("database", &database)?;
        validate_name("collection", &collection)?;
        Ok(Self {
            database,
            collection,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Database and collection names are opaque: the only rule is non-empty.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DocrouteError::InvalidName(format!(
            "{} name must not be empty",
            kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_id() {
        let id = DocumentId::parse("65f1c2a9e4b0a1b2c3d4e5f6").unwrap();
        assert_eq!(id.to_hex(), "65f1c2a9e4b0a1b2c3d4e5f6");
        assert_eq!(id.to_string(), "65f1c2a9e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_parse_malformed_id_is_store_error() {
        let err = DocumentId::parse("not-an-id").unwrap_err();
        assert!(matches!(err, DocrouteError::Store(ref msg) if msg.contains("not-an-id")));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(DocumentId::generate(), DocumentId::generate());
    }

    #[test]
    fn test_id_of_document() {
        let id = DocumentId::generate();
        let doc = json!({ "_id": id.to_hex(), "a": 1 });
        assert_eq!(DocumentId::of(doc.as_object().unwrap()), Some(id));

        let doc = json!({ "_id": 42 });
        assert_eq!(DocumentId::of(doc.as_object().unwrap()), None);
    }

    #[test]
    fn test_namespace_rejects_empty_names() {
        assert!(matches!(
            Namespace::new("", "items"),
            Err(DocrouteError::InvalidName(_))
        ));
        assert!(matches!(
            Namespace::new("shop", ""),
            Err(DocrouteError::InvalidName(_))
        ));
    }

    #[test]
    fn test_namespace_keys_do_not_collide_on_separator() {
        let a = Namespace::new("a-b", "c").unwrap();
        let b = Namespace::new("a", "b-c").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_namespace_is_case_sensitive() {
        let a = Namespace::new("Shop", "items").unwrap();
        let b = Namespace::new("shop", "items").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "Shop.items");
    }
}
