//! Registry of predefined schemas and collection bindings

use std::collections::HashMap;
use std::sync::Arc;

use super::{PredefinedSchema, SchemaDescriptor, employees, grocery_inventory};
use crate::{DocrouteError, Result, validate_name};

/// Maps logical type names to predefined schemas, and physical collection
/// names to logical type names.
///
/// Populated at startup and read-only afterwards. Every registered type is
/// bound to the collection of the same name; further bindings let a
/// predefined schema back a differently named collection.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: HashMap<String, Arc<PredefinedSchema>>,
    bindings: HashMap<String, String>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in types registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(grocery_inventory());
        registry.register(employees());
        registry
    }

    /// Register a schema and bind it to the collection named after its type
    pub fn register(&mut self, schema: PredefinedSchema) {
        let type_name = schema.type_name.clone();
        tracing::debug!(schema = %type_name, fields = schema.fields.len(), "registering schema");
        self.bindings.insert(type_name.clone(), type_name.clone());
        self.types.insert(type_name, Arc::new(schema));
    }

    /// Back `collection` with the predefined schema registered as `type_name`
    pub fn bind(&mut self, collection: &str, type_name: &str) -> Result<()> {
        validate_name("collection", collection)?;
        if !self.types.contains_key(type_name) {
            return Err(DocrouteError::Configuration(format!(
                "cannot bind collection '{}': unknown schema type '{}' (known: {})",
                collection,
                type_name,
                self.type_names().join(", ")
            )));
        }
        tracing::info!(collection = %collection, schema = %type_name, "binding collection to schema");
        self.bindings
            .insert(collection.to_string(), type_name.to_string());
        Ok(())
    }

    /// Look up a predefined schema by its logical type name
    pub fn resolve(&self, type_name: &str) -> Option<SchemaDescriptor> {
        self.types
            .get(type_name)
            .cloned()
            .map(SchemaDescriptor::Predefined)
    }

    /// Logical type bound to a physical collection, if any
    pub fn type_for_collection(&self, collection: &str) -> Option<&str> {
        self.bindings.get(collection).map(String::as_str)
    }

    /// Schema for a physical collection; unbound collections get the open schema
    pub fn descriptor_for_collection(&self, collection: &str) -> SchemaDescriptor {
        self.type_for_collection(collection)
            .and_then(|type_name| self.resolve(type_name))
            .unwrap_or(SchemaDescriptor::Open)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check if a type is registered
    pub fn has(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }
}
