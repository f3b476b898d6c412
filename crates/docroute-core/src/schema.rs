//! Schema descriptors and the schema registry
//!
//! A collection is backed either by a predefined schema (named fields with a
//! type, required and enum constraints) or by the open fallback schema that
//! accepts any document unchanged.

mod predefined;
mod registry;
mod validation;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Document, ID_FIELD, Result};

pub use predefined::{EMPLOYEES, GROCERY_INVENTORY, employees, grocery_inventory};
pub use registry::SchemaRegistry;

/// Declared type of a predefined field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A field of a predefined schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    /// Message reported when a required field is missing
    pub required_message: Option<String>,
    /// Closed set of legal values (strings only)
    pub allowed: Option<Vec<String>>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            required_message: None,
            allowed: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Mark the field required, with the default message
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field required, with a custom message
    pub fn required_with(mut self, message: impl Into<String>) -> Self {
        self.required = true;
        self.required_message = Some(message.into());
        self
    }

    /// Restrict the field to a closed set of values
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub(crate) fn missing_message(&self) -> String {
        self.required_message
            .clone()
            .unwrap_or_else(|| format!("Path `{}` is required.", self.name))
    }
}

/// A named, fixed set of field definitions for a known collection type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredefinedSchema {
    /// Logical type name the schema is registered under (e.g. "GroceryInventory")
    pub type_name: String,
    /// Model name used in validation messages (e.g. "GroceryItem")
    pub model_name: String,
    pub fields: Vec<FieldDef>,
}

impl PredefinedSchema {
    pub fn new(type_name: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            model_name: model_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The schema a model accessor enforces
///
/// Chosen once when the accessor is built and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDescriptor {
    /// A validated schema from the registry
    Predefined(Arc<PredefinedSchema>),
    /// Accepts any field set and validates nothing
    Open,
}

impl SchemaDescriptor {
    pub fn is_open(&self) -> bool {
        matches!(self, SchemaDescriptor::Open)
    }

    /// Logical type name for predefined schemas
    pub fn type_name(&self) -> Option<&str> {
        match self {
            SchemaDescriptor::Predefined(schema) => Some(&schema.type_name),
            SchemaDescriptor::Open => None,
        }
    }

    /// Prepare a client document for insertion.
    ///
    /// Ids are always assigned by the store, so a client supplied `_id` is
    /// discarded under either schema.
    pub fn prepare_insert(&self, mut document: Document) -> Result<Document> {
        document.remove(ID_FIELD);
        match self {
            SchemaDescriptor::Open => Ok(document),
            SchemaDescriptor::Predefined(schema) => {
                validation::validate_insert(schema, document).map_err(Into::into)
            }
        }
    }

    /// Prepare a partial update. Only the supplied fields are checked.
    pub fn prepare_update(&self, mut changes: Document) -> Result<Document> {
        changes.remove(ID_FIELD);
        match self {
            SchemaDescriptor::Open => Ok(changes),
            SchemaDescriptor::Predefined(schema) => {
                validation::validate_update(schema, changes).map_err(Into::into)
            }
        }
    }
}

impl fmt::Display for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDescriptor::Predefined(schema) => write!(f, "predefined({})", schema.type_name),
            SchemaDescriptor::Open => write!(f, "open"),
        }
    }
}
