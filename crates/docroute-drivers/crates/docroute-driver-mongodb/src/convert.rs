//! Conversion between JSON documents and BSON documents
//!
//! Outgoing documents are rendered the way clients expect them: object ids
//! as 24 hex digit strings and dates as RFC 3339 strings. Remaining BSON-only
//! types fall back to relaxed extended JSON.

use bson::{Bson, Document as BsonDocument};
use docroute_core::{DocrouteError, Document, Result};
use serde_json::{Number, Value};

/// Convert a client document into BSON for storage
pub fn to_bson_document(document: &Document) -> Result<BsonDocument> {
    bson::to_document(document)
        .map_err(|e| DocrouteError::Store(format!("Invalid document: {}", e)))
}

/// Convert a stored BSON document into a client document
pub fn from_bson_document(document: BsonDocument) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

/// Convert a single BSON value
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(d) => Number::from_f64(d).map(Value::Number).unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(
            dt.try_to_rfc3339_string()
                .unwrap_or_else(|_| dt.to_string()),
        ),
        Bson::Decimal128(d) => Value::String(d.to_string()),
        Bson::Array(values) => Value::Array(values.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(from_bson_document(doc)),
        other => other.into_relaxed_extjson(),
    }
}
