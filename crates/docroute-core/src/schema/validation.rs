//! Casting and constraint checks for predefined schemas

use serde_json::{Number, Value};

use super::{FieldDef, FieldType, PredefinedSchema};
use crate::{Document, FieldError, FieldErrorKind, ValidationFailure};

pub(super) fn validate_insert(
    schema: &PredefinedSchema,
    document: Document,
) -> Result<Document, ValidationFailure> {
    let mut failure = ValidationFailure::new(&schema.model_name);
    let mut out = Document::new();

    for field in &schema.fields {
        match document.get(&field.name) {
            None | Some(Value::Null) if field.required => {
                failure.push(required_error(field));
            }
            None => {}
            Some(Value::Null) => {
                out.insert(field.name.clone(), Value::Null);
            }
            Some(value) => match check_field(field, value) {
                Ok(value) => {
                    out.insert(field.name.clone(), value);
                }
                Err(error) => failure.push(error),
            },
        }
    }

    log_dropped(schema, &document);
    if failure.is_empty() {
        Ok(out)
    } else {
        Err(failure)
    }
}

pub(super) fn validate_update(
    schema: &PredefinedSchema,
    changes: Document,
) -> Result<Document, ValidationFailure> {
    let mut failure = ValidationFailure::new(&schema.model_name);
    let mut out = Document::new();

    for (name, value) in &changes {
        let Some(field) = schema.get_field(name) else {
            continue;
        };
        if value.is_null() {
            if field.required {
                failure.push(required_error(field));
            } else {
                out.insert(name.clone(), Value::Null);
            }
            continue;
        }
        match check_field(field, value) {
            Ok(value) => {
                out.insert(name.clone(), value);
            }
            Err(error) => failure.push(error),
        }
    }

    log_dropped(schema, &changes);
    if failure.is_empty() {
        Ok(out)
    } else {
        Err(failure)
    }
}

/// Cast a non-null value and apply the required and enum constraints
fn check_field(field: &FieldDef, value: &Value) -> Result<Value, FieldError> {
    let cast = cast(field, value)?;

    // An empty string does not satisfy a required string field
    if field.required && cast.as_str().is_some_and(str::is_empty) {
        return Err(required_error(field));
    }

    if let (Some(allowed), Some(s)) = (&field.allowed, cast.as_str())
        && !allowed.iter().any(|a| a == s)
    {
        return Err(FieldError::new(
            &field.name,
            FieldErrorKind::Enum,
            format!(
                "`{}` is not a valid enum value for path `{}`.",
                s, field.name
            ),
        ));
    }

    Ok(cast)
}

fn cast(field: &FieldDef, value: &Value) -> Result<Value, FieldError> {
    let cast = match (field.field_type, value) {
        (FieldType::String, Value::String(_)) => Some(value.clone()),
        (FieldType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (FieldType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

        (FieldType::Number, Value::Number(_)) => Some(value.clone()),
        (FieldType::Number, Value::String(s)) => parse_number(s).map(Value::Number),
        (FieldType::Number, Value::Bool(b)) => Some(Value::from(if *b { 1 } else { 0 })),

        (FieldType::Boolean, Value::Bool(_)) => Some(value.clone()),
        (FieldType::Boolean, Value::String(s)) => parse_bool(s).map(Value::Bool),
        (FieldType::Boolean, Value::Number(n)) => match n.as_i64() {
            Some(1) => Some(Value::Bool(true)),
            Some(0) => Some(Value::Bool(false)),
            _ => None,
        },

        _ => None,
    };

    cast.ok_or_else(|| {
        FieldError::new(
            &field.name,
            FieldErrorKind::Cast,
            format!(
                "Cast to {} failed for value \"{}\" (type {}) at path \"{}\"",
                field.field_type,
                display_value(value),
                json_type(value),
                field.name
            ),
        )
    })
}

fn parse_number(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::from(i));
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn required_error(field: &FieldDef) -> FieldError {
    FieldError::new(&field.name, FieldErrorKind::Required, field.missing_message())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

fn log_dropped(schema: &PredefinedSchema, document: &Document) {
    let dropped: Vec<&str> = document
        .keys()
        .filter(|k| schema.get_field(k).is_none())
        .map(String::as_str)
        .collect();
    if !dropped.is_empty() {
        tracing::debug!(
            schema = %schema.type_name,
            fields = ?dropped,
            "dropping fields not declared by schema"
        );
    }
}
