//! Mapping of registry errors onto HTTP responses

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docroute_core::{DocrouteError, Document};
use serde_json::{Map, Value, json};

/// Body of a request for a missing document
pub const RESOURCE_NOT_FOUND: &str = "Resource not found";

/// Body of a failed collection drop that is not a missing collection
pub const DROP_FAILED: &str = "An error occurred while deleting the collection.";

/// An error as returned to HTTP clients
#[derive(Debug)]
pub enum ApiError {
    /// A failure from the registry or the store
    Registry(DocrouteError),
    /// The request body is missing, malformed or not a JSON object
    BadBody(String),
    /// The addressed document does not exist
    DocumentNotFound,
    /// Listing a collection failed; always a server error
    Query(DocrouteError),
    /// A collection drop failed
    Drop(DocrouteError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Registry(e) => status_for(e),
            ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::DocumentNotFound => StatusCode::NOT_FOUND,
            ApiError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Drop(DocrouteError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Drop(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::Registry(DocrouteError::Validation(failure)) => {
                let errors: Map<String, Value> = failure
                    .errors
                    .iter()
                    .map(|e| (e.path.clone(), Value::String(e.message.clone())))
                    .collect();
                json!({ "error": failure.to_string(), "errors": errors })
            }
            ApiError::Registry(e) | ApiError::Query(e) => json!({ "error": message(e) }),
            ApiError::BadBody(msg) => json!({ "error": msg }),
            ApiError::DocumentNotFound => json!({ "message": RESOURCE_NOT_FOUND }),
            ApiError::Drop(DocrouteError::NotFound(msg)) => json!({ "error": msg }),
            ApiError::Drop(_) => json!({ "error": DROP_FAILED }),
        }
    }
}

/// Caller mistakes are 400, missing things 404, everything else 500
pub fn status_for(error: &DocrouteError) -> StatusCode {
    match error {
        DocrouteError::NotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The message clients see: the store's own wording, without a category prefix
fn message(error: &DocrouteError) -> String {
    match error {
        DocrouteError::Validation(failure) => failure.to_string(),
        DocrouteError::Store(msg) | DocrouteError::NotFound(msg) | DocrouteError::InvalidName(msg) => {
            msg.clone()
        }
        DocrouteError::Connection(_) | DocrouteError::Configuration(_) => error.to_string(),
    }
}

impl From<DocrouteError> for ApiError {
    fn from(error: DocrouteError) -> Self {
        ApiError::Registry(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = ?self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

/// Accept only a JSON object as request body
pub fn object_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Document, ApiError> {
    match payload? {
        Json(Value::Object(document)) => Ok(document),
        Json(other) => Err(ApiError::BadBody(format!(
            "request body must be a JSON object, got {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                Value::String(_) => "a string",
                Value::Array(_) => "an array",
                Value::Object(_) => "an object",
            }
        ))),
    }
}
