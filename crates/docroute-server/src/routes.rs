//! Request handlers
//!
//! Each handler resolves the addressed model through the registry and runs
//! exactly one document operation. Nothing is retried.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use docroute_registry::{ModelRegistry, RegistryStats};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{ApiError, object_body};

pub type AppState = Arc<ModelRegistry>;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
    #[serde(flatten)]
    pub stats: RegistryStats,
}

/// `GET /health` - returns `{ "ok": true, "databases": n, "models": n }`
pub async fn health(State(registry): State<AppState>) -> Json<Health> {
    Json(Health {
        ok: true,
        stats: registry.stats(),
    })
}

/// `GET /find/:database/:collection` - every document of the collection
#[tracing::instrument(skip(registry))]
pub async fn find_all(
    State(registry): State<AppState>,
    Path((database, collection)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let model = registry
        .model(&database, &collection)
        .await
        .map_err(ApiError::Query)?;
    let documents = model.find_all().await.map_err(ApiError::Query)?;
    tracing::debug!(count = documents.len(), "query executed");
    Ok(Json(documents))
}

/// `GET /find/:database/:collection/:id` - one document
#[tracing::instrument(skip(registry))]
pub async fn find_one(
    State(registry): State<AppState>,
    Path((database, collection, id)): Path<(String, String, String)>,
) -> ApiResult<impl IntoResponse> {
    let model = registry.model(&database, &collection).await?;
    let document = model
        .find_by_id(&id)
        .await?
        .ok_or(ApiError::DocumentNotFound)?;
    Ok(Json(document))
}

/// `POST /insert/:database/:collection` - validate and store a document
#[tracing::instrument(skip(registry, payload))]
pub async fn insert(
    State(registry): State<AppState>,
    Path((database, collection)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let document = object_body(payload)?;
    let model = registry.model(&database, &collection).await?;
    let stored = model.insert(document).await?;
    tracing::info!(id = ?stored.get("_id"), "document inserted");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `PUT /update/:database/:collection/:id` - set the supplied fields
#[tracing::instrument(skip(registry, payload))]
pub async fn update(
    State(registry): State<AppState>,
    Path((database, collection, id)): Path<(String, String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let changes = object_body(payload)?;
    let model = registry.model(&database, &collection).await?;
    let document = model
        .update_by_id(&id, changes)
        .await?
        .ok_or(ApiError::DocumentNotFound)?;
    tracing::info!("updated document successfully");
    Ok(Json(json!({
        "message": "updated document successfully",
        "document": document,
    })))
}

/// `DELETE /delete/:database/:collection/:id` - remove one document
#[tracing::instrument(skip(registry))]
pub async fn delete(
    State(registry): State<AppState>,
    Path((database, collection, id)): Path<(String, String, String)>,
) -> ApiResult<impl IntoResponse> {
    let model = registry.model(&database, &collection).await?;
    let document = model
        .delete_by_id(&id)
        .await?
        .ok_or(ApiError::DocumentNotFound)?;
    tracing::info!("deleted document successfully");
    Ok(Json(json!({
        "message": "deleted document successfully",
        "document": document,
    })))
}

/// `DELETE /delete-collection/:database/:collection` - drop a collection
#[tracing::instrument(skip(registry))]
pub async fn delete_collection(
    State(registry): State<AppState>,
    Path((database, collection)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    registry
        .drop_collection(&database, &collection)
        .await
        .map_err(ApiError::Drop)?;
    Ok(Json(json!({
        "message": format!(
            "Collection '{}' has been successfully deleted from database '{}'",
            collection, database
        ),
    })))
}
