//! docroute HTTP server
//!
//! ## Routes
//!
//! - `GET /find/:database/:collection` - all documents
//! - `GET /find/:database/:collection/:id` - one document
//! - `POST /insert/:database/:collection` - insert the JSON body
//! - `PUT /update/:database/:collection/:id` - set the fields of the JSON body
//! - `DELETE /delete/:database/:collection/:id` - delete one document
//! - `DELETE /delete-collection/:database/:collection` - drop a collection
//! - `GET /health` - `{ "ok": true, "databases": n, "models": n }`
//!
//! ## Example
//!
//! ```ignore
//! let registry = Arc::new(config.build_registry()?);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! docroute_server::serve(registry.clone(), listener, docroute_server::shutdown_signal()).await?;
//! registry.close_all().await;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

use std::future::Future;

use axum::Router;
use axum::routing::{delete, get, post, put};

pub use config::{LogFormat, ServerConfig};
pub use error::ApiError;
pub use routes::AppState;

/// Build the axum `Router` over a shared registry
pub fn router(registry: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/find/:database/:collection", get(routes::find_all))
        .route("/find/:database/:collection/:id", get(routes::find_one))
        .route("/insert/:database/:collection", post(routes::insert))
        .route("/update/:database/:collection/:id", put(routes::update))
        .route("/delete/:database/:collection/:id", delete(routes::delete))
        .route(
            "/delete-collection/:database/:collection",
            delete(routes::delete_collection),
        )
        .with_state(registry)
}

/// Serve until `shutdown` resolves, then finish in-flight requests
pub async fn serve(
    registry: AppState,
    listener: tokio::net::TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let app = router(registry);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
