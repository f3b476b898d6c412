use std::sync::Arc;

use clap::Parser;
use docroute_server::{ServerConfig, logging, serve, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    let _log_guard = logging::init(&config.logging())?;

    let registry = Arc::new(config.build_registry()?);
    let listener = config.bind().await?;
    tracing::info!(addr = %listener.local_addr()?, "the server is running");

    serve(Arc::clone(&registry), listener, shutdown_signal()).await?;

    let closed = registry.close_all().await;
    tracing::info!(closed, "server shutdown complete");
    Ok(())
}
