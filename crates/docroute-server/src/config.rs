//! Command line and environment configuration

use std::path::PathBuf;

use anyhow::Context;

use clap::{Parser, ValueEnum};
use docroute_core::{DocrouteError, Result, SchemaRegistry};
use docroute_drivers::DriverRegistry;
use docroute_registry::{ModelRegistry, RegistryConfig};

use crate::logging::LoggingConfig;

/// Console log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable, multi-line
    Pretty,
    /// One JSON object per line
    Json,
}

/// docroute - CRUD over any database and collection named in the URL
#[derive(Parser, Debug, Clone)]
#[command(name = "docroute", version, about, long_about = None)]
pub struct ServerConfig {
    /// Store endpoint shared by every database (e.g. mongodb://localhost:27017)
    #[arg(long = "mongo-uri", env = "MONGO_URI")]
    pub mongo_uri: String,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Upper bound on establishing one database connection, in milliseconds
    #[arg(long, env = "DOCROUTE_CONNECT_TIMEOUT_MS", default_value_t = 10_000)]
    pub connect_timeout_ms: u64,

    /// Application name reported to the store
    #[arg(long, env = "DOCROUTE_APP_NAME")]
    pub app_name: Option<String>,

    /// Back a collection with a predefined schema: `collection=Type`
    #[arg(
        long = "schema-binding",
        env = "DOCROUTE_SCHEMA_BINDINGS",
        value_delimiter = ','
    )]
    pub schema_bindings: Vec<String>,

    /// Console log format
    #[arg(long, env = "DOCROUTE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter; RUST_LOG takes precedence when set
    #[arg(long, env = "DOCROUTE_LOG_FILTER")]
    pub log_filter: Option<String>,

    /// Also write daily-rotated JSON logs into this directory
    #[arg(long, env = "DOCROUTE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Bind the listener; `host` may be an IP literal or a hostname
    pub async fn bind(&self) -> anyhow::Result<tokio::net::TcpListener> {
        tokio::net::TcpListener::bind((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("failed to bind {}:{}", self.host, self.port))
    }

    pub fn registry_config(&self) -> RegistryConfig {
        let config =
            RegistryConfig::new(&self.mongo_uri).with_connect_timeout_ms(self.connect_timeout_ms);
        match &self.app_name {
            Some(name) => config.with_app_name(name),
            None => config,
        }
    }

    /// Built-in schemas plus the configured bindings
    pub fn schema_registry(&self) -> Result<SchemaRegistry> {
        let mut schemas = SchemaRegistry::with_defaults();
        for binding in self.schema_bindings.iter().map(|b| b.trim()) {
            if binding.is_empty() {
                continue;
            }
            let Some((collection, type_name)) = binding.split_once('=') else {
                return Err(DocrouteError::Configuration(format!(
                    "invalid schema binding '{}': expected collection=Type",
                    binding
                )));
            };
            schemas.bind(collection.trim(), type_name.trim())?;
        }
        Ok(schemas)
    }

    pub fn build_registry(&self) -> Result<ModelRegistry> {
        ModelRegistry::from_drivers(
            &DriverRegistry::with_defaults(),
            self.registry_config(),
            self.schema_registry()?,
        )
    }

    pub fn logging(&self) -> LoggingConfig {
        let mut logging = LoggingConfig {
            format: self.log_format,
            log_dir: self.log_dir.clone(),
            ..LoggingConfig::default()
        };
        if let Some(filter) = &self.log_filter {
            logging.default_filter = filter.clone();
        }
        logging
    }
}
