//! Registry configuration types

use std::time::Duration;

use docroute_core::{ConnectionConfig, DEFAULT_CONNECT_TIMEOUT};
use serde::{Deserialize, Serialize};

/// Settings shared by every connection the registry establishes
///
/// Every database is reached through the same store endpoint; only the
/// database name differs between connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Store endpoint, e.g. `mongodb://localhost:27017`
    uri: String,
    /// Upper bound in milliseconds on establishing one connection
    connect_timeout_ms: u64,
    /// Application name reported to the store
    app_name: Option<String>,
}

impl RegistryConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            app_name: None,
        }
    }

    /// Set the connect timeout in milliseconds
    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Get the connect timeout as a Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    /// Connection settings for one database
    pub fn connection_config(&self, database: &str) -> ConnectionConfig {
        let config = ConnectionConfig::new(&self.uri, database)
            .with_connect_timeout(self.connect_timeout());
        match &self.app_name {
            Some(name) => config.with_app_name(name),
            None => config,
        }
    }
}
