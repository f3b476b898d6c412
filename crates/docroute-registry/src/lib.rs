//! Multi-tenant connection and model registry
//!
//! Resolves a (database, collection) pair to a [`ModelAccessor`] at request
//! time. Connections are established lazily, one per database, and shared by
//! every accessor of that database. Both caches allow at most one
//! establishment in flight per key; concurrent callers share its outcome.
//!
//! # Example
//!
//! ```ignore
//! use docroute_core::SchemaRegistry;
//! use docroute_drivers::DriverRegistry;
//! use docroute_registry::{ModelRegistry, RegistryConfig};
//!
//! let config = RegistryConfig::new("mongodb://localhost:27017");
//! let registry = ModelRegistry::from_drivers(
//!     &DriverRegistry::with_defaults(),
//!     config,
//!     SchemaRegistry::with_defaults(),
//! )?;
//! let groceries = registry.model("shop", "GroceryInventory").await?;
//! let items = groceries.find_all().await?;
//! ```

mod config;
mod connections;
mod models;
mod registry;
pub mod slots;


pub use config::RegistryConfig;
pub use connections::ConnectionCache;
pub use models::{ModelAccessor, ModelCache};
pub use registry::{ModelRegistry, RegistryStats};
