//! docroute drivers - document store driver implementations
//!
//! This crate bundles the concrete [`StoreDriver`] implementations behind
//! feature flags and a [`DriverRegistry`] that picks one by store URI.

#[cfg(feature = "memory")]
pub use docroute_driver_memory as memory;
#[cfg(feature = "mongodb")]
pub use docroute_driver_mongodb as mongodb;

mod registry;

pub use registry::DriverRegistry;

/// Re-export commonly used types from docroute-core
pub use docroute_core::{
    ConnectionConfig, DocrouteError, Document, DocumentId, Result, StoreConnection, StoreDriver,
};
