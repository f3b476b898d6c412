//! MongoDB driver for docroute
//!
//! One [`MongoDbConnection`] wraps one `mongodb::Client` whose default
//! database is the database the connection was opened for. The client is
//! pinged before the connection is handed out, so a returned connection has
//! already reached the server and authenticated.
//!
//! # Example
//!
//! ```ignore
//! use docroute_driver_mongodb::MongoDbDriver;
//! use docroute_core::{ConnectionConfig, StoreDriver};
//!
//! let driver = MongoDbDriver::new();
//! let config = ConnectionConfig::new("mongodb://localhost:27017", "shop");
//! let conn = driver.connect(&config).await?;
//! let items = conn.find_all("GroceryInventory").await?;
//! ```

pub mod convert;
#[cfg(test)]
mod convert_tests;
mod driver;
#[cfg(test)]
mod driver_tests;

pub use driver::*;
