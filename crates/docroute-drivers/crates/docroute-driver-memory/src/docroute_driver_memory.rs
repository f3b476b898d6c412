//! In-memory driver for docroute
//!
//! Stores documents in process memory. Every connection opened from one
//! [`MemoryDriver`] sees the same data, the way every connection to one
//! server does. Used for local development (`memory://`) and tests.
//!
//! The driver can also simulate a slow or failing store: an artificial
//! connect delay, a number of upcoming connects that fail, and databases
//! that always refuse connections.

mod driver;
mod store;

#[cfg(test)]
mod driver_tests;

pub use driver::*;
pub use store::MemoryStore;
