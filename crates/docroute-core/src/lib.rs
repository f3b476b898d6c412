//! docroute core - shared abstractions for the document gateway
//!
//! This crate provides the types every other docroute crate depends on:
//!
//! - `StoreDriver` / `StoreConnection` - traits implemented by store drivers
//! - `Document`, `DocumentId`, `Namespace` - what requests operate on
//! - `SchemaDescriptor`, `SchemaRegistry` - predefined and open schemas
//! - `DocrouteError` - the error taxonomy surfaced to request handlers

mod document;
mod driver;
mod error;
pub mod schema;

pub use document::*;
pub use driver::*;
pub use error::*;
pub use schema::{FieldDef, FieldType, PredefinedSchema, SchemaDescriptor, SchemaRegistry};
