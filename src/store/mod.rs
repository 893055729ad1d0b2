//! Document store client subsystem.
//!
//! The store is treated as an opaque keyed lookup service reachable at
//! (host, port, collection, key). Only the surface the toolkit consumes
//! is implemented: named view queries, document fetch and document save.

pub mod client;
pub mod types;

pub use client::{http_client, StoreClient};
pub use types::{StoreError, ViewRow};
