//! Docmail: a document-store-backed mail delivery toolkit.
//!
//! The toolkit keeps mail routing data in a CouchDB-style document store
//! and exposes two front ends built on this library: `docmail-mapper`, a
//! TCP alias lookup server for the MTA, and `docmail-deliver`, which
//! files an incoming message into the recipient's mailbox collection.

pub mod config;
pub mod delivery;
pub mod logging;
pub mod mapper;
pub mod store;

pub use config::{ConfigRegistry, MailConfig};
pub use mapper::MapperServer;
pub use store::StoreClient;
