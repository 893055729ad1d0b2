//! Alias lookup server subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs reads one request buffer
//!     → protocol.rs parses `get <percent-escaped-key>`
//!     → resolve.rs answers from virtual_domains or the alias view
//!     → server.rs writes one status line and closes
//! ```
//!
//! # Responsibilities
//! - One request, one response line, then close; no pipelining
//! - A protocol or lookup failure is a status line, never a dropped
//!   connection
//! - Configuration is read per lookup so reloads apply immediately

pub mod protocol;
pub mod resolve;
pub mod server;

pub use protocol::LookupResponse;
pub use resolve::AliasResolver;
pub use server::MapperServer;
