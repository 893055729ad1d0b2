//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (key = value lines)
//!     → loader.rs (line parser, schema coercion)
//!     → MailConfig (typed, immutable)
//!     → registry.rs caches Arc<MailConfig> per absolute path
//!
//! On file change:
//!     watcher.rs (notify) sends the path on the reload channel
//!     → registry reload task re-parses the file
//!     → atomic swap of the cached instance
//!     → later instance() calls observe the new values
//! ```
//!
//! # Design Decisions
//! - Instances are immutable once loaded; a reload replaces, never mutates
//! - A failed reload keeps the previous instance and is only logged
//! - One filesystem watch per containing directory, never removed

pub mod loader;
pub mod registry;
pub mod schema;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use registry::ConfigRegistry;
pub use schema::MailConfig;
