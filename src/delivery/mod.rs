//! Mail delivery subsystem.
//!
//! Turns a raw message read on stdin into a document in the recipient's
//! mailbox collection, optionally archiving the raw bytes first. Used by
//! the `docmail-deliver` binary; the library surface is the pure
//! conversion and archival steps so they stay testable.

pub mod archive;
pub mod document;

pub use archive::archive_message;
pub use document::build_document;
