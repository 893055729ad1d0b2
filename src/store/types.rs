//! Store-specific types and error definitions.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request never completed (connect failure, timeout).
    #[error("store request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The addressed collection, view or document does not exist.
    #[error("store resource missing: {0}")]
    Missing(String),

    /// The store answered with an unexpected status.
    #[error("store returned status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("store response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build store client: {0}")]
    Client(#[source] reqwest::Error),
}

/// One row of a view query result.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewRow {
    /// The key the row was indexed under.
    #[serde(default)]
    pub key: Value,
    /// The value the view emitted for that key.
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewResponse {
    #[serde(default)]
    pub rows: Vec<ViewRow>,
}
