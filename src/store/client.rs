//! Document store HTTP client.

use std::time::Duration;

use serde_json::Value;

use crate::store::types::{StoreError, ViewResponse, ViewRow};

/// Timeout applied to every store round trip, so an unreachable store can
/// never leave a connection hanging.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared HTTP client used for all store access.
pub fn http_client() -> Result<reqwest::Client, StoreError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(StoreError::Client)
}

/// Client for one (host, port) store endpoint.
///
/// Cheap to construct per request from the current configuration; the
/// underlying `reqwest::Client` is shared and carries the connection pool.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base: String,
}

impl StoreClient {
    pub fn from_parts(http: reqwest::Client, host: &str, port: u16) -> Self {
        Self {
            http,
            base: format!("http://{host}:{port}"),
        }
    }

    /// Query a named view, returning the rows matching `key`.
    pub async fn query_view(
        &self,
        db: &str,
        design: &str,
        view: &str,
        key: &str,
    ) -> Result<Vec<ViewRow>, StoreError> {
        let url = format!("{}/{}/_design/{}/_view/{}", self.base, db, design, view);
        // View keys are JSON values; a string key must be sent quoted.
        let key_param = Value::String(key.to_string()).to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("key", key_param)])
            .send()
            .await
            .map_err(StoreError::Transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::Missing(format!(
                "{db}/_design/{design}/_view/{view}"
            )));
        }
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        let body: ViewResponse = response.json().await.map_err(StoreError::Decode)?;
        Ok(body.rows)
    }

    /// Fetch a document by id.
    pub async fn get_document(&self, db: &str, id: &str) -> Result<Value, StoreError> {
        let url = format!("{}/{}/{}", self.base, db, id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(StoreError::Transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::Missing(format!("{db}/{id}")));
        }
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        response.json().await.map_err(StoreError::Decode)
    }

    /// Save a new document into a collection.
    pub async fn save_document(&self, db: &str, doc: &Value) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.base, db);

        let response = self
            .http
            .post(&url)
            .json(doc)
            .send()
            .await
            .map_err(StoreError::Transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::Missing(db.to_string()));
        }
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        Ok(())
    }
}
