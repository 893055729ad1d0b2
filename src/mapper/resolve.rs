//! Alias resolution against the document store.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigRegistry;
use crate::mapper::protocol::LookupResponse;
use crate::store::StoreClient;

/// Design document holding the alias view.
pub const ALIAS_DESIGN: &str = "users";

/// View mapping alias keys to delivery addresses.
pub const ALIAS_VIEW: &str = "aliases";

/// Why a key could not be resolved to a delivery address.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// The store answered and has no single mapping for the key.
    #[error("alias unknown")]
    Unknown,

    /// The store could not be consulted at all.
    #[error("lookup store unavailable")]
    Unavailable,
}

impl From<ResolveError> for LookupResponse {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Unknown => LookupResponse::AliasUnknown,
            ResolveError::Unavailable => LookupResponse::StoreUnavailable,
        }
    }
}

/// Resolves lookup keys to delivery addresses.
///
/// Reads the configuration per lookup so a reloaded store endpoint or
/// domain list takes effect without restarting the server.
#[derive(Clone)]
pub struct AliasResolver {
    registry: Arc<ConfigRegistry>,
    config_path: Option<PathBuf>,
    http: reqwest::Client,
}

impl AliasResolver {
    pub fn new(
        registry: Arc<ConfigRegistry>,
        config_path: Option<PathBuf>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            registry,
            config_path,
            http,
        }
    }

    /// Resolve one decoded key to its delivery address.
    ///
    /// Keys naming one of our own domains answer with the key itself;
    /// everything else goes through the alias view, where exactly one
    /// matching row is a hit and anything else is unknown.
    pub async fn resolve(&self, key: &str) -> Result<String, ResolveError> {
        let config = match self.registry.instance(self.config_path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration for lookup");
                return Err(ResolveError::Unavailable);
            }
        };

        if !key.contains('@') && config.virtual_domains.iter().any(|d| d == key) {
            return Ok(key.to_string());
        }

        let store = StoreClient::from_parts(self.http.clone(), &config.store_host, config.store_port);
        let rows = store
            .query_view(&config.users_collection, ALIAS_DESIGN, ALIAS_VIEW, key)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, key = %key, "Alias view query failed");
                ResolveError::Unavailable
            })?;

        if rows.len() != 1 {
            return Err(ResolveError::Unknown);
        }

        match &rows[0].value {
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }
}
