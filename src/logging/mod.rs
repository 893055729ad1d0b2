//! Store-backed application logging.
//!
//! Operational events worth keeping are persisted as documents in the
//! configured logs collection, where the rest of the toolkit can query
//! them. Records below the configured level are dropped; `debug_echo`
//! additionally prints every record to stdout. Process-level diagnostics
//! still go through `tracing` and are unaffected by this module.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::config::ConfigRegistry;
use crate::store::StoreClient;

/// Severity of a persisted log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 1,
    Notice = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Notice => "notice",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes log records into the store's logs collection.
#[derive(Clone)]
pub struct StoreLogger {
    /// Component name stamped on every record.
    source: &'static str,
    registry: Arc<ConfigRegistry>,
    config_path: Option<PathBuf>,
    http: reqwest::Client,
}

impl StoreLogger {
    pub fn new(
        source: &'static str,
        registry: Arc<ConfigRegistry>,
        config_path: Option<PathBuf>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            source,
            registry,
            config_path,
            http,
        }
    }

    /// Persist one record, subject to the configured level threshold.
    ///
    /// Logging never fails the operation being logged; any store trouble
    /// is reported through `tracing` and swallowed.
    pub async fn log(&self, level: Level, message: &str, extra: Map<String, Value>) {
        let config = match self.registry.instance(self.config_path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping log record, configuration unavailable");
                return;
            }
        };

        let now = Utc::now();
        if config.debug_echo {
            println!("[{}] {}:  {}", level.as_str(), now.to_rfc2822(), message);
        }

        if (level as u8) < config.log_level {
            return;
        }

        let doc = record(level, message, self.source, now, extra);
        let store = StoreClient::from_parts(self.http.clone(), &config.store_host, config.store_port);
        if let Err(e) = store.save_document(&config.logs_collection, &doc).await {
            tracing::warn!(error = %e, "Failed to persist log record");
        }
    }

    pub async fn debug(&self, message: &str) {
        self.log(Level::Debug, message, Map::new()).await;
    }

    pub async fn notice(&self, message: &str) {
        self.log(Level::Notice, message, Map::new()).await;
    }

    pub async fn warning(&self, message: &str) {
        self.log(Level::Warning, message, Map::new()).await;
    }

    pub async fn error(&self, message: &str) {
        self.log(Level::Error, message, Map::new()).await;
    }

    pub async fn critical(&self, message: &str) {
        self.log(Level::Critical, message, Map::new()).await;
    }
}

/// Build one log record document.
fn record(
    level: Level,
    message: &str,
    source: &str,
    now: DateTime<Utc>,
    extra: Map<String, Value>,
) -> Value {
    let mut doc = json!({
        "level": level as u8,
        "str_level": level.as_str(),
        "utc": now.to_rfc2822(),
        "timestamp": now.timestamp_millis() as f64 / 1000.0,
        "message": message,
        "source": source,
    });
    if let Some(fields) = doc.as_object_mut() {
        for (key, value) in extra {
            fields.insert(key, value);
        }
    }
    doc
}
