//! Process-wide configuration registry.
//!
//! The registry caches one immutable configuration instance per absolute
//! file path and keeps it current through filesystem notifications. A
//! reload replaces the cached instance with a single atomic swap, so a
//! reader always observes either the old or the new fully-constructed
//! instance and a reference held across a request never changes under it.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{MailConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};
use crate::config::watcher::watch_dir;

/// Registry of cached configuration instances, keyed by absolute path.
pub struct ConfigRegistry {
    /// Current instance per path; the slot is swapped on reload.
    instances: DashMap<PathBuf, Arc<ArcSwap<MailConfig>>>,
    /// Directory watch bookkeeping and the watcher handles keeping the
    /// notify subscriptions alive.
    watch: Mutex<WatchState>,
    /// Change events feed the reload task through this channel.
    reload_tx: mpsc::UnboundedSender<PathBuf>,
    /// Receiver side, taken once by `run_reload`.
    reload_rx: Mutex<Option<mpsc::UnboundedReceiver<PathBuf>>>,
}

#[derive(Default)]
struct WatchState {
    /// Directories with a registered watch. A directory watch, once
    /// registered, lives for the whole process; events for unwatched
    /// files in it are filtered out by the `instances` map on reload.
    dirs: HashSet<PathBuf>,
    watchers: Vec<RecommendedWatcher>,
}

impl ConfigRegistry {
    /// Create an empty registry.
    pub fn new() -> Arc<Self> {
        let (reload_tx, reload_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            instances: DashMap::new(),
            watch: Mutex::new(WatchState::default()),
            reload_tx,
            reload_rx: Mutex::new(Some(reload_rx)),
        })
    }

    /// Return the current instance for `path`, loading it on first request.
    ///
    /// `None` resolves the path from `DOCMAIL_CONFIG`, falling back to
    /// `docmail.conf`. A missing file yields a defaults-only instance; an
    /// unreadable or unparseable file is a fatal error surfaced to the
    /// caller and nothing is cached.
    pub fn instance(&self, path: Option<&Path>) -> Result<Arc<MailConfig>, ConfigError> {
        let resolved = resolve_path(path);

        if let Some(slot) = self.instances.get(&resolved) {
            return Ok(slot.load_full());
        }

        let config = if resolved.is_file() {
            Arc::new(load_config(&resolved)?)
        } else {
            Arc::new(MailConfig::default())
        };

        // Two racing first loads both parse; or_insert_with keeps one and
        // both callers get a fully-constructed instance.
        let slot = self
            .instances
            .entry(resolved.clone())
            .or_insert_with(|| Arc::new(ArcSwap::from(config)))
            .clone();

        if resolved.is_file() {
            self.watch_file(&resolved);
        }

        Ok(slot.load_full())
    }

    /// Re-parse a watched path and swap in the new instance.
    ///
    /// A failed reload keeps the previous instance and is only logged;
    /// no caller is ever blocked on it. Paths without a cached instance
    /// are ignored, which filters out unrelated files in watched
    /// directories.
    pub fn reload(&self, path: &Path) {
        let Some(slot) = self.instances.get(path) else {
            return;
        };

        match load_config(path) {
            Ok(config) => {
                slot.store(Arc::new(config));
                tracing::info!(path = ?path, "Configuration reloaded");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = ?path,
                    "Failed to reload config, keeping current configuration"
                );
            }
        }
    }

    /// Drive reloads from filesystem change events.
    ///
    /// Runs until the registry is dropped; spawn it once per process in
    /// binaries that want hot reload.
    pub async fn run_reload(self: Arc<Self>) {
        let Some(mut rx) = self.reload_rx.lock().ok().and_then(|mut rx| rx.take()) else {
            return;
        };
        while let Some(path) = rx.recv().await {
            let path = std::fs::canonicalize(&path).unwrap_or(path);
            self.reload(&path);
        }
    }

    /// Register a directory watch for `path`, once per directory.
    fn watch_file(&self, path: &Path) {
        let Some(dir) = path.parent() else {
            return;
        };
        let Ok(mut state) = self.watch.lock() else {
            return;
        };

        if state.dirs.contains(dir) {
            return;
        }

        match watch_dir(dir, self.reload_tx.clone()) {
            Ok(watcher) => {
                state.watchers.push(watcher);
                state.dirs.insert(dir.to_path_buf());
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    dir = ?dir,
                    "Failed to start config watcher, hot reload disabled for this file"
                );
            }
        }
    }
}

/// Resolve the requested path to the absolute cache key.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    let raw = match path {
        Some(p) => p.to_path_buf(),
        None => env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
    };

    match std::fs::canonicalize(&raw) {
        Ok(p) => p,
        Err(_) if raw.is_absolute() => raw,
        Err(_) => env::current_dir().map(|d| d.join(&raw)).unwrap_or(raw),
    }
}
