//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Watch a directory and forward modify/create event paths to the
/// registry's reload channel.
///
/// The returned watcher must be kept alive for events to keep flowing;
/// the registry holds it for the lifetime of the process.
pub(crate) fn watch_dir(
    dir: &Path,
    tx: mpsc::UnboundedSender<PathBuf>,
) -> Result<RecommendedWatcher, notify::Error> {
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event.kind.is_modify() || event.kind.is_create() {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;

    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    tracing::info!(dir = ?dir, "Config watcher started");
    Ok(watcher)
}
