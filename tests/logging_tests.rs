//! Store-backed logger behavior against a mock document store.

mod common;

use std::io::Write;
use std::sync::{Arc, Mutex};

use common::start_mock_store;
use docmail::config::ConfigRegistry;
use docmail::logging::StoreLogger;
use docmail::store::http_client;

async fn logger_with_recording_store(
    config_extra: &str,
) -> (StoreLogger, Arc<Mutex<Vec<String>>>, tempfile::NamedTempFile) {
    let saves = Arc::new(Mutex::new(Vec::new()));
    let seen = saves.clone();
    let store = start_mock_store(move |method, path| {
        seen.lock().unwrap().push(format!("{method} {path}"));
        (201, r#"{"ok":true}"#.to_string())
    })
    .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "store_host = 127.0.0.1\nstore_port = {}\n{}",
        store.port(),
        config_extra
    )
    .unwrap();
    file.flush().unwrap();

    let registry = ConfigRegistry::new();
    let logger = StoreLogger::new(
        "mapper",
        registry,
        Some(file.path().to_path_buf()),
        http_client().unwrap(),
    );
    (logger, saves, file)
}

#[tokio::test]
async fn records_below_threshold_are_not_persisted() {
    // Default log_level is 3; notice (2) stays below it.
    let (logger, saves, _file) = logger_with_recording_store("").await;

    logger.notice("routine event").await;
    assert!(saves.lock().unwrap().is_empty());

    logger.warning("worth keeping").await;
    assert_eq!(*saves.lock().unwrap(), vec!["POST /logs".to_string()]);
}

#[tokio::test]
async fn debug_echo_does_not_persist_suppressed_records() {
    let (logger, saves, _file) = logger_with_recording_store("debug_echo = yes\n").await;

    // Echoed to stdout but still below the persistence threshold.
    logger.debug("echo only").await;
    assert!(saves.lock().unwrap().is_empty());

    logger.error("echoed and persisted").await;
    assert_eq!(*saves.lock().unwrap(), vec!["POST /logs".to_string()]);
}
