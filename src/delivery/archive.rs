//! Raw message archival.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Write the raw message bytes into `dir` under a fresh unique name.
///
/// Returns the path written. The directory must already exist; a missing
/// archive directory is an operator error reported by the caller, not
/// something delivery creates on the fly.
pub fn archive_message(dir: &Path, raw: &[u8]) -> io::Result<PathBuf> {
    let path = dir.join(Uuid::new_v4().simple().to_string());
    std::fs::write(&path, raw)?;
    Ok(path)
}
