//! Configuration file loading.
//!
//! The file format is one `key = value` pair per line. Blank lines, lines
//! shorter than four characters and lines starting with `#` are skipped.
//! Any other line that does not parse, names an unknown key or carries an
//! uncoercible value rejects the whole file; a partial configuration is
//! never applied.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{MailConfig, ValueError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure reading an existing configuration file.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A non-comment line that does not match `key = value`.
    #[error("{}:{line}: malformed configuration line", path.display())]
    MalformedLine { path: PathBuf, line: usize },

    /// A key that is not in the schema.
    #[error("{}:{line}: unknown key '{key}'", path.display())]
    UnknownKey {
        path: PathBuf,
        line: usize,
        key: String,
    },

    /// A value that cannot be coerced to the key's declared type.
    #[error("{}:{line}: wrong type for '{key}', expected {expected}", path.display())]
    WrongType {
        path: PathBuf,
        line: usize,
        key: String,
        expected: &'static str,
    },
}

/// Load a configuration file, overlaying schema defaults.
pub fn load_config(path: &Path) -> Result<MailConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

pub(crate) fn parse_config(content: &str, path: &Path) -> Result<MailConfig, ConfigError> {
    let mut config = MailConfig::default();

    for (index, line) in content.lines().enumerate() {
        let lineno = index + 1;
        if line.trim().is_empty() || line.len() < 4 || line.starts_with('#') {
            continue;
        }

        let (key, value) = split_line(line).ok_or_else(|| ConfigError::MalformedLine {
            path: path.to_path_buf(),
            line: lineno,
        })?;

        config.set(key, value).map_err(|e| match e {
            ValueError::UnknownKey => ConfigError::UnknownKey {
                path: path.to_path_buf(),
                line: lineno,
                key: key.to_string(),
            },
            ValueError::WrongType { expected } => ConfigError::WrongType {
                path: path.to_path_buf(),
                line: lineno,
                key: key.to_string(),
                expected,
            },
        })?;
    }

    Ok(config)
}

/// Split a line into key and value per `[ \t]*([a-z_-]+)[ \t]*=[ \t]*(value)`.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start_matches([' ', '\t']);
    let key_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_lowercase() || *b == b'_' || *b == b'-')
        .count();
    if key_len == 0 {
        return None;
    }
    let (key, after) = rest.split_at(key_len);
    let after = after.trim_start_matches([' ', '\t']);
    let value = after.strip_prefix('=')?;
    Some((key, value.trim_start_matches([' ', '\t']).trim_end()))
}
