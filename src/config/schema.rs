//! Configuration schema definitions.
//!
//! The recognized option table is fixed: every option has a compile-time
//! type and default, and `MailConfig::set` is the single coercion point
//! from file text to typed value. Unknown keys and uncoercible values are
//! rejected there, which is what makes a bad file fail as a whole.

/// Configuration file name used when no path is given and the
/// environment does not provide one.
pub const DEFAULT_CONFIG_FILE: &str = "docmail.conf";

/// Environment variable consulted for the configuration file path.
pub const CONFIG_PATH_ENV: &str = "DOCMAIL_CONFIG";

/// One fully-resolved set of configuration values.
///
/// Instances are immutable once loaded; a reload produces a new instance
/// that replaces the cached one wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    /// Document store host.
    pub store_host: String,

    /// Document store port.
    pub store_port: u16,

    /// Collection holding user records and the alias view.
    pub users_collection: String,

    /// Collection holding session records.
    pub sessions_collection: String,

    /// Collection log records are persisted to.
    pub logs_collection: String,

    /// Minimum level (1-5) a log record must have to be persisted.
    pub log_level: u8,

    /// Echo every log record to stdout regardless of level.
    pub debug_echo: bool,

    /// Domains the mapper answers for itself, bypassing the alias view.
    pub virtual_domains: Vec<String>,

    /// Maximum accepted raw message size in bytes.
    pub max_message_size: u64,

    /// Directory raw messages are archived to; empty disables archival.
    pub archive_dir: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            store_host: "localhost".to_string(),
            store_port: 5984,
            users_collection: "users".to_string(),
            sessions_collection: "sessions".to_string(),
            logs_collection: "logs".to_string(),
            log_level: 3,
            debug_echo: false,
            virtual_domains: vec!["localhost".to_string()],
            max_message_size: 26_214_400,
            archive_dir: String::new(),
        }
    }
}

/// Why a single `key = value` assignment was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueError {
    UnknownKey,
    WrongType { expected: &'static str },
}

impl MailConfig {
    /// Apply one parsed `key = value` assignment.
    pub(crate) fn set(&mut self, key: &str, value: &str) -> Result<(), ValueError> {
        match key {
            "store_host" => self.store_host = value.to_string(),
            "store_port" => self.store_port = parse_int(value)?,
            "users_collection" => self.users_collection = value.to_string(),
            "sessions_collection" => self.sessions_collection = value.to_string(),
            "logs_collection" => self.logs_collection = value.to_string(),
            "log_level" => {
                let level: u8 = parse_int(value)?;
                if !(1..=5).contains(&level) {
                    return Err(ValueError::WrongType {
                        expected: "integer between 1 and 5",
                    });
                }
                self.log_level = level;
            }
            "debug_echo" => self.debug_echo = parse_bool(value)?,
            "virtual_domains" => self.virtual_domains = parse_list(value),
            "max_message_size" => self.max_message_size = parse_int(value)?,
            "archive_dir" => self.archive_dir = value.to_string(),
            _ => return Err(ValueError::UnknownKey),
        }
        Ok(())
    }
}

fn parse_int<T: std::str::FromStr>(value: &str) -> Result<T, ValueError> {
    value.trim().parse().map_err(|_| ValueError::WrongType {
        expected: "integer",
    })
}

fn parse_bool(value: &str) -> Result<bool, ValueError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ValueError::WrongType {
            expected: "boolean",
        }),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
