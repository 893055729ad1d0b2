//! Lookup protocol request parsing and response formatting.
//!
//! A request is `get <percent-escaped-key>`, read in a single buffer with
//! no line terminator required. Every response is one status line ending
//! in `\n`; the exact bytes live in `LookupResponse::to_line` so the wire
//! format has a single source of truth.

use thiserror::Error;

/// Per-connection protocol failures; each maps to one response line.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer than two space-separated tokens.
    #[error("malformed request")]
    Malformed,

    /// A verb other than `get`.
    #[error("unsupported command")]
    NotImplemented,

    /// A truncated or non-hex percent escape.
    #[error("invalid escape sequence")]
    InvalidEscape,
}

/// The one status line written back before the connection closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    Found(String),
    Malformed,
    NotImplemented,
    InvalidEscape,
    AliasUnknown,
    StoreUnavailable,
}

impl LookupResponse {
    pub fn to_line(&self) -> String {
        match self {
            LookupResponse::Found(value) => format!("200 {value}\n"),
            LookupResponse::Malformed => "400 Malformed request\n".to_string(),
            LookupResponse::NotImplemented => "400 Not implemented.\n".to_string(),
            LookupResponse::InvalidEscape => "500 Invalid escape sequence\n".to_string(),
            LookupResponse::AliasUnknown => "500 Alias unknown\n".to_string(),
            LookupResponse::StoreUnavailable => "500 Lookup store unavailable\n".to_string(),
        }
    }
}

impl From<ProtocolError> for LookupResponse {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::Malformed => LookupResponse::Malformed,
            ProtocolError::NotImplemented => LookupResponse::NotImplemented,
            ProtocolError::InvalidEscape => LookupResponse::InvalidEscape,
        }
    }
}

/// Parse a raw request buffer into the decoded lookup key.
pub fn parse_request(raw: &[u8]) -> Result<String, ProtocolError> {
    let text = String::from_utf8_lossy(raw);
    let parts: Vec<&str> = text.split(' ').map(str::trim).collect();

    if parts.len() < 2 {
        return Err(ProtocolError::Malformed);
    }
    if parts[0] != "get" {
        return Err(ProtocolError::NotImplemented);
    }

    let decoded = percent_decode(parts[1])?;
    // Keys are addresses; the store API is string-keyed.
    String::from_utf8(decoded).map_err(|_| ProtocolError::InvalidEscape)
}

/// Decode `%XX` escapes byte-wise; all other characters pass through.
pub fn percent_decode(input: &str) -> Result<Vec<u8>, ProtocolError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .ok_or(ProtocolError::InvalidEscape)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return Err(ProtocolError::InvalidEscape);
            }
            let hex = std::str::from_utf8(hex).map_err(|_| ProtocolError::InvalidEscape)?;
            let value =
                u8::from_str_radix(hex, 16).map_err(|_| ProtocolError::InvalidEscape)?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    Ok(out)
}

/// Escape every byte outside `[A-Za-z0-9]` as `%XX`.
pub fn percent_encode(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());
    for &byte in input {
        if byte.is_ascii_alphanumeric() {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_escaped_address() {
        assert_eq!(
            percent_decode("john%40example.com").unwrap(),
            b"john@example.com".to_vec()
        );
    }

    #[test]
    fn literal_characters_pass_through() {
        assert_eq!(percent_decode("plain").unwrap(), b"plain".to_vec());
    }

    #[test]
    fn lowercase_hex_accepted() {
        assert_eq!(percent_decode("%2f").unwrap(), b"/".to_vec());
        assert_eq!(percent_decode("%2F").unwrap(), b"/".to_vec());
    }

    #[test]
    fn non_hex_escape_rejected() {
        assert_eq!(percent_decode("bad%zz"), Err(ProtocolError::InvalidEscape));
    }

    #[test]
    fn truncated_escape_rejected() {
        assert_eq!(percent_decode("bad%"), Err(ProtocolError::InvalidEscape));
        assert_eq!(percent_decode("bad%4"), Err(ProtocolError::InvalidEscape));
    }

    #[test]
    fn encode_decode_round_trips_all_bytes() {
        let every_byte: Vec<u8> = (0u8..=255).collect();
        let encoded = percent_encode(&every_byte);
        assert_eq!(percent_decode(&encoded).unwrap(), every_byte);
    }

    #[test]
    fn parse_get_request() {
        assert_eq!(
            parse_request(b"get john%40example.com").unwrap(),
            "john@example.com"
        );
    }

    #[test]
    fn parse_trims_trailing_newline() {
        assert_eq!(
            parse_request(b"get john%40example.com\r\n").unwrap(),
            "john@example.com"
        );
    }

    #[test]
    fn unsupported_verb() {
        assert_eq!(parse_request(b"put foo"), Err(ProtocolError::NotImplemented));
    }

    #[test]
    fn missing_argument_is_malformed() {
        assert_eq!(parse_request(b"get"), Err(ProtocolError::Malformed));
        assert_eq!(parse_request(b""), Err(ProtocolError::Malformed));
    }

    #[test]
    fn response_lines_are_exact() {
        assert_eq!(
            LookupResponse::Found("mbox_42".into()).to_line(),
            "200 mbox_42\n"
        );
        assert_eq!(LookupResponse::Malformed.to_line(), "400 Malformed request\n");
        assert_eq!(
            LookupResponse::NotImplemented.to_line(),
            "400 Not implemented.\n"
        );
        assert_eq!(
            LookupResponse::InvalidEscape.to_line(),
            "500 Invalid escape sequence\n"
        );
        assert_eq!(LookupResponse::AliasUnknown.to_line(), "500 Alias unknown\n");
        assert_eq!(
            LookupResponse::StoreUnavailable.to_line(),
            "500 Lookup store unavailable\n"
        );
    }
}
