//! Message to store document conversion.

use mail_parser::{HeaderValue, MessageParser, PartType};
use serde_json::{json, Map, Value};

/// Convert a raw RFC 5322 message into a mailbox document.
///
/// Header names are lowercased and flattened to display text. The
/// `payload` field is a list with one `{content-type, payload}` entry
/// per `text/plain` or `text/html` part, in message order; other part
/// types are skipped. Returns `None` when the bytes cannot be parsed as
/// a message.
pub fn build_document(raw: &[u8]) -> Option<Value> {
    let message = MessageParser::default().parse(raw)?;

    let mut doc = Map::new();
    for header in message.headers() {
        doc.insert(
            header.name().to_lowercase(),
            Value::String(header_text(&header.value)),
        );
    }

    let mut payload = Vec::new();
    for part in &message.parts {
        match &part.body {
            PartType::Text(text) => payload.push(json!({
                "content-type": "text/plain",
                "payload": text.as_ref(),
            })),
            PartType::Html(html) => payload.push(json!({
                "content-type": "text/html",
                "payload": html.as_ref(),
            })),
            _ => {}
        }
    }

    doc.insert("payload".to_string(), Value::Array(payload));
    doc.insert("mailbox".to_string(), json!("inbox"));
    doc.insert("tags".to_string(), json!([]));

    Some(Value::Object(doc))
}

/// Flatten one structured header value to display text.
fn header_text(value: &HeaderValue) -> String {
    match value {
        HeaderValue::Text(text) => text.to_string(),
        HeaderValue::TextList(list) => list.join(", "),
        HeaderValue::Address(address) => address
            .iter()
            .filter_map(|a| a.address.as_ref().map(|a| a.to_string()))
            .collect::<Vec<_>>()
            .join(", "),
        HeaderValue::DateTime(dt) => dt.to_rfc3339(),
        HeaderValue::ContentType(ct) => match ct.subtype() {
            Some(subtype) => format!("{}/{}", ct.ctype(), subtype).to_lowercase(),
            None => ct.ctype().to_lowercase(),
        },
        _ => String::new(),
    }
}
