//! End-to-end lookup protocol tests against a mock document store.

mod common;

use common::{lookup, start_mapper, start_mock_store};

async fn mapper_with_store_rows(
    rows: &'static str,
) -> (std::net::SocketAddr, tempfile::NamedTempFile) {
    let store = start_mock_store(move |method, path| {
        assert_eq!(method, "GET");
        assert!(
            path.starts_with("/users/_design/users/_view/aliases"),
            "unexpected store path: {path}"
        );
        (200, format!(r#"{{"total_rows":1,"offset":0,"rows":{rows}}}"#))
    })
    .await;

    let config = format!("store_host = 127.0.0.1\nstore_port = {}\n", store.port());
    start_mapper(&config).await
}

#[tokio::test]
async fn resolves_known_alias() {
    let (addr, _file) =
        mapper_with_store_rows(r#"[{"id":"u1","key":"john@example.com","value":"mbox_42"}]"#).await;
    let response = lookup(addr, "get john%40example.com").await;
    assert_eq!(response, "200 mbox_42\n");
}

#[tokio::test]
async fn unknown_alias() {
    let (addr, _file) = mapper_with_store_rows("[]").await;
    let response = lookup(addr, "get nobody%40example.com").await;
    assert_eq!(response, "500 Alias unknown\n");
}

#[tokio::test]
async fn ambiguous_alias_is_unknown() {
    let (addr, _file) = mapper_with_store_rows(
        r#"[{"key":"dup@example.com","value":"a"},{"key":"dup@example.com","value":"b"}]"#,
    )
    .await;
    let response = lookup(addr, "get dup%40example.com").await;
    assert_eq!(response, "500 Alias unknown\n");
}

#[tokio::test]
async fn unsupported_verb() {
    let (addr, _file) = mapper_with_store_rows("[]").await;
    let response = lookup(addr, "put foo").await;
    assert_eq!(response, "400 Not implemented.\n");
}

#[tokio::test]
async fn invalid_escape_sequence() {
    let (addr, _file) = mapper_with_store_rows("[]").await;
    let response = lookup(addr, "get bad%zz").await;
    assert_eq!(response, "500 Invalid escape sequence\n");
}

#[tokio::test]
async fn bare_verb_is_malformed() {
    let (addr, _file) = mapper_with_store_rows("[]").await;
    let response = lookup(addr, "get").await;
    assert_eq!(response, "400 Malformed request\n");
}

#[tokio::test]
async fn store_missing_view_is_unavailable() {
    let store = start_mock_store(|_, _| (404, r#"{"error":"not_found"}"#.to_string())).await;
    let config = format!("store_host = 127.0.0.1\nstore_port = {}\n", store.port());
    let (addr, _file) = start_mapper(&config).await;

    let response = lookup(addr, "get john%40example.com").await;
    assert_eq!(response, "500 Lookup store unavailable\n");
}

#[tokio::test]
async fn unreachable_store_is_unavailable() {
    // Nothing listens on this port.
    let config = "store_host = 127.0.0.1\nstore_port = 1\n".to_string();
    let (addr, _file) = start_mapper(&config).await;

    let response = lookup(addr, "get john%40example.com").await;
    assert_eq!(response, "500 Lookup store unavailable\n");
}

#[tokio::test]
async fn virtual_domain_answers_for_itself() {
    // No store is needed; the domain list answers before any lookup.
    let config = "store_host = 127.0.0.1\nstore_port = 1\nvirtual_domains = mail.example.org\n";
    let (addr, _file) = start_mapper(config).await;

    let response = lookup(addr, "get mail.example.org").await;
    assert_eq!(response, "200 mail.example.org\n");
}

#[tokio::test]
async fn plain_key_outside_domains_goes_to_store() {
    let (addr, _file) = mapper_with_store_rows(r#"[{"key":"shortname","value":"mbox_7"}]"#).await;
    let response = lookup(addr, "get shortname").await;
    assert_eq!(response, "200 mbox_7\n");
}
