//! Tests for event payload helpers.

use super::*;
use octocrab::models::webhook_events::WebhookEventPayload;
use std::io::Write;
use tempfile::NamedTempFile;

/// Verify that pull_request_target is parsed with the pull_request shape.
#[test]
fn test_payload_name_maps_pull_request_target() {
    assert_eq!(payload_name(PULL_REQUEST_TARGET), PULL_REQUEST);
    assert_eq!(payload_name(PULL_REQUEST), PULL_REQUEST);
    assert_eq!(payload_name(ISSUES), ISSUES);
    assert_eq!(payload_name("bogus_type"), "bogus_type");
}

/// Verify that the payload file is read as-is.
#[tokio::test]
async fn test_read_payload_returns_file_contents() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"action":"started"}"#).unwrap();

    let bytes = read_payload(file.path()).await.unwrap();
    assert_eq!(bytes, br#"{"action":"started"}"#);
}

/// Verify that a missing payload file reports its path.
#[tokio::test]
async fn test_read_payload_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("event.json");

    let err = read_payload(&missing).await.unwrap_err();
    match &err {
        ActionError::Io { path, source } => {
            assert_eq!(path, &missing);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected Io error, got {:?}", other),
    }
    assert!(err.to_string().contains("event.json"));
}

/// Verify that a payload is parsed into the variant for its event name.
#[test]
fn test_parse_selects_payload_variant() {
    let watch = parse(WATCH, br#"{"action":"started"}"#).unwrap();
    assert!(matches!(watch.specific, WebhookEventPayload::Watch(_)));

    let public = parse(PUBLIC, b"{}").unwrap();
    assert!(matches!(public.specific, WebhookEventPayload::Public(_)));
}

/// Verify that invalid JSON is a parse error naming the event.
#[test]
fn test_parse_rejects_malformed_json() {
    let err = parse(ISSUES, b"{not json").unwrap_err();

    match &err {
        ActionError::Parse { event_name, .. } => assert_eq!(event_name, ISSUES),
        other => panic!("expected Parse error, got {:?}", other),
    }
    assert!(err.to_string().contains("\"issues\""));
}

/// Verify that parse errors keep the name the runner gave, not the payload name.
#[test]
fn test_parse_error_keeps_runner_event_name() {
    let err = parse(PULL_REQUEST_TARGET, b"[]").unwrap_err();
    assert_eq!(err.event_name(), Some(PULL_REQUEST_TARGET));
}

/// Verify that a summary picks out action, repository and sender.
#[test]
fn test_event_summary_from_payload() {
    let payload = serde_json::json!({
        "action": "opened",
        "repository": { "full_name": "octo-org/hello-world" },
        "sender": { "login": "octocat" }
    });
    let bytes = serde_json::to_vec(&payload).unwrap();

    let summary = EventSummary::from_payload(ISSUES, &bytes).unwrap();
    assert_eq!(summary.event_name, "issues");
    assert_eq!(summary.action.as_deref(), Some("opened"));
    assert_eq!(summary.repository.as_deref(), Some("octo-org/hello-world"));
    assert_eq!(summary.sender.as_deref(), Some("octocat"));
    assert_eq!(
        summary.to_string(),
        "issues (opened) in octo-org/hello-world by octocat"
    );
}

/// Verify that a summary of a bare payload holds only the event name.
#[test]
fn test_event_summary_without_common_fields() {
    let summary = EventSummary::from_payload(PUBLIC, b"{}").unwrap();
    assert_eq!(summary.action, None);
    assert_eq!(summary.repository, None);
    assert_eq!(summary.sender, None);
    assert_eq!(summary.to_string(), "public");
}

/// Verify that summarizing invalid JSON is a parse error.
#[test]
fn test_event_summary_rejects_invalid_json() {
    let err = EventSummary::from_payload(PUSH, b"").unwrap_err();
    assert!(matches!(err, ActionError::Parse { .. }));
}
