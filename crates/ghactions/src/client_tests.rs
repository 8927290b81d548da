//! Tests for API client construction.

use super::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Verify that the client configuration follows the runner context.
#[test]
fn test_client_config_from_context() {
    let context = ActionContext {
        token: Some("ghs_secret".to_string()),
        api_url: Some("https://ghe.example.com/api/v3".to_string()),
        ..Default::default()
    };

    let config = ClientConfig::from_context(&context);
    assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
    assert_eq!(config.token.as_deref(), Some("ghs_secret"));
    assert!(config.is_authenticated());

    let anonymous = ClientConfig::from_context(&ActionContext::default());
    assert_eq!(anonymous.api_url, DEFAULT_API_URL);
    assert!(!anonymous.is_authenticated());
}

/// Verify that an empty token counts as no token.
#[test]
fn test_empty_token_is_anonymous() {
    let config = ClientConfig::default().with_token("");
    assert!(!config.is_authenticated());
}

/// Verify that Debug output hides the token.
#[test]
fn test_client_config_debug_redacts_token() {
    let config = ClientConfig::default().with_token("ghs_secret");
    let debug = format!("{:?}", config);
    assert!(!debug.contains("ghs_secret"));
    assert!(debug.contains("<redacted>"));
}

/// Verify that an authenticated client sends the token as a bearer token.
#[tokio::test]
async fn test_authenticated_client_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer ghs_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octocat"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::default()
        .with_api_url(server.uri())
        .with_token("ghs_secret");
    let client = build_client(&config).unwrap();

    let user: serde_json::Value = client.get("/user", None::<&()>).await.unwrap();
    assert_eq!(user["login"], "octocat");
}

/// Verify that an anonymous client sends no Authorization header.
#[tokio::test]
async fn test_anonymous_client_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"zen": "Keep it logically awesome."})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::default().with_api_url(server.uri());
    let client = build_client(&config).unwrap();

    let _: serde_json::Value = client.get("/zen", None::<&()>).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

/// Verify that an invalid base URL is reported as a client error.
#[tokio::test]
async fn test_invalid_api_url_is_rejected() {
    let config = ClientConfig::default().with_api_url("not a uri with spaces");
    let result = build_client(&config);
    assert!(matches!(result, Err(ActionError::Client(_))));
}

/// Verify that building a client outside a Tokio runtime is an error, not a panic.
#[test]
fn test_build_client_requires_runtime() {
    let result = build_client(&ClientConfig::default());
    assert!(matches!(result, Err(ActionError::NoRuntime(_))));
}
