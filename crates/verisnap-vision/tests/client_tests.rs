//! Vision client tests against a mocked chat completions API

use serde_json::json;
use std::time::Duration;
use verisnap_core::{ProviderFailure, VisionProvider};
use verisnap_vision::{OpenAiConfig, OpenAiVisionClient, VisionError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiVisionClient {
    let config = OpenAiConfig::new("sk-test").with_base_url(format!("{}/v1", server.uri()));
    OpenAiVisionClient::new(config).expect("client should build")
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_sends_prompt_and_image_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "max_tokens": 1000,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text" },
                    { "type": "image_url", "image_url": { "url": "data:image/png;base64,iVBORw==" } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"prediction\":\"Real Product\"}")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client
        .analyze_image(&[0x89, 0x50, 0x4E, 0x47], "image/png")
        .await
        .expect("analysis should succeed");

    assert_eq!(text, "{\"prediction\":\"Real Product\"}");
}

#[tokio::test]
async fn test_unauthorized_is_classified_as_credential_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided: sk-test.",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .describe(b"img", "image/jpeg")
        .await
        .unwrap_err();

    assert!(matches!(err, VisionError::Unauthorized { .. }));
    assert_eq!(
        ProviderFailure::classify(&err.to_string()),
        ProviderFailure::InvalidCredential
    );
}

#[tokio::test]
async fn test_quota_and_rate_limit_responses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "You exceeded your current quota, please check your plan and billing details." }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let quota = client.analyze_image(b"img", "image/jpeg").await.unwrap_err();
    assert_eq!(quota.failure(), ProviderFailure::QuotaExceeded);

    let throttled = client.analyze_image(b"img", "image/jpeg").await.unwrap_err();
    assert_eq!(throttled.failure(), ProviderFailure::RateLimited);
}

#[tokio::test]
async fn test_server_error_keeps_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .describe(b"img", "image/jpeg")
        .await
        .unwrap_err();

    match err {
        VisionError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_content_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(
        client.describe(b"img", "image/jpeg").await,
        Err(VisionError::EmptyResponse)
    ));
    assert!(matches!(
        client.describe(b"img", "image/jpeg").await,
        Err(VisionError::EmptyResponse)
    ));
}

#[tokio::test]
async fn test_configured_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = OpenAiConfig::new("sk-test")
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(100));
    let client = OpenAiVisionClient::new(config).unwrap();

    let err = client.describe(b"img", "image/jpeg").await.unwrap_err();
    assert!(matches!(err, VisionError::Timeout { timeout_ms: 100 }));
}

#[tokio::test]
async fn test_connection_refused() {
    // Nothing listens on port 1 on a test host.
    let config = OpenAiConfig::new("sk-test").with_base_url("http://127.0.0.1:1/v1");
    let client = OpenAiVisionClient::new(config).unwrap();

    let err = client.describe(b"img", "image/jpeg").await.unwrap_err();
    assert!(matches!(err, VisionError::Connection(_)));
    assert_eq!(
        ProviderFailure::classify(&err.to_string()),
        ProviderFailure::Other
    );
}
