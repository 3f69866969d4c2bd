//! End-to-end tests: HTTP runtime wired to the real vision client, with the
//! provider's chat completions API mocked.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use verisnap_workspace::{AnalysisRuntime, RuntimeConfigBuilder};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "verisnap-e2e-boundary";

fn upload(uri: &str, mime: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"item.jpg\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn runtime_against(server: &MockServer) -> AnalysisRuntime {
    let config = RuntimeConfigBuilder::new()
        .api_key("sk-e2e")
        .base_url(format!("{}/v1", server.uri()))
        .demo_delay_ms(0)
        .build()
        .unwrap();
    AnalysisRuntime::from_config(config).unwrap()
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_structured_answer_flows_through_to_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Here you go:\n```json\n{\"prediction\":\"Fake Product\",\"confidence\":91,\"reasoning\":\"Misspelled logo\",\"details\":{\"visualCues\":[\"Logo\"],\"riskFactors\":[\"Spelling\"],\"authenticity_score\":9}}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let app = runtime_against(&server).await.router();
    let response = app
        .oneshot(upload("/api/analyze", "image/jpeg", &[0xFF, 0xD8, 0xFF]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["prediction"], "Fake Product");
    assert_eq!(body["confidence"], 91);
    assert_eq!(body["reasoning"], "Misspelled logo");
    assert_eq!(body["details"]["riskFactors"], json!(["Spelling"]));
    assert_eq!(body["details"]["authenticity_score"], 9);
}

#[tokio::test]
async fn test_prose_answer_uses_keyword_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "This looks like a FAKE handbag with uneven stitching.",
        )))
        .mount(&server)
        .await;

    let app = runtime_against(&server).await.router();
    let response = app
        .oneshot(upload("/api/analyze", "image/png", &[0x89, 0x50]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["prediction"], "Fake Product");
    assert_eq!(body["confidence"], 75);
    assert_eq!(
        body["reasoning"],
        "This looks like a FAKE handbag with uneven stitching."
    );
    assert_eq!(body["details"]["authenticity_score"], 25);
}

#[tokio::test]
async fn test_provider_rejecting_key_maps_to_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let app = runtime_against(&server).await.router();
    let response = app
        .oneshot(upload("/api/analyze", "image/jpeg", &[0xFF, 0xD8]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid OpenAI API key");
    assert_eq!(body["code"], "invalid_credential");
}

#[tokio::test]
async fn test_provider_quota_maps_to_429() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "You exceeded your current quota", "type": "insufficient_quota" }
        })))
        .mount(&server)
        .await;

    let app = runtime_against(&server).await.router();
    let response = app
        .oneshot(upload("/api/analyze", "image/jpeg", &[0xFF, 0xD8]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(response).await;
    assert_eq!(body["error"], "OpenAI API quota exceeded");
}

#[tokio::test]
async fn test_demo_endpoint_never_calls_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let app = runtime_against(&server).await.router();
    let response = app
        .oneshot(upload("/api/demo-analyze", "image/jpeg", &[0xFF, 0xD8]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let confidence = body["confidence"].as_u64().unwrap();
    assert!((70..=100).contains(&confidence));
}
