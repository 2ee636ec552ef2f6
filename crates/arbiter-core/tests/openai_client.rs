use arbiter_core::errors::ErrorKind;
use arbiter_core::model::ModelSpec;
use arbiter_core::providers::llm::openai::OpenAIClient;
use arbiter_core::providers::llm::{GenerationRequest, LlmClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn spec() -> ModelSpec {
    ModelSpec {
        model: "gpt-4o".into(),
        temperature: Some(1.0),
        top_p: None,
        max_tokens: Some(256),
    }
}

async fn generate(client: &OpenAIClient) -> Result<String, arbiter_core::EvalError> {
    let spec = spec();
    client
        .generate(&GenerationRequest {
            system: "You plan trips.",
            user: "Plan Sydney",
            model: &spec,
        })
        .await
        .map(|r| r.text)
}

#[tokio::test]
async fn sends_chat_request_and_reads_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "max_tokens": 256,
            "messages": [
                { "role": "system", "content": "You plan trips." },
                { "role": "user", "content": "Plan Sydney" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o-2024-08-06",
            "choices": [{ "message": { "role": "assistant", "content": "Day 1: Opera House" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
    let spec = spec();
    let resp = client
        .generate(&GenerationRequest {
            system: "You plan trips.",
            user: "Plan Sydney",
            model: &spec,
        })
        .await
        .unwrap();
    assert_eq!(resp.text, "Day 1: Opera House");
    assert_eq!(resp.model, "gpt-4o-2024-08-06");
}

#[tokio::test]
async fn unauthorized_is_non_retryable_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "code": "invalid_api_key" }
        })))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("bad").with_base_url(server.uri());
    let err = generate(&client).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Provider);
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("Incorrect API key"));
}

#[tokio::test]
async fn missing_model_maps_to_model_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "message": "The model `gpt-4o` does not exist", "code": "model_not_found" }
        })))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
    let err = generate(&client).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
}

#[tokio::test]
async fn server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
    let err = generate(&client).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Provider);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn response_without_content_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
    let err = generate(&client).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Provider);
    assert!(err.to_string().contains("missing message content"));
}

#[tokio::test]
async fn slow_response_times_out_as_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test")
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let err = generate(&client).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Provider);
    assert!(err.is_retryable());
    assert!(err.to_string().contains("timed out"));
}
