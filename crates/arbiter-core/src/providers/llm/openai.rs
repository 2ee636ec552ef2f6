use super::{GenerationRequest, LlmClient, LlmResponse};
use crate::errors::EvalError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat models this client expects to serve when `allow_any_model` is off.
pub const KNOWN_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4.1", "o3-mini", "o3"];

const PROVIDER: &str = "openai";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    allow_any_model: bool,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            allow_any_model: false,
            client: reqwest::Client::new(),
        }
    }

    /// Points the client at an OpenAI-compatible endpoint (proxy, gateway, mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn allow_any_model(mut self, allow: bool) -> Self {
        self.allow_any_model = allow;
        self
    }

    fn request_body(request: &GenerationRequest<'_>) -> Value {
        let mut messages = Vec::new();
        if !request.system.is_empty() {
            messages.push(json!({ "role": "system", "content": request.system }));
        }
        messages.push(json!({ "role": "user", "content": request.user }));

        let mut body = json!({
            "model": request.model.model,
            "messages": messages,
        });
        if let Some(t) = request.model.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(p) = request.model.top_p {
            body["top_p"] = json!(p);
        }
        if let Some(m) = request.model.max_tokens {
            body["max_tokens"] = json!(m);
        }
        body
    }
}

/// Maps a non-2xx chat response to the error taxonomy.
pub(crate) fn classify_http_error(model: &str, status: u16, body: &str) -> EvalError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/code"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let message = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(300).collect());

    if status == 404 || code == "model_not_found" {
        return EvalError::model_unavailable(PROVIDER, model, format!("HTTP {status}: {message}"));
    }
    match status {
        401 | 403 => EvalError::provider_status(
            PROVIDER,
            status,
            format!("authentication failed (HTTP {status}): {message}"),
        ),
        _ => EvalError::provider_status(
            PROVIDER,
            status,
            format!("chat API error (HTTP {status}): {message}"),
        ),
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<LlmResponse, EvalError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(request);

        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EvalError::transport(
                        PROVIDER,
                        format!("request timed out after {}s", self.timeout.as_secs()),
                    )
                } else {
                    EvalError::transport(PROVIDER, format!("request failed: {e}"))
                }
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| EvalError::transport(PROVIDER, format!("failed to read response: {e}")))?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if !status.is_success() {
            return Err(classify_http_error(
                &request.model.model,
                status.as_u16(),
                &text,
            ));
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| EvalError::provider(PROVIDER, format!("invalid JSON response: {e}")))?;
        let content = json
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| EvalError::provider(PROVIDER, "response missing message content"))?
            .to_string();
        let model = json
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or(&request.model.model)
            .to_string();

        Ok(LlmResponse {
            text: content,
            model,
            latency_ms,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn supports_model(&self, model: &str) -> bool {
        self.allow_any_model || KNOWN_MODELS.contains(&model)
    }
}
