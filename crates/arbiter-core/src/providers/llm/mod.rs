use crate::errors::EvalError;
use crate::model::ModelSpec;
use async_trait::async_trait;

pub mod fake;
pub mod openai;
pub mod retry;
pub mod tracing;

/// One chat request: a system prompt, a user prompt and the model to use.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub model: &'a ModelSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    /// Model id reported by the provider, or the requested one.
    pub model: String,
    /// Wall time from issuing the request to reading the full response.
    pub latency_ms: u64,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<LlmResponse, EvalError>;

    fn provider_name(&self) -> &'static str;

    /// Whether the provider is expected to serve `model`. Checked before a run starts.
    fn supports_model(&self, _model: &str) -> bool {
        true
    }
}
