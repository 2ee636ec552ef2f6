use super::{GenerationRequest, LlmClient, LlmResponse};
use crate::errors::EvalError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info_span, Instrument};

/// Wraps a client in a `gen_ai.client.request` span per call.
pub struct TracingLlmClient {
    inner: Arc<dyn LlmClient>,
    role: &'static str,
}

impl TracingLlmClient {
    /// `role` tags the span, e.g. "candidate" or "judge".
    pub fn new(inner: Arc<dyn LlmClient>, role: &'static str) -> Self {
        Self { inner, role }
    }
}

#[async_trait]
impl LlmClient for TracingLlmClient {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<LlmResponse, EvalError> {
        let span = info_span!(
            "gen_ai.client.request",
            "gen_ai.system" = self.inner.provider_name(),
            "gen_ai.request.model" = request.model.model.as_str(),
            "arbiter.role" = self.role,
            "gen_ai.response.model" = tracing::field::Empty,
            "arbiter.latency_ms" = tracing::field::Empty,
            "error" = tracing::field::Empty,
            "error.kind" = tracing::field::Empty,
            "error.message" = tracing::field::Empty
        );

        async move {
            let result = self.inner.generate(request).await;
            let span = tracing::Span::current();
            match &result {
                Ok(resp) => {
                    span.record("gen_ai.response.model", resp.model.as_str());
                    span.record("arbiter.latency_ms", resp.latency_ms);
                }
                Err(e) => {
                    span.record("error", true);
                    span.record("error.kind", e.kind().as_str());
                    span.record("error.message", e.to_string().as_str());
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn supports_model(&self, model: &str) -> bool {
        self.inner.supports_model(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelSpec;
    use crate::providers::llm::fake::FakeClient;

    #[tokio::test]
    async fn passes_results_through_unchanged() {
        let fake = Arc::new(
            FakeClient::new()
                .with_script([Err(EvalError::provider("fake", "down"))])
                .with_response("ok")
                .with_allowed_models(["gpt-4o"]),
        );
        let client = TracingLlmClient::new(fake, "candidate");
        let spec = ModelSpec::new("gpt-4o");
        let req = GenerationRequest {
            system: "",
            user: "hi",
            model: &spec,
        };
        assert!(client.generate(&req).await.is_err());
        assert_eq!(client.generate(&req).await.unwrap().text, "ok");
        assert_eq!(client.provider_name(), "fake");
        assert!(!client.supports_model("o3"));
    }
}
