use super::{GenerationRequest, LlmClient, LlmResponse};
use crate::errors::EvalError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A request as the fake client saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub model: String,
}

/// Scripted client for tests and offline runs.
///
/// Responses are served FIFO from the script; once it is empty the fallback
/// text is returned, or a provider error when there is none.
#[derive(Default)]
pub struct FakeClient {
    script: Mutex<VecDeque<Result<String, EvalError>>>,
    fallback: Option<String>,
    latency_ms: u64,
    delay: Option<Duration>,
    allowed_models: Option<Vec<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    pub fn with_script<I>(mut self, script: I) -> Self
    where
        I: IntoIterator<Item = Result<String, EvalError>>,
    {
        if let Ok(queue) = self.script.get_mut() {
            queue.extend(script);
        }
        self
    }

    /// Reported latency. Does not sleep; see [`FakeClient::with_delay`].
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_allowed_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn next_scripted(&self) -> Option<Result<String, EvalError>> {
        self.script.lock().ok().and_then(|mut q| q.pop_front())
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<LlmResponse, EvalError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                system: request.system.to_string(),
                user: request.user.to_string(),
                model: request.model.model.clone(),
            });
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let text = match self.next_scripted() {
            Some(result) => result?,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| EvalError::provider("fake", "fake script exhausted"))?,
        };

        Ok(LlmResponse {
            text,
            model: request.model.model.clone(),
            latency_ms: self.latency_ms,
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn supports_model(&self, model: &str) -> bool {
        self.allowed_models
            .as_ref()
            .map_or(true, |allowed| allowed.iter().any(|m| m == model))
    }
}
