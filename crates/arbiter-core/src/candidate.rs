use crate::errors::EvalError;
use crate::model::{CandidateOutput, ModelSpec, PromptConfig};
use crate::providers::llm::{GenerationRequest, LlmClient};
use std::sync::Arc;
use tracing::debug;

/// Sends rendered prompts to the model under test.
#[derive(Clone)]
pub struct CandidateCaller {
    client: Arc<dyn LlmClient>,
    default_model: ModelSpec,
}

impl CandidateCaller {
    pub fn new(client: Arc<dyn LlmClient>, default_model: ModelSpec) -> Self {
        Self {
            client,
            default_model,
        }
    }

    /// The suite model, with the variant's model id override applied.
    pub fn model_for(&self, config: &PromptConfig) -> ModelSpec {
        match &config.model {
            Some(model) => ModelSpec {
                model: model.clone(),
                ..self.default_model.clone()
            },
            None => self.default_model.clone(),
        }
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.client.supports_model(model)
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// One provider call per invocation. Failures propagate unchanged.
    pub async fn generate(
        &self,
        config: &PromptConfig,
        rendered_prompt: String,
    ) -> Result<CandidateOutput, EvalError> {
        let model = self.model_for(config);
        let resp = self
            .client
            .generate(&GenerationRequest {
                system: &config.system_prompt,
                user: &rendered_prompt,
                model: &model,
            })
            .await?;
        debug!(
            config_id = %config.id,
            model = %resp.model,
            latency_ms = resp.latency_ms,
            "candidate responded"
        );
        Ok(CandidateOutput {
            system_prompt: config.system_prompt.clone(),
            rendered_prompt,
            text: resp.text,
            latency_ms: resp.latency_ms,
            model: model.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::llm::fake::FakeClient;

    fn prompt(model: Option<&str>) -> PromptConfig {
        PromptConfig {
            id: "config_a".into(),
            kind: "free-form".into(),
            system_prompt: "Plan trips.".into(),
            user_prompt: "unused".into(),
            model: model.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn sends_system_prompt_verbatim_and_keeps_rendered_prompt() {
        let fake = Arc::new(FakeClient::new().with_response("Day 1: ...").with_latency_ms(15));
        let caller = CandidateCaller::new(fake.clone(), ModelSpec::new("gpt-4o"));
        let out = caller
            .generate(&prompt(None), "Go to {not a field}".into())
            .await
            .unwrap();

        assert_eq!(out.text, "Day 1: ...");
        assert_eq!(out.latency_ms, 15);
        assert_eq!(out.rendered_prompt, "Go to {not a field}");
        assert_eq!(out.model, "gpt-4o");
        let calls = fake.calls();
        assert_eq!(calls[0].system, "Plan trips.");
        assert_eq!(calls[0].user, "Go to {not a field}");
    }

    #[tokio::test]
    async fn variant_model_override_keeps_sampling_params() {
        let fake = Arc::new(FakeClient::new().with_response("x"));
        let mut base = ModelSpec::new("gpt-4o");
        base.temperature = Some(0.2);
        let caller = CandidateCaller::new(fake.clone(), base);

        let spec = caller.model_for(&prompt(Some("gpt-4o-mini")));
        assert_eq!(spec.model, "gpt-4o-mini");
        assert_eq!(spec.temperature, Some(0.2));

        let out = caller.generate(&prompt(Some("gpt-4o-mini")), "hi".into()).await.unwrap();
        assert_eq!(out.model, "gpt-4o-mini");
        assert_eq!(fake.calls()[0].model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let fake = Arc::new(
            FakeClient::new().with_script([Err(EvalError::provider("fake", "connection refused"))]),
        );
        let caller = CandidateCaller::new(fake, ModelSpec::new("gpt-4o"));
        let err = caller.generate(&prompt(None), "hi".into()).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
