use crate::cli::args::{ProviderKind, RunArgs};
use arbiter_core::candidate::CandidateCaller;
use arbiter_core::config::EvalSuite;
use arbiter_core::engine::Runner;
use arbiter_core::judge::{JudgeConfig, JudgeService};
use arbiter_core::providers::llm::fake::FakeClient;
use arbiter_core::providers::llm::openai::OpenAIClient;
use arbiter_core::providers::llm::retry::{RetryPolicy, RetryingClient};
use arbiter_core::providers::llm::tracing::TracingLlmClient;
use arbiter_core::providers::llm::LlmClient;
use arbiter_core::EvalError;
use std::sync::Arc;
use std::time::Duration;

const FAKE_CANDIDATE_TEXT: &str = "Day 1\n09:00 Royal Botanic Garden\n19:30 Dinner at Quay\n\n\
Day 2\n08:30 Bondi to Coogee coastal walk\n19:00 Dinner at Icebergs\n\n\
(offline response from the fake provider)";

fn fake_judge_text(suite: &EvalSuite) -> String {
    let mid = (suite.judge.score_min + suite.judge.score_max) / 2.0;
    format!("SCORE: {mid}\nREASONING: Offline fake judge; no model was called.")
}

fn wrap(client: Arc<dyn LlmClient>, role: &'static str, policy: RetryPolicy) -> Arc<dyn LlmClient> {
    let client: Arc<dyn LlmClient> = if policy.max_attempts > 1 {
        Arc::new(RetryingClient::new(client, policy))
    } else {
        client
    };
    Arc::new(TracingLlmClient::new(client, role))
}

pub(crate) fn build_runner(suite: &EvalSuite, args: &RunArgs) -> Result<Runner, EvalError> {
    let timeout = Duration::from_secs(suite.settings.timeout_seconds);
    let policy = RetryPolicy::from(&suite.settings.retry);

    let (candidate, judge, call_timeout): (Arc<dyn LlmClient>, Arc<dyn LlmClient>, _) =
        match args.provider {
            ProviderKind::Openai => {
                let key = args
                    .api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| {
                        EvalError::config("no API key: set OPENAI_API_KEY or pass --api-key")
                    })?;
                let mut client = OpenAIClient::new(key)
                    .with_timeout(timeout)
                    .allow_any_model(args.allow_any_model);
                if let Some(url) = &args.base_url {
                    client = client.with_base_url(url.as_str());
                }
                let client: Arc<dyn LlmClient> = Arc::new(client);
                // The client enforces the timeout per attempt.
                (client.clone(), client, None)
            }
            ProviderKind::Fake => (
                Arc::new(FakeClient::new().with_response(FAKE_CANDIDATE_TEXT)) as Arc<dyn LlmClient>,
                Arc::new(FakeClient::new().with_response(fake_judge_text(suite))) as Arc<dyn LlmClient>,
                Some(timeout),
            ),
        };

    let mut runner = Runner::new(
        CandidateCaller::new(wrap(candidate, "candidate", policy), suite.candidate.clone()),
        JudgeService::new(JudgeConfig::from_suite(suite), wrap(judge, "judge", policy)),
    );
    if let Some(t) = call_timeout {
        runner = runner.with_call_timeout(t);
    }
    Ok(runner)
}
