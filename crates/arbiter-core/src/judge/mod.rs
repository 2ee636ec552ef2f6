mod parse;
mod prompt;

pub use parse::parse_judge_response;

use crate::config::EvalSuite;
use crate::errors::EvalError;
use crate::model::{
    CandidateOutput, Criterion, CriterionScore, EvalMode, EvalResult, InputRecord, ModelSpec,
};
use crate::providers::llm::{GenerationRequest, LlmClient};
use crate::samples::DEFAULT_JUDGE_INSTRUCTIONS;
use crate::template::PromptTemplate;
use std::sync::Arc;
use tracing::debug;

/// Inclusive score range the judge must answer within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBounds {
    pub min: f64,
    pub max: f64,
}

impl ScoreBounds {
    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }
}

impl Default for ScoreBounds {
    fn default() -> Self {
        Self { min: 0.0, max: 10.0 }
    }
}

#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub model: ModelSpec,
    pub instructions: String,
    pub requirements: Option<String>,
    pub rubric: Vec<String>,
    pub criteria: Vec<Criterion>,
    pub bounds: ScoreBounds,
    pub mode: EvalMode,
}

impl JudgeConfig {
    pub fn from_suite(suite: &EvalSuite) -> Self {
        let judge = &suite.judge;
        Self {
            model: judge.model_spec(),
            instructions: judge
                .instructions
                .clone()
                .unwrap_or_else(|| DEFAULT_JUDGE_INSTRUCTIONS.to_string()),
            requirements: judge.requirements.clone(),
            rubric: judge.rubric.clone(),
            criteria: judge.criteria.clone(),
            bounds: ScoreBounds {
                min: judge.score_min,
                max: judge.score_max,
            },
            mode: suite.mode,
        }
    }
}

/// Scores candidate outputs with a second model.
#[derive(Clone)]
pub struct JudgeService {
    config: JudgeConfig,
    system_prompt: String,
    requirements: Option<PromptTemplate>,
    client: Arc<dyn LlmClient>,
}

impl JudgeService {
    pub fn new(config: JudgeConfig, client: Arc<dyn LlmClient>) -> Self {
        let system_prompt = format!(
            "{}\n\n{}",
            config.instructions.trim_end(),
            prompt::format_contract(config.bounds)
        );
        let requirements = config.requirements.as_deref().map(PromptTemplate::parse);
        Self {
            config,
            system_prompt,
            requirements,
            client,
        }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.config.model.model
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.client.supports_model(model)
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Scores one candidate output. Without criteria this is a single judge
    /// call; otherwise one call per criterion, combined by weight.
    ///
    /// Provider failures and unparseable replies surface as errors, and a
    /// failing criterion fails the whole verdict. No score is invented.
    pub async fn evaluate(
        &self,
        record: &InputRecord,
        output: &CandidateOutput,
    ) -> Result<EvalResult, EvalError> {
        if self.config.criteria.is_empty() {
            let result = self.ask(None, record, output).await?;
            debug!(input_id = record.id(), score = result.score, "judge scored output");
            return Ok(result);
        }

        let mut scores = Vec::with_capacity(self.config.criteria.len());
        for criterion in &self.config.criteria {
            let verdict = self
                .ask(Some(criterion), record, output)
                .await
                .map_err(|e| in_criterion(e, &criterion.name))?;
            debug!(
                input_id = record.id(),
                criterion = %criterion.name,
                score = verdict.score,
                "judge scored criterion"
            );
            scores.push(CriterionScore {
                name: criterion.name.clone(),
                weight: criterion.weight,
                score: verdict.score,
                feedback: verdict.feedback,
            });
        }

        let total_weight: f64 = scores.iter().map(|c| c.weight).sum();
        let score = scores.iter().map(|c| c.score * c.weight).sum::<f64>() / total_weight;
        let feedback = scores
            .iter()
            .map(|c| format!("{}: {}", c.name, c.feedback))
            .collect::<Vec<_>>()
            .join("\n");
        debug!(input_id = record.id(), score, "judge scored output");
        Ok(EvalResult {
            score,
            feedback,
            criteria: scores,
        })
    }

    async fn ask(
        &self,
        criterion: Option<&Criterion>,
        record: &InputRecord,
        output: &CandidateOutput,
    ) -> Result<EvalResult, EvalError> {
        let user = prompt::build_judge_prompt(
            self.config.mode,
            self.requirements.as_ref(),
            &self.config.rubric,
            criterion,
            record,
            output,
        )?;
        let resp = self
            .client
            .generate(&GenerationRequest {
                system: &self.system_prompt,
                user: &user,
                model: &self.config.model,
            })
            .await?;
        parse_judge_response(&resp.text, self.config.bounds)
    }
}

fn in_criterion(err: EvalError, name: &str) -> EvalError {
    match err {
        EvalError::JudgeParse { reason, raw } => EvalError::JudgeParse {
            reason: format!("criterion `{name}`: {reason}"),
            raw,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::providers::llm::fake::FakeClient;

    fn config() -> JudgeConfig {
        JudgeConfig {
            model: ModelSpec::new("o3-mini"),
            instructions: DEFAULT_JUDGE_INSTRUCTIONS.to_string(),
            requirements: Some("- Destination: {city}".to_string()),
            rubric: vec![],
            criteria: vec![],
            bounds: ScoreBounds::default(),
            mode: EvalMode::ReferenceFree,
        }
    }

    fn output() -> CandidateOutput {
        CandidateOutput {
            system_prompt: String::new(),
            rendered_prompt: "Plan Sydney".into(),
            text: "Day 1: Bondi".into(),
            latency_ms: 3,
            model: "gpt-4o".into(),
        }
    }

    #[tokio::test]
    async fn scores_output_with_instructions_as_system_prompt() {
        let fake = Arc::new(FakeClient::new().with_response("SCORE: 7\nREASONING: Solid plan."));
        let judge = JudgeService::new(config(), fake.clone());
        let record = InputRecord::new("one").with_field("city", "Sydney");

        let result = judge.evaluate(&record, &output()).await.unwrap();
        assert_eq!(result.score, 7.0);
        assert_eq!(result.feedback, "Solid plan.");

        let call = &fake.calls()[0];
        assert!(call.system.starts_with("You are an eval auto grader"));
        assert!(call.system.contains("between 0 and 10 inclusive"));
        assert!(call.user.contains("- Destination: Sydney"));
        assert!(call.user.contains("Day 1: Bondi"));
        assert_eq!(call.model, "o3-mini");
    }

    #[tokio::test]
    async fn unparseable_reply_is_judge_parse() {
        let fake = Arc::new(FakeClient::new().with_response("I liked it."));
        let judge = JudgeService::new(config(), fake);
        let record = InputRecord::new("one").with_field("city", "Sydney");
        let err = judge.evaluate(&record, &output()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::JudgeParse);
    }

    #[tokio::test]
    async fn criteria_are_scored_separately_and_combined_by_weight() {
        let fake = Arc::new(FakeClient::new().with_script([
            Ok("SCORE: 9\nREASONING: Relaxed.".to_string()),
            Ok("SCORE: 6\nREASONING: Over budget.".to_string()),
        ]));
        let mut cfg = config();
        cfg.criteria = vec![
            Criterion::new("pace", "Does the pace match?", 1.0),
            Criterion::new("budget", "Does it respect the budget?", 2.0),
        ];
        let judge = JudgeService::new(cfg, fake.clone());
        let record = InputRecord::new("one").with_field("city", "Sydney");

        let result = judge.evaluate(&record, &output()).await.unwrap();
        assert_eq!(result.score, 7.0);
        assert_eq!(result.feedback, "pace: Relaxed.\nbudget: Over budget.");
        let names: Vec<&str> = result.criteria.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["pace", "budget"]);
        assert_eq!(result.criteria[1].weight, 2.0);

        let calls = fake.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].user.contains("Criterion: pace"));
        assert!(calls[1].user.contains("Criterion: budget"));
    }

    #[tokio::test]
    async fn one_unparseable_criterion_fails_the_verdict() {
        let fake = Arc::new(FakeClient::new().with_script([
            Ok("SCORE: 9\nREASONING: fine".to_string()),
            Ok("no idea".to_string()),
        ]));
        let mut cfg = config();
        cfg.criteria = vec![
            Criterion::new("pace", "Pace?", 1.0),
            Criterion::new("budget", "Budget?", 1.0),
        ];
        let judge = JudgeService::new(cfg, fake);
        let record = InputRecord::new("one").with_field("city", "Sydney");

        let err = judge.evaluate(&record, &output()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::JudgeParse);
        assert!(err.to_string().contains("criterion `budget`"));
    }

    #[test]
    fn bounds_contain_endpoints() {
        let b = ScoreBounds::default();
        assert!(b.contains(0.0) && b.contains(10.0));
        assert!(!b.contains(10.01) && !b.contains(-0.01));
    }
}
