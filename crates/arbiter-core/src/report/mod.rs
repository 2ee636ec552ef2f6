pub mod console;
pub mod json;
pub mod progress;
pub mod summary;

use crate::config::EvalSuite;
use crate::engine::RunOutcome;
use crate::errors::ErrorNote;
use crate::model::{EvalMode, FinalResult, RunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use summary::VariantSummary;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub config_path: Option<String>,
    pub mode: EvalMode,
    pub candidate_model: String,
    pub judge_model: String,
    pub score_min: f64,
    pub score_max: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub abort_reason: Option<ErrorNote>,
}

/// The persisted run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub schema_version: u32,
    pub run: RunMetadata,
    pub summary: Vec<VariantSummary>,
    pub results: Vec<FinalResult>,
}

impl ResultDocument {
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }
}

pub fn build_document(
    suite: &EvalSuite,
    outcome: &RunOutcome,
    results: Vec<FinalResult>,
) -> ResultDocument {
    let run = RunMetadata {
        run_id: uuid::Uuid::new_v4().to_string(),
        config_path: suite
            .source_path
            .as_ref()
            .map(|p| p.display().to_string()),
        mode: suite.mode,
        candidate_model: suite.candidate.model.clone(),
        judge_model: suite.judge.model.clone(),
        score_min: suite.judge.score_min,
        score_max: suite.judge.score_max,
        started_at: outcome.started_at,
        finished_at: outcome.finished_at,
        status: outcome.status,
        abort_reason: outcome.abort_reason.as_ref().map(ErrorNote::from),
    };
    ResultDocument {
        schema_version: SCHEMA_VERSION,
        run,
        summary: summary::summarize(&results),
        results,
    }
}
