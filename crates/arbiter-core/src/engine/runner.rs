use crate::aggregate::ResultAggregator;
use crate::candidate::CandidateCaller;
use crate::config::EvalSuite;
use crate::errors::{ErrorNote, EvalError};
use crate::judge::JudgeService;
use crate::model::{FinalResult, InputRecord, PromptConfig, RunStatus};
use crate::report::progress::{ProgressEvent, ProgressSink};
use crate::template::PromptTemplate;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{error, info, warn};

/// How a run ended. Results live in the aggregator, not here.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub abort_reason: Option<EvalError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    pub fn completed(started_at: DateTime<Utc>) -> Self {
        Self {
            status: RunStatus::Completed,
            abort_reason: None,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn aborted(started_at: DateTime<Utc>, reason: EvalError) -> Self {
        Self {
            status: RunStatus::Aborted,
            abort_reason: Some(reason),
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn cancelled(started_at: DateTime<Utc>) -> Self {
        Self {
            status: RunStatus::Cancelled,
            abort_reason: None,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// One unit of work: an input rendered through one prompt variant.
#[derive(Debug, Clone)]
pub struct PlannedPair {
    pub run_no: u32,
    pub input: Arc<InputRecord>,
    pub prompt: Arc<PromptConfig>,
    template: Arc<PromptTemplate>,
}

/// Inputs in order, and for each input every prompt in order. `run_no` starts at 1.
pub fn plan_pairs(suite: &EvalSuite) -> Vec<PlannedPair> {
    let prompts: Vec<(Arc<PromptConfig>, Arc<PromptTemplate>)> = suite
        .prompts
        .iter()
        .map(|p| {
            (
                Arc::new(p.clone()),
                Arc::new(PromptTemplate::parse(&p.user_prompt)),
            )
        })
        .collect();

    let mut pairs = Vec::with_capacity(suite.pair_count());
    let mut run_no = 0u32;
    for input in &suite.inputs {
        let input = Arc::new(input.clone());
        for (prompt, template) in &prompts {
            run_no += 1;
            pairs.push(PlannedPair {
                run_no,
                input: input.clone(),
                prompt: prompt.clone(),
                template: template.clone(),
            });
        }
    }
    pairs
}

struct PairOutcome {
    result: FinalResult,
    /// Set when the failure stops the whole run.
    fatal: Option<EvalError>,
}

#[derive(Clone)]
pub struct Runner {
    candidate: Arc<CandidateCaller>,
    judge: Arc<JudgeService>,
    call_timeout: Option<Duration>,
}

impl Runner {
    pub fn new(candidate: CandidateCaller, judge: JudgeService) -> Self {
        Self {
            candidate: Arc::new(candidate),
            judge: Arc::new(judge),
            call_timeout: None,
        }
    }

    /// Upper bound for each provider call, on top of any client-side timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Rejects the run before any call if a requested model is not served.
    pub fn preflight(&self, suite: &EvalSuite) -> Result<(), EvalError> {
        for prompt in &suite.prompts {
            let model = self.candidate.model_for(prompt).model;
            if !self.candidate.supports_model(&model) {
                return Err(EvalError::model_unavailable(
                    self.candidate.provider_name(),
                    model,
                    format!("candidate model for `{}` is not offered", prompt.id),
                ));
            }
        }
        let judge_model = self.judge.model();
        if !self.judge.supports_model(judge_model) {
            return Err(EvalError::model_unavailable(
                self.judge.provider_name(),
                judge_model,
                "judge model is not offered",
            ));
        }
        Ok(())
    }

    /// Runs every pair of the suite and records each result in `results`.
    ///
    /// Per-pair failures are recorded and the run continues. A model becoming
    /// unavailable stops the run with status `aborted`. A duplicate result is
    /// returned as an error; whatever was recorded stays in `results`.
    pub async fn run(
        &self,
        suite: &EvalSuite,
        results: Arc<ResultAggregator>,
        progress: Option<ProgressSink>,
    ) -> Result<RunOutcome, EvalError> {
        self.preflight(suite)?;
        let started_at = Utc::now();
        let plan = plan_pairs(suite);
        let parallel = suite.settings.parallel.max(1);
        info!(
            pairs = plan.len(),
            inputs = suite.inputs.len(),
            prompts = suite.prompts.len(),
            parallel,
            "run started"
        );

        let abort = if parallel == 1 {
            self.run_sequential(plan, &results, progress.as_ref()).await?
        } else {
            self.run_parallel(plan, parallel, &results, progress.as_ref())
                .await?
        };

        let outcome = match abort {
            Some(reason) => {
                error!(error = %reason, recorded = results.len(), "run aborted");
                RunOutcome::aborted(started_at, reason)
            }
            None => RunOutcome::completed(started_at),
        };
        info!(status = %outcome.status, recorded = results.len(), "run finished");
        Ok(outcome)
    }

    async fn run_sequential(
        &self,
        plan: Vec<PlannedPair>,
        results: &ResultAggregator,
        progress: Option<&ProgressSink>,
    ) -> Result<Option<EvalError>, EvalError> {
        let total = plan.len();
        for pair in plan {
            let outcome = self.process_pair(&pair).await;
            record(results, outcome.result, total, progress)?;
            if let Some(fatal) = outcome.fatal {
                return Ok(Some(fatal));
            }
        }
        Ok(None)
    }

    async fn run_parallel(
        &self,
        plan: Vec<PlannedPair>,
        parallel: usize,
        results: &ResultAggregator,
        progress: Option<&ProgressSink>,
    ) -> Result<Option<EvalError>, EvalError> {
        let total = plan.len();
        let sem = Arc::new(Semaphore::new(parallel));
        let mut join_set = JoinSet::new();
        let mut in_flight: HashMap<task::Id, PlannedPair> = HashMap::new();
        let mut pending = plan.into_iter().peekable();

        loop {
            while pending.peek().is_some() {
                let Ok(permit) = sem.clone().try_acquire_owned() else {
                    break;
                };
                let Some(pair) = pending.next() else { break };
                let this = self.clone();
                let task_pair = pair.clone();
                let handle = join_set.spawn(async move {
                    let _permit = permit;
                    this.process_pair(&task_pair).await
                });
                in_flight.insert(handle.id(), pair);
            }

            let Some(joined) = join_set.join_next_with_id().await else {
                return Ok(None);
            };
            let outcome = match joined {
                Ok((id, outcome)) => {
                    in_flight.remove(&id);
                    outcome
                }
                Err(e) => {
                    error!(error = %e, "pair task failed");
                    match in_flight.remove(&e.id()) {
                        Some(pair) => failed(
                            self.base_result(&pair),
                            EvalError::Internal(format!("pair task failed: {e}")),
                        ),
                        None => continue,
                    }
                }
            };
            if let Err(dup) = record(results, outcome.result, total, progress) {
                join_set.abort_all();
                return Err(dup);
            }
            if let Some(fatal) = outcome.fatal {
                join_set.abort_all();
                drain(&mut join_set, results, total, progress).await;
                return Ok(Some(fatal));
            }
        }
    }

    async fn call<T, F>(&self, provider: &'static str, fut: F) -> Result<T, EvalError>
    where
        F: Future<Output = Result<T, EvalError>>,
    {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
                Err(EvalError::transport(
                    provider,
                    format!("call exceeded {}s", limit.as_secs()),
                ))
            }),
            None => fut.await,
        }
    }

    fn base_result(&self, pair: &PlannedPair) -> FinalResult {
        let prompt = &pair.prompt;
        FinalResult {
            run_no: pair.run_no,
            input_id: pair.input.id().to_string(),
            config_id: prompt.id.clone(),
            config_type: prompt.kind.clone(),
            candidate_model: self.candidate.model_for(prompt).model,
            judge_model: self.judge.model().to_string(),
            rendered_prompt: None,
            generated_text: None,
            score: None,
            feedback: None,
            criteria: Vec::new(),
            latency_ms: None,
            error: None,
            created_at: Utc::now(),
        }
    }

    async fn process_pair(&self, pair: &PlannedPair) -> PairOutcome {
        let prompt = &pair.prompt;
        let mut result = self.base_result(pair);

        let rendered = match pair.template.render(&pair.input) {
            Ok(r) => r,
            Err(e) => return failed(result, e),
        };
        result.rendered_prompt = Some(rendered.clone());

        let output = match self
            .call(
                self.candidate.provider_name(),
                self.candidate.generate(prompt, rendered),
            )
            .await
        {
            Ok(o) => o,
            Err(e) => return failed(result, e),
        };
        result.generated_text = Some(output.text.clone());
        result.latency_ms = Some(output.latency_ms);

        match self
            .call(
                self.judge.provider_name(),
                self.judge.evaluate(&pair.input, &output),
            )
            .await
        {
            Ok(verdict) => {
                info!(
                    run_no = pair.run_no,
                    input_id = %result.input_id,
                    config_id = %result.config_id,
                    score = verdict.score,
                    latency_ms = output.latency_ms,
                    "pair scored"
                );
                result.score = Some(verdict.score);
                result.feedback = Some(verdict.feedback);
                result.criteria = verdict.criteria;
                PairOutcome {
                    result,
                    fatal: None,
                }
            }
            Err(e) => failed(result, e),
        }
    }
}

fn failed(mut result: FinalResult, err: EvalError) -> PairOutcome {
    warn!(
        run_no = result.run_no,
        input_id = %result.input_id,
        config_id = %result.config_id,
        kind = %err.kind(),
        error = %err,
        "pair failed"
    );
    result.error = Some(ErrorNote::from(&err));
    let fatal = err.aborts_run().then_some(err);
    PairOutcome { result, fatal }
}

fn record(
    results: &ResultAggregator,
    result: FinalResult,
    total: usize,
    progress: Option<&ProgressSink>,
) -> Result<(), EvalError> {
    let event = ProgressEvent {
        done: 0,
        total,
        run_no: result.run_no,
        input_id: result.input_id.clone(),
        config_id: result.config_id.clone(),
        score: result.score,
    };
    results.insert(result)?;
    if let Some(sink) = progress {
        sink(ProgressEvent {
            done: results.len(),
            ..event
        });
    }
    Ok(())
}

/// Collects pairs that finished before the abort took effect.
async fn drain(
    join_set: &mut JoinSet<PairOutcome>,
    results: &ResultAggregator,
    total: usize,
    progress: Option<&ProgressSink>,
) {
    while let Some(joined) = join_set.join_next().await {
        if let Ok(outcome) = joined {
            if let Err(e) = record(results, outcome.result, total, progress) {
                error!(error = %e, "dropping result while aborting");
            }
        }
    }
}
