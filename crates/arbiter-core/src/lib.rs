//! Config-driven evaluation harness for LLM prompt variants.
//!
//! A run renders every prompt variant against every input record, sends the
//! rendered prompt to a candidate model, asks a judge model to score the
//! output, and collects one [`model::FinalResult`] per (input, variant) pair.
//!
//! ```no_run
//! use std::sync::Arc;
//! use arbiter_core::aggregate::ResultAggregator;
//! use arbiter_core::candidate::CandidateCaller;
//! use arbiter_core::engine::Runner;
//! use arbiter_core::judge::{JudgeConfig, JudgeService};
//! use arbiter_core::providers::llm::openai::OpenAIClient;
//!
//! # async fn example() -> Result<(), arbiter_core::errors::EvalError> {
//! let suite = arbiter_core::config::load_config("eval.yaml".as_ref())?;
//! let client = Arc::new(OpenAIClient::new("sk-..."));
//! let runner = Runner::new(
//!     CandidateCaller::new(client.clone(), suite.candidate.clone()),
//!     JudgeService::new(JudgeConfig::from_suite(&suite), client),
//! );
//! let results = Arc::new(ResultAggregator::new());
//! let outcome = runner.run(&suite, results.clone(), None).await?;
//! let doc = arbiter_core::report::build_document(&suite, &outcome, results.snapshot());
//! arbiter_core::report::json::write_json(&doc, "results.json".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod candidate;
pub mod config;
pub mod engine;
pub mod errors;
pub mod judge;
pub mod model;
pub mod providers;
pub mod report;
pub mod samples;
pub mod template;

pub use errors::{ErrorKind, EvalError};
