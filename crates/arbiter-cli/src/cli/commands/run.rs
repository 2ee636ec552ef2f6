use super::print_error;
use super::runner_builder::build_runner;
use crate::cli::args::RunArgs;
use crate::exit_codes;
use arbiter_core::aggregate::ResultAggregator;
use arbiter_core::config;
use arbiter_core::engine::RunOutcome;
use arbiter_core::model::RunStatus;
use arbiter_core::report::{self, console, json};
use arbiter_core::ErrorKind;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let suite = match config::load_config(&args.config) {
        Ok(suite) => suite,
        Err(e) => {
            print_error(&e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let runner = match build_runner(&suite, &args) {
        Ok(runner) => runner,
        Err(e) => {
            print_error(&e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let results = Arc::new(ResultAggregator::new());
    let progress = console::default_progress_sink(suite.pair_count());
    let started_at = Utc::now();

    let outcome = tokio::select! {
        res = runner.run(&suite, results.clone(), progress) => match res {
            Ok(outcome) => outcome,
            // Preflight rejections happen before any pair runs.
            Err(e) if e.kind() != ErrorKind::DuplicateResult && results.is_empty() => {
                print_error(&e);
                return Ok(exit_codes::CONFIG_ERROR);
            }
            Err(e) => RunOutcome::aborted(started_at, e),
        },
        _ = tokio::signal::ctrl_c() => {
            warn!(recorded = results.len(), "interrupted; reporting recorded results");
            RunOutcome::cancelled(started_at)
        }
    };

    if let Some(reason) = &outcome.abort_reason {
        print_error(reason);
    }
    if outcome.status == RunStatus::Aborted && results.is_empty() {
        return Ok(exit_codes::RUN_FAILED);
    }

    let doc = report::build_document(&suite, &outcome, results.snapshot());
    let written = match &args.output {
        Some(path) => json::write_json(&doc, path).map(|()| {
            info!(path = %path.display(), results = doc.results.len(), "result document written");
        }),
        None => json::write_to(&doc, std::io::stdout().lock()),
    };
    console::print_summary(&doc);
    if let Err(e) = written {
        print_error(&e);
        return Ok(exit_codes::RUN_FAILED);
    }

    Ok(match outcome.status {
        RunStatus::Completed => exit_codes::SUCCESS,
        RunStatus::Aborted | RunStatus::Cancelled => exit_codes::RUN_FAILED,
    })
}
