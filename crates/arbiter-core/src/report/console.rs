use crate::model::RunStatus;
use crate::report::progress::{ProgressEvent, ProgressSink};
use crate::report::summary::Stats;
use crate::report::ResultDocument;
use std::fmt::Write as _;
use std::sync::Arc;

#[must_use]
pub fn format_progress_line(ev: &ProgressEvent) -> String {
    let outcome = ev
        .score
        .map(|s| format!("score {s}"))
        .unwrap_or_else(|| "no score".into());
    format!(
        "Processing pair {}/{} (run {}: {} × {}): {}",
        ev.done, ev.total, ev.run_no, ev.input_id, ev.config_id, outcome
    )
}

/// Prints one stderr line per recorded pair. `None` for single-pair runs.
pub fn default_progress_sink(total: usize) -> Option<ProgressSink> {
    if total <= 1 {
        return None;
    }
    Some(Arc::new(|ev: ProgressEvent| {
        eprintln!("{}", format_progress_line(&ev));
    }))
}

fn cell(stats: Option<&Stats>, pick: fn(&Stats) -> f64, precision: usize) -> String {
    stats
        .map(|s| format!("{:.*}", precision, pick(s)))
        .unwrap_or_else(|| "—".into())
}

/// Per-variant table plus the run status line.
#[must_use]
pub fn format_summary(doc: &ResultDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>5} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>10}",
        "config", "pairs", "failed", "mean", "median", "q1", "q3", "max", "latency_ms"
    );
    for v in &doc.summary {
        let score = v.score.as_ref();
        let _ = writeln!(
            out,
            "{:<16} {:>5} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>10}",
            v.config_id,
            v.total,
            v.failed,
            cell(score, |s| s.mean, 2),
            cell(score, |s| s.median, 2),
            cell(score, |s| s.q1, 2),
            cell(score, |s| s.q3, 2),
            cell(score, |s| s.max, 2),
            cell(v.latency_ms.as_ref(), |s| s.median, 0),
        );
    }

    let failed = doc.failed_count();
    let _ = write!(
        out,
        "{} results, {} with errors, status {}",
        doc.results.len(),
        failed,
        doc.run.status
    );
    match (&doc.run.status, &doc.run.abort_reason) {
        (RunStatus::Aborted, Some(reason)) => {
            let _ = write!(out, " ({}: {})", reason.kind, reason.message);
        }
        (RunStatus::Cancelled, _) => out.push_str(" (interrupted)"),
        _ => {}
    }
    out.push('\n');
    out
}

pub fn print_summary(doc: &ResultDocument) {
    eprintln!();
    eprint!("{}", format_summary(doc));
}
