use crate::errors::EvalError;
use crate::report::ResultDocument;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes the document atomically: a temp file in the destination directory
/// is flushed, synced and renamed over `out`. Readers never observe a
/// partial file, and a failed write leaves any previous file untouched.
pub fn write_json(doc: &ResultDocument, out: &Path) -> Result<(), EvalError> {
    let dir = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| report_err(format!("failed to create {}: {e}", dir.display())))?;

    let body = serde_json::to_vec_pretty(doc)
        .map_err(|e| report_err(format!("failed to serialize results: {e}")))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| report_err(format!("failed to create temp file in {}: {e}", dir.display())))?;
    tmp.write_all(&body)
        .and_then(|()| tmp.write_all(b"\n"))
        .and_then(|()| tmp.flush())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| report_err(format!("failed to write results: {e}")))?;
    tmp.persist(out)
        .map_err(|e| report_err(format!("failed to move results to {}: {}", out.display(), e.error)))?;
    Ok(())
}

pub fn write_to<W: Write>(doc: &ResultDocument, mut writer: W) -> Result<(), EvalError> {
    serde_json::to_writer_pretty(&mut writer, doc)
        .map_err(|e| report_err(format!("failed to serialize results: {e}")))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| report_err(format!("failed to write results: {e}")))
}

pub fn read_json(path: &Path) -> Result<ResultDocument, EvalError> {
    let raw = std::fs::read(path)
        .map_err(|e| report_err(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_slice(&raw)
        .map_err(|e| report_err(format!("failed to parse {}: {e}", path.display())))
}

fn report_err(msg: String) -> EvalError {
    EvalError::Report(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, ErrorNote};
    use crate::model::{CriterionScore, EvalMode, FinalResult, RunStatus};
    use crate::report::{summary, RunMetadata, SCHEMA_VERSION};
    use chrono::Utc;

    fn doc() -> ResultDocument {
        let results = vec![
            FinalResult {
                run_no: 1,
                input_id: "family".into(),
                config_id: "config_a".into(),
                config_type: "free-form".into(),
                candidate_model: "gpt-4o".into(),
                judge_model: "o3-mini".into(),
                rendered_prompt: Some("Plan a trip".into()),
                generated_text: Some("Day 1".into()),
                score: Some(7.5),
                feedback: Some("ok".into()),
                criteria: Vec::new(),
                latency_ms: Some(1200),
                error: None,
                created_at: Utc::now(),
            },
            FinalResult {
                run_no: 2,
                input_id: "solo-business".into(),
                config_id: "config_a".into(),
                config_type: "free-form".into(),
                candidate_model: "gpt-4o".into(),
                judge_model: "o3-mini".into(),
                rendered_prompt: Some("Plan a trip".into()),
                generated_text: None,
                score: None,
                feedback: None,
                criteria: Vec::new(),
                latency_ms: None,
                error: Some(ErrorNote {
                    kind: ErrorKind::Provider,
                    message: "provider error (openai): timed out".into(),
                }),
                created_at: Utc::now(),
            },
        ];
        ResultDocument {
            schema_version: SCHEMA_VERSION,
            run: RunMetadata {
                run_id: "r-1".into(),
                config_path: Some("eval.yaml".into()),
                mode: EvalMode::ReferenceFree,
                candidate_model: "gpt-4o".into(),
                judge_model: "o3-mini".into(),
                score_min: 0.0,
                score_max: 10.0,
                started_at: Utc::now(),
                finished_at: Utc::now(),
                status: RunStatus::Completed,
                abort_reason: None,
            },
            summary: summary::summarize(&results),
            results,
        }
    }

    #[test]
    fn written_document_reads_back_equal() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/results.json");
        let original = doc();
        write_json(&original, &out).unwrap();
        let back = read_json(&out).unwrap();
        assert_eq!(back, original);
        assert_eq!(back.failed_count(), 1);
    }

    #[test]
    fn stats_with_repeating_fractions_read_back_equal() {
        let mut original = doc();
        let template = original.results[0].clone();
        original.results = (1..=7)
            .map(|k| FinalResult {
                run_no: k,
                input_id: format!("input-{k}"),
                score: Some(k as f64 * 10.0 / 7.0),
                latency_ms: Some(1000 + 7 * k as u64),
                criteria: vec![CriterionScore {
                    name: "pace".into(),
                    weight: 1.0 / 3.0,
                    score: k as f64 / 7.0,
                    feedback: "fine".into(),
                }],
                ..template.clone()
            })
            .collect();
        original.summary = summary::summarize(&original.results);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sevenths.json");
        write_json(&original, &out).unwrap();
        assert_eq!(read_json(&out).unwrap(), original);
    }

    #[test]
    fn failed_pair_serializes_null_score_and_error_kind() {
        let mut buf = Vec::new();
        write_to(&doc(), &mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["schema_version"], 1);
        assert_eq!(v["run"]["status"], "completed");
        assert!(v["results"][1]["score"].is_null());
        assert_eq!(v["results"][1]["error"]["kind"], "provider");
        assert_eq!(v["summary"][0]["failed"], 1);
    }

    #[test]
    fn overwrite_replaces_previous_report_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results.json");
        std::fs::write(&out, "old").unwrap();
        write_json(&doc(), &out).unwrap();
        assert!(read_json(&out).is_ok());
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn unreadable_report_is_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("broken.json");
        std::fs::write(&out, "{ not json").unwrap();
        assert_eq!(read_json(&out).unwrap_err().kind(), ErrorKind::Report);
    }
}
