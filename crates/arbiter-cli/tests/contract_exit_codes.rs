use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn arbiter() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("arbiter").expect("arbiter binary");
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env("RUST_LOG", "warn");
    cmd
}

fn write_sample(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("eval.yaml");
    arbiter()
        .arg("init")
        .arg("--path")
        .arg(&path)
        .assert()
        .success();
    path
}

#[test]
fn init_writes_a_config_that_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());
    assert!(path.exists());

    arbiter()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("2 prompts × 5 inputs = 10 pairs"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eval.yaml");
    fs::write(&path, "keep me").unwrap();

    arbiter()
        .args(["init", "--path"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");

    arbiter()
        .args(["init", "--force", "--path"])
        .arg(&path)
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("trip_planner"));
}

#[test]
fn validate_warns_about_fields_an_input_lacks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eval.yaml");
    fs::write(
        &path,
        "version: 1\ncandidate: { model: gpt-4o }\njudge: { model: o3-mini }\nprompts:\n  - { id: a, user_prompt: \"Plan {city} in {month}\" }\ninputs:\n  - { id: one, fields: { city: Sydney } }\n",
    )
    .unwrap();

    arbiter()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(0)
        .stderr(predicate::str::contains(
            "input `one` has no field `month` used by a",
        ));
}

#[test]
fn invalid_config_exits_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(
        &path,
        "version: 1\ncandidate: { model: gpt-4o }\njudge: { model: o3-mini }\nprompts: []\ninputs: []\n",
    )
    .unwrap();

    arbiter()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[config]"));

    arbiter()
        .args(["run", "--provider", "fake"])
        .arg(&path)
        .assert()
        .code(2);
}

#[test]
fn missing_config_file_exits_with_config_error() {
    arbiter()
        .args(["validate", "does/not/exist.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[config]"));
}

#[test]
fn openai_run_without_api_key_is_a_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());

    arbiter()
        .arg("run")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn unknown_model_is_rejected_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eval.yaml");
    fs::write(
        &path,
        r#"version: 1
candidate: { model: gpt-9-imaginary }
judge: { model: o3-mini }
prompts:
  - { id: a, user_prompt: "Plan {hotel_city}" }
inputs: { builtin: sydney }
"#,
    )
    .unwrap();
    let out = dir.path().join("results.json");

    arbiter()
        .arg("run")
        .arg(&path)
        .args(["--api-key", "sk-test", "--base-url", "http://127.0.0.1:9", "-o"])
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[model_unavailable]"));
    assert!(!out.exists());
}
