use crate::errors::EvalError;
use crate::model::{Criterion, EvalMode, InputRecord, ModelSpec, PromptConfig};
use crate::samples;
use crate::template::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// The YAML document as written by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub version: u32,
    #[serde(default)]
    pub mode: EvalMode,
    pub candidate: ModelSpec,
    pub judge: JudgeSpec,
    pub prompts: Vec<PromptSource>,
    pub inputs: InputSource,
    #[serde(default)]
    pub settings: Settings,
}

fn default_score_min() -> f64 {
    0.0
}

fn default_score_max() -> f64 {
    10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JudgeSpec {
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Grader system prompt. Defaults to the bundled trip-plan grader.
    #[serde(default)]
    pub instructions: Option<String>,
    /// Template rendered against each input to describe its requirements.
    /// When absent every input field is listed.
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub rubric: Vec<String>,
    /// Scored one judge call each; the pair score is their weighted mean.
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default = "default_score_min")]
    pub score_min: f64,
    #[serde(default = "default_score_max")]
    pub score_max: f64,
}

impl JudgeSpec {
    pub fn model_spec(&self) -> ModelSpec {
        ModelSpec {
            model: self.model.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptSource {
    Builtin { builtin: BuiltinPrompts },
    File { file: PathBuf },
    Inline(PromptConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputSource {
    Builtin { builtin: BuiltinInputs },
    File { file: PathBuf },
    Inline(Vec<InputRecord>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinPrompts {
    TripPlanner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinInputs {
    Sydney,
}

fn default_parallel() -> usize {
    1
}

fn default_timeout_seconds() -> u64 {
    120
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_parallel")]
    pub parallel: usize,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            timeout_seconds: default_timeout_seconds(),
            retry: RetrySettings::default(),
        }
    }
}

fn default_max_attempts() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// A loaded, resolved and validated configuration.
#[derive(Debug, Clone)]
pub struct EvalSuite {
    pub source_path: Option<PathBuf>,
    pub mode: EvalMode,
    pub candidate: ModelSpec,
    pub judge: JudgeSpec,
    pub prompts: Vec<PromptConfig>,
    pub inputs: Vec<InputRecord>,
    pub settings: Settings,
}

impl EvalSuite {
    /// Number of (input, prompt) pairs a full run produces.
    pub fn pair_count(&self) -> usize {
        self.inputs.len() * self.prompts.len()
    }

    /// Placeholders some input cannot fill, in plan order. Those pairs fail
    /// with `missing_field` when run; the rest of the run is unaffected.
    pub fn unfilled_fields(&self) -> Vec<UnfilledField> {
        let mut templates: Vec<(String, PromptTemplate)> = self
            .prompts
            .iter()
            .map(|p| (p.id.clone(), PromptTemplate::parse(&p.user_prompt)))
            .collect();
        if let Some(req) = &self.judge.requirements {
            templates.push(("judge.requirements".to_string(), PromptTemplate::parse(req)));
        }

        let mut out = Vec::new();
        for input in &self.inputs {
            for (source, template) in &templates {
                for field in template.placeholders() {
                    if input.get(field).is_none() {
                        out.push(UnfilledField {
                            input_id: input.id().to_string(),
                            source: source.clone(),
                            field: field.to_string(),
                        });
                    }
                }
            }
        }
        out
    }
}

/// A template placeholder that one input does not define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfilledField {
    pub input_id: String,
    /// Prompt id, or `judge.requirements`.
    pub source: String,
    pub field: String,
}

pub fn load_config(path: &Path) -> Result<EvalSuite, EvalError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| EvalError::config(format!("failed to read {}: {e}", path.display())))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut suite = parse_config(&raw, base_dir)?;
    suite.source_path = Some(path.to_path_buf());
    Ok(suite)
}

/// Parses and validates a config document. Relative file references resolve
/// against `base_dir`.
pub fn parse_config(raw: &str, base_dir: &Path) -> Result<EvalSuite, EvalError> {
    let file: ConfigFile = serde_yaml::from_str(raw)
        .map_err(|e| EvalError::config(format!("failed to parse config: {e}")))?;
    resolve(file, base_dir)
}

fn resolve(file: ConfigFile, base_dir: &Path) -> Result<EvalSuite, EvalError> {
    if file.version != SUPPORTED_CONFIG_VERSION {
        return Err(EvalError::config(format!(
            "unsupported config version {} (expected {})",
            file.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    let mut prompts = Vec::with_capacity(file.prompts.len());
    for source in file.prompts {
        match source {
            PromptSource::Inline(p) => prompts.push(p),
            PromptSource::Builtin {
                builtin: BuiltinPrompts::TripPlanner,
            } => prompts.extend(samples::trip_planner_prompts()),
            PromptSource::File { file: rel } => prompts.push(load_prompt_file(&base_dir.join(rel))?),
        }
    }

    let inputs = match file.inputs {
        InputSource::Builtin {
            builtin: BuiltinInputs::Sydney,
        } => samples::sydney_inputs(),
        InputSource::File { file: rel } => load_inputs_file(&base_dir.join(rel))?,
        InputSource::Inline(records) => records,
    };

    let suite = EvalSuite {
        source_path: None,
        mode: file.mode,
        candidate: file.candidate,
        judge: file.judge,
        prompts,
        inputs,
        settings: file.settings,
    };
    validate(&suite)?;
    Ok(suite)
}

fn load_prompt_file(path: &Path) -> Result<PromptConfig, EvalError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        EvalError::config(format!("failed to read prompt file {}: {e}", path.display()))
    })?;
    serde_yaml::from_str(&raw).map_err(|e| {
        EvalError::config(format!("failed to parse prompt file {}: {e}", path.display()))
    })
}

fn load_inputs_file(path: &Path) -> Result<Vec<InputRecord>, EvalError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        EvalError::config(format!("failed to read inputs file {}: {e}", path.display()))
    })?;
    serde_yaml::from_str(&raw).map_err(|e| {
        EvalError::config(format!("failed to parse inputs file {}: {e}", path.display()))
    })
}

/// Checks every invariant a run depends on. Runs before any provider call.
pub fn validate(suite: &EvalSuite) -> Result<(), EvalError> {
    if suite.mode == EvalMode::Comparison {
        return Err(EvalError::config(
            "mode `comparison` is not supported; use `reference_free` or `ground_truth`",
        ));
    }
    if suite.prompts.is_empty() {
        return Err(EvalError::config("at least one prompt is required"));
    }
    if suite.inputs.is_empty() {
        return Err(EvalError::config("at least one input is required"));
    }

    let mut prompt_ids = HashSet::new();
    for p in &suite.prompts {
        if p.id.trim().is_empty() {
            return Err(EvalError::config("prompt id must not be empty"));
        }
        if !prompt_ids.insert(p.id.as_str()) {
            return Err(EvalError::config(format!("duplicate prompt id `{}`", p.id)));
        }
    }

    let mut input_ids = HashSet::new();
    for input in &suite.inputs {
        if input.id().trim().is_empty() {
            return Err(EvalError::config("input id must not be empty"));
        }
        if !input_ids.insert(input.id()) {
            return Err(EvalError::config(format!("duplicate input id `{}`", input.id())));
        }
        if suite.mode == EvalMode::GroundTruth && input.reference().is_none() {
            return Err(EvalError::config(format!(
                "input `{}` has no reference; ground_truth mode requires one on every input",
                input.id()
            )));
        }
    }

    let (min, max) = (suite.judge.score_min, suite.judge.score_max);
    if !min.is_finite() || !max.is_finite() {
        return Err(EvalError::config("judge score bounds must be finite"));
    }
    if min >= max {
        return Err(EvalError::config(format!(
            "judge score_min ({min}) must be below score_max ({max})"
        )));
    }

    let mut criterion_names = HashSet::new();
    for c in &suite.judge.criteria {
        if c.name.trim().is_empty() {
            return Err(EvalError::config("criterion name must not be empty"));
        }
        if !criterion_names.insert(c.name.as_str()) {
            return Err(EvalError::config(format!("duplicate criterion `{}`", c.name)));
        }
        if c.question.trim().is_empty() {
            return Err(EvalError::config(format!(
                "criterion `{}` has an empty question",
                c.name
            )));
        }
        if !c.weight.is_finite() || c.weight <= 0.0 {
            return Err(EvalError::config(format!(
                "criterion `{}` weight must be a positive number, got {}",
                c.name, c.weight
            )));
        }
    }

    if suite.settings.parallel == 0 {
        return Err(EvalError::config("settings.parallel must be at least 1"));
    }
    if suite.settings.retry.max_attempts == 0 {
        return Err(EvalError::config("settings.retry.max_attempts must be at least 1"));
    }
    if suite.settings.timeout_seconds == 0 {
        return Err(EvalError::config("settings.timeout_seconds must be at least 1"));
    }
    Ok(())
}
