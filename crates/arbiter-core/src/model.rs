use crate::errors::ErrorNote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single value in an input record. Lists render as comma-separated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

/// One evaluation input: a stable id plus the named fields templates read.
///
/// Records are built once (from config or the bundled samples) and never
/// mutated afterwards, so the fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputRecord {
    id: String,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
    /// Reference answer, required in ground-truth mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
}

impl InputRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            reference: None,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

fn default_prompt_kind() -> String {
    "free-form".to_string()
}

/// A prompt variant under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    #[serde(alias = "prompt_id")]
    pub id: String,
    /// Free label describing the prompting style (e.g. "structured").
    #[serde(rename = "type", default = "default_prompt_kind")]
    pub kind: String,
    #[serde(default)]
    pub system_prompt: String,
    pub user_prompt: String,
    /// Overrides the suite-level candidate model for this variant only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalMode {
    #[default]
    ReferenceFree,
    GroundTruth,
    Comparison,
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvalMode::ReferenceFree => "reference_free",
            EvalMode::GroundTruth => "ground_truth",
            EvalMode::Comparison => "comparison",
        };
        f.write_str(s)
    }
}

/// Model id plus sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelSpec {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            top_p: None,
            max_tokens: None,
        }
    }
}

/// What the candidate model produced for one (input, config) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOutput {
    pub system_prompt: String,
    pub rendered_prompt: String,
    pub text: String,
    pub latency_ms: u64,
    pub model: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    #[default]
    Rubric,
}

fn default_weight() -> f64 {
    1.0
}

/// A question the judge answers with its own score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Criterion {
    #[serde(rename = "type", default)]
    pub kind: CriterionKind,
    pub name: String,
    pub question: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Criterion {
    pub fn new(name: impl Into<String>, question: impl Into<String>, weight: f64) -> Self {
        Self {
            kind: CriterionKind::Rubric,
            name: name.into(),
            question: question.into(),
            weight,
        }
    }
}

/// The judge's score for one criterion of one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub name: String,
    pub weight: f64,
    pub score: f64,
    pub feedback: String,
}

/// The judge's verdict on one candidate output.
///
/// With criteria configured, `score` is their weighted mean and `criteria`
/// holds the breakdown in configured order.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult {
    pub score: f64,
    pub feedback: String,
    pub criteria: Vec<CriterionScore>,
}

/// Uniqueness key for results within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultKey {
    pub input_id: String,
    pub config_id: String,
}

impl ResultKey {
    pub fn new(input_id: impl Into<String>, config_id: impl Into<String>) -> Self {
        Self {
            input_id: input_id.into(),
            config_id: config_id.into(),
        }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.input_id, self.config_id)
    }
}

/// One persisted row of a run.
///
/// `score` is `None` whenever the pair failed or the judge response could
/// not be parsed; `error` then says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub run_no: u32,
    pub input_id: String,
    pub config_id: String,
    pub config_type: String,
    pub candidate_model: String,
    pub judge_model: String,
    pub rendered_prompt: Option<String>,
    pub generated_text: Option<String>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<CriterionScore>,
    pub latency_ms: Option<u64>,
    pub error: Option<ErrorNote>,
    pub created_at: DateTime<Utc>,
}

impl FinalResult {
    pub fn key(&self) -> ResultKey {
        ResultKey::new(&self.input_id, &self.config_id)
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Aborted,
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Completed => "completed",
            RunStatus::Aborted => "aborted",
            RunStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}
