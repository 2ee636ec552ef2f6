use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error kind names. These strings are part of the persisted result
/// schema (`error.kind`) and of the CLI error output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingField,
    Provider,
    ModelUnavailable,
    JudgeParse,
    DuplicateResult,
    Config,
    Report,
    Internal,
}

/// How far an error reaches when it happens inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// The pair is recorded with a null score and the run continues.
    Pair,
    /// The candidate output is kept; only the score is lost.
    Score,
    /// The run stops.
    Run,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "missing_field",
            ErrorKind::Provider => "provider",
            ErrorKind::ModelUnavailable => "model_unavailable",
            ErrorKind::JudgeParse => "judge_parse",
            ErrorKind::DuplicateResult => "duplicate_result",
            ErrorKind::Config => "config",
            ErrorKind::Report => "report",
            ErrorKind::Internal => "internal",
        }
    }

    pub fn scope(&self) -> ErrorScope {
        match self {
            ErrorKind::MissingField | ErrorKind::Provider => ErrorScope::Pair,
            ErrorKind::JudgeParse => ErrorScope::Score,
            ErrorKind::ModelUnavailable
            | ErrorKind::DuplicateResult
            | ErrorKind::Config
            | ErrorKind::Report
            | ErrorKind::Internal => ErrorScope::Run,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The user-prompt template references a field the input record lacks.
    #[error("template references field `{field}` which input `{input_id}` does not define")]
    MissingField { input_id: String, field: String },

    /// Transport, auth, timeout or unexpected provider response.
    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: String,
        message: String,
        status: Option<u16>,
        retryable: bool,
    },

    /// The provider rejected the requested model id.
    #[error("model `{model}` is not available from provider {provider}: {detail}")]
    ModelUnavailable {
        provider: String,
        model: String,
        detail: String,
    },

    /// The judge answered, but no score within bounds could be extracted.
    #[error("judge response could not be parsed: {reason}")]
    JudgeParse { reason: String, raw: String },

    /// Two results were recorded for the same (input, config) key.
    #[error("duplicate result for input `{input_id}` and config `{config_id}`")]
    DuplicateResult { input_id: String, config_id: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("report error: {0}")]
    Report(String),

    /// A pair task died without producing a result.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::MissingField { .. } => ErrorKind::MissingField,
            EvalError::Provider { .. } => ErrorKind::Provider,
            EvalError::ModelUnavailable { .. } => ErrorKind::ModelUnavailable,
            EvalError::JudgeParse { .. } => ErrorKind::JudgeParse,
            EvalError::DuplicateResult { .. } => ErrorKind::DuplicateResult,
            EvalError::Config(_) => ErrorKind::Config,
            EvalError::Report(_) => ErrorKind::Report,
            EvalError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::Provider {
            provider: provider.into(),
            message: message.into(),
            status: None,
            retryable: false,
        }
    }

    /// Transport-level failure (connect, reset, timeout). Retryable.
    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::Provider {
            provider: provider.into(),
            message: message.into(),
            status: None,
            retryable: true,
        }
    }

    pub fn provider_status(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        EvalError::Provider {
            provider: provider.into(),
            message: message.into(),
            status: Some(status),
            retryable: status == 429 || status >= 500,
        }
    }

    pub fn model_unavailable(
        provider: impl Into<String>,
        model: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        EvalError::ModelUnavailable {
            provider: provider.into(),
            model: model.into(),
            detail: detail.into(),
        }
    }

    pub fn judge_parse(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        EvalError::JudgeParse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        EvalError::Config(detail.into())
    }

    /// Only transient provider failures qualify; the opt-in retry layer keys off this.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EvalError::Provider {
                retryable: true,
                ..
            }
        )
    }

    pub fn aborts_run(&self) -> bool {
        self.kind().scope() == ErrorScope::Run
    }
}

/// Error note attached to a persisted result or to an aborted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNote {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&EvalError> for ErrorNote {
    fn from(err: &EvalError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_documented_scopes() {
        assert_eq!(ErrorKind::MissingField.scope(), ErrorScope::Pair);
        assert_eq!(ErrorKind::Provider.scope(), ErrorScope::Pair);
        assert_eq!(ErrorKind::JudgeParse.scope(), ErrorScope::Score);
        assert_eq!(ErrorKind::ModelUnavailable.scope(), ErrorScope::Run);
        assert_eq!(ErrorKind::DuplicateResult.scope(), ErrorScope::Run);
        assert_eq!(ErrorKind::Internal.scope(), ErrorScope::Run);
    }

    #[test]
    fn status_codes_decide_retryability() {
        assert!(EvalError::provider_status("openai", 429, "slow down").is_retryable());
        assert!(EvalError::provider_status("openai", 503, "busy").is_retryable());
        assert!(!EvalError::provider_status("openai", 401, "bad key").is_retryable());
        assert!(EvalError::transport("openai", "connection reset").is_retryable());
        assert!(!EvalError::model_unavailable("openai", "gpt-9", "404").is_retryable());
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let note = ErrorNote::from(&EvalError::judge_parse("no score", "hello"));
        let v = serde_json::to_value(&note).unwrap();
        assert_eq!(v["kind"], "judge_parse");
        assert!(v["message"].as_str().unwrap().contains("no score"));
    }

    #[test]
    fn missing_field_message_names_field_and_input() {
        let err = EvalError::MissingField {
            input_id: "family".into(),
            field: "hotel_name".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("hotel_name"));
        assert!(msg.contains("family"));
        assert_eq!(err.kind().as_str(), "missing_field");
    }
}
