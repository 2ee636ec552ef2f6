//! User-prompt templates.
//!
//! Two placeholder spellings are accepted: `{field}` and `{{ field }}`.
//! Anything else, including a lone `{` or `{"json": 1}`, passes through verbatim.

use crate::errors::EvalError;
use crate::model::InputRecord;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}|\{([A-Za-z0-9_]+)\}")
            .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed template. Parsing never fails; unknown fields surface at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            segments.push(Segment::Field(name));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }
        Self { segments }
    }

    /// Field names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Field(name) = seg {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        }
        out
    }

    /// Substitutes every placeholder from `record`. The first field the record
    /// lacks yields `MissingField`; no partial output is returned.
    pub fn render(&self, record: &InputRecord) -> Result<String, EvalError> {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    let value = record.get(name).ok_or_else(|| EvalError::MissingField {
                        input_id: record.id().to_string(),
                        field: name.clone(),
                    })?;
                    out.push_str(&value.to_string());
                }
            }
        }
        Ok(out)
    }
}

/// One-shot helper for callers that render a template once.
pub fn render(template: &str, record: &InputRecord) -> Result<String, EvalError> {
    PromptTemplate::parse(template).render(record)
}
