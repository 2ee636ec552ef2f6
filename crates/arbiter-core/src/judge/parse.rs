use crate::errors::EvalError;
use crate::judge::ScoreBounds;
use crate::model::EvalResult;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref SCORE_LINE: Regex =
        Regex::new(r"(?im)^[ \t>*#_-]*score[ \t*_]*[:=][ \t*_]*\[?[ \t]*(-?\d+(?:\.\d+)?)(.?.?)").unwrap();
    static ref REASONING: Regex =
        Regex::new(r"(?ims)^[ \t>*#_-]*(?:reasoning|feedback|rationale)[ \t*_]*:[ \t*_]*(.*)").unwrap();
}

const FEEDBACK_KEYS: &[&str] = &["feedback", "reasoning", "rationale", "reason"];

/// Extracts a score and feedback from a judge reply.
///
/// Accepts a JSON object with a numeric `score`, or `SCORE:` / `REASONING:`
/// lines. Out-of-bounds scores are rejected, never clamped.
pub fn parse_judge_response(raw: &str, bounds: ScoreBounds) -> Result<EvalResult, EvalError> {
    let text = raw.trim();
    let parsed = match parse_json(text)? {
        Some(found) => found,
        None => parse_labelled(text)?,
    };

    if !parsed.score.is_finite() || !bounds.contains(parsed.score) {
        return Err(EvalError::judge_parse(
            format!(
                "score {} is outside [{}, {}]",
                parsed.score, bounds.min, bounds.max
            ),
            raw,
        ));
    }
    Ok(parsed)
}

fn parse_json(text: &str) -> Result<Option<EvalResult>, EvalError> {
    let Some(start) = text.find('{') else {
        return Ok(None);
    };
    let value = match serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<Value>()
        .next()
    {
        Some(Ok(v)) => v,
        _ => return Ok(None),
    };
    let Some(obj) = value.as_object() else {
        return Ok(None);
    };
    let Some(score) = obj.get("score") else {
        return Ok(None);
    };
    let score = score
        .as_f64()
        .ok_or_else(|| EvalError::judge_parse("judge JSON `score` is not a number", text))?;
    let feedback = FEEDBACK_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .trim()
        .to_string();
    Ok(Some(EvalResult {
        score,
        feedback,
        criteria: Vec::new(),
    }))
}

/// The number must stand alone: `8,5`, `1e1` or `0-10` are not scores.
fn ends_cleanly(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_whitespace() || matches!(c, '/' | ']' | '*' | '_') => true,
        Some('.') => !chars.next().is_some_and(|c| c.is_ascii_digit()),
        Some(_) => false,
    }
}

fn parse_labelled(text: &str) -> Result<EvalResult, EvalError> {
    let caps = SCORE_LINE
        .captures(text)
        .ok_or_else(|| EvalError::judge_parse("no score found in judge response", text))?;
    let number = caps.get(1).map_or("", |m| m.as_str());
    let rest = caps.get(2).map_or("", |m| m.as_str());
    if !ends_cleanly(rest) {
        return Err(EvalError::judge_parse(
            format!("malformed score `{number}{rest}...`"),
            text,
        ));
    }
    let score = number
        .parse::<f64>()
        .map_err(|e| EvalError::judge_parse(format!("invalid score: {e}"), text))?;

    let feedback = REASONING
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| text.to_string());
    Ok(EvalResult {
        score,
        feedback,
        criteria: Vec::new(),
    })
}
