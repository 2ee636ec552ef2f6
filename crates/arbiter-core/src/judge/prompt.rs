use crate::errors::EvalError;
use crate::judge::ScoreBounds;
use crate::model::{CandidateOutput, Criterion, EvalMode, InputRecord};
use crate::template::PromptTemplate;

/// Appended to the grader instructions so the output contract always names
/// the configured bounds.
pub(crate) fn format_contract(bounds: ScoreBounds) -> String {
    format!(
        "Scores must be between {} and {} inclusive. \
         Answer with a line `SCORE: <number>` followed by `REASONING: <text>`.",
        bounds.min, bounds.max
    )
}

fn default_requirements(record: &InputRecord) -> String {
    record
        .fields()
        .iter()
        .map(|(name, value)| format!("- {name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the user message sent to the judge.
pub(crate) fn build_judge_prompt(
    mode: EvalMode,
    requirements: Option<&PromptTemplate>,
    rubric: &[String],
    criterion: Option<&Criterion>,
    record: &InputRecord,
    output: &CandidateOutput,
) -> Result<String, EvalError> {
    let requirements = match requirements {
        Some(t) => t.render(record)?,
        None => default_requirements(record),
    };

    let mut prompt = format!(
        "Please evaluate this response.\n\nRequirements:\n{}\n",
        requirements.trim_end()
    );

    if !rubric.is_empty() {
        prompt.push_str("\nRubric:\n");
        for line in rubric {
            prompt.push_str("- ");
            prompt.push_str(line);
            prompt.push('\n');
        }
    }

    if let Some(c) = criterion {
        prompt.push_str(&format!(
            "\nCriterion: {}\nQuestion: {}\nScore only this criterion.\n",
            c.name,
            c.question.trim()
        ));
    }

    if mode == EvalMode::GroundTruth {
        if let Some(reference) = record.reference() {
            prompt.push_str("\nReference Response:\n");
            prompt.push_str(reference);
            prompt.push('\n');
        }
    }

    prompt.push_str("\nResponse to Evaluate:\n");
    prompt.push_str(&output.text);
    Ok(prompt)
}
