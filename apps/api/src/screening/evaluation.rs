//! Resume evaluation: prompt → LLM → coerced `Assessment`.

use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{strip_json_fences, widest_slice, LlmClient, LlmError};
use crate::models::candidate::{Assessment, CandidateEvaluation};
use crate::screening::prompts::{EVALUATION_PROMPT_TEMPLATE, EVALUATION_TEMPERATURE};

pub const UNKNOWN_CANDIDATE: &str = "Unknown";

/// Coerces the model's answer into an `Assessment`.
///
/// `default_name` is used when the model gives no usable name.
pub fn parse_evaluation(content: &str, default_name: &str) -> Result<Assessment, LlmError> {
    let cleaned = strip_json_fences(content);
    let slice = widest_slice(&cleaned, '{', '}')
        .ok_or_else(|| LlmError::Unusable("no JSON object in evaluation".to_string()))?;
    let value: Value = serde_json::from_str(slice)?;
    if !value.is_object() {
        return Err(LlmError::Unusable("evaluation is not a JSON object".to_string()));
    }

    Ok(Assessment {
        name: value
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_name)
            .to_string(),
        score: coerce_score(value.get("score")),
        tags: string_list(value.get("tags")),
        strengths: string_list(value.get("strengths")),
        risks: string_list(value.get("risks")),
        summary: value
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Numbers and numeric strings, rounded and clamped to 0..=100. Anything else is 0.
fn coerce_score(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(score) if score.is_finite() => score.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Display name from an uploaded file, e.g. `Jane Doe.PDF` → `Jane Doe`.
pub fn name_from_file(file_name: &str) -> &str {
    let len = file_name.len();
    match file_name.get(len.saturating_sub(4)..) {
        Some(ext) if len > 4 && ext.eq_ignore_ascii_case(".pdf") => &file_name[..len - 4],
        _ => file_name,
    }
}

/// Scores `resume_text` against `job_description`.
pub async fn evaluate_candidate(
    llm: &LlmClient,
    job_description: &str,
    resume_text: &str,
    prompt_template: Option<&str>,
    default_name: &str,
) -> Result<CandidateEvaluation, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description cannot be empty".to_string()));
    }
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }

    let template = prompt_template.unwrap_or(EVALUATION_PROMPT_TEMPLATE);
    if !template.contains("{jd}") || !template.contains("{resume}") {
        return Err(AppError::Validation(
            "prompt_template must contain {jd} and {resume} placeholders".to_string(),
        ));
    }

    let prompt = fill_template(
        template,
        &[
            ("json_instruction", JSON_ONLY_INSTRUCTION),
            ("jd", job_description),
            ("resume", resume_text),
        ],
    );

    let content = llm
        .complete(&prompt, EVALUATION_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Resume evaluation failed: {e}")))?;

    let assessment = parse_evaluation(&content, default_name)
        .map_err(|e| AppError::Llm(format!("Resume evaluation returned an unusable answer: {e}")))?;

    let evaluation = CandidateEvaluation::new(assessment, llm.model());
    info!(
        candidate_id = %evaluation.candidate_id,
        score = evaluation.assessment.score,
        "resume evaluated"
    );
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_fenced_evaluation() {
        let content = "Here you go:\n```json\n{\"name\": \"李雷\", \"score\": 86, \"tags\": [\"Rust\", \"分布式\"], \"strengths\": [\"十年后端经验\"], \"risks\": [\"跳槽频繁\"], \"summary\": \"匹配度高\"}\n```";
        let assessment = parse_evaluation(content, UNKNOWN_CANDIDATE).unwrap();
        assert_eq!(assessment.name, "李雷");
        assert_eq!(assessment.score, 86);
        assert_eq!(assessment.tags, vec!["Rust", "分布式"]);
        assert_eq!(assessment.risks, vec!["跳槽频繁"]);
        assert_eq!(assessment.summary, "匹配度高");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let assessment = parse_evaluation("{}", UNKNOWN_CANDIDATE).unwrap();
        assert_eq!(assessment.name, "Unknown");
        assert_eq!(assessment.score, 0);
        assert!(assessment.tags.is_empty());
        assert!(assessment.summary.is_empty());
    }

    #[test]
    fn test_default_name_from_caller() {
        let assessment = parse_evaluation(r#"{"name": "  ", "score": 50}"#, "jane_doe_cv").unwrap();
        assert_eq!(assessment.name, "jane_doe_cv");
    }

    #[test]
    fn test_score_coercion() {
        let score = |raw: &str| parse_evaluation(&format!(r#"{{"score": {raw}}}"#), "x").unwrap().score;
        assert_eq!(score("72.6"), 73);
        assert_eq!(score("\"88\""), 88);
        assert_eq!(score("\"90%\""), 90);
        assert_eq!(score("140"), 100);
        assert_eq!(score("-5"), 0);
        assert_eq!(score("\"high\""), 0);
        assert_eq!(score("null"), 0);
    }

    #[test]
    fn test_non_string_list_items_dropped() {
        let assessment =
            parse_evaluation(r#"{"tags": ["Go", 3, null, "", "K8s"], "strengths": "not a list"}"#, "x").unwrap();
        assert_eq!(assessment.tags, vec!["Go", "K8s"]);
        assert!(assessment.strengths.is_empty());
    }

    #[test]
    fn test_no_object_is_unusable() {
        let err = parse_evaluation("I cannot evaluate this resume.", "x").unwrap_err();
        assert!(matches!(err, LlmError::Unusable(_)));
    }

    #[test]
    fn test_name_from_file() {
        assert_eq!(name_from_file("Jane Doe.pdf"), "Jane Doe");
        assert_eq!(name_from_file("王芳简历.PDF"), "王芳简历");
        assert_eq!(name_from_file("resume.txt"), "resume.txt");
        assert_eq!(name_from_file(".pdf"), ".pdf");
    }
}
