use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::fill_template;
use crate::llm_client::LlmClient;
use crate::models::candidate::Assessment;
use crate::screening::prompts::{INTERVIEW_PROMPT_TEMPLATE, INTERVIEW_TEMPERATURE, LIST_SEPARATOR};

pub fn build_interview_prompt(job_description: &str, resume_text: &str, assessment: &Assessment) -> String {
    let score = assessment.score.to_string();
    let tags = assessment.tags.join(LIST_SEPARATOR);
    let strengths = assessment.strengths.join(LIST_SEPARATOR);
    let risks = assessment.risks.join(LIST_SEPARATOR);

    fill_template(
        INTERVIEW_PROMPT_TEMPLATE,
        &[
            ("jd", job_description),
            ("resume", resume_text),
            ("score", &score),
            ("tags", &tags),
            ("strengths", &strengths),
            ("risks", &risks),
        ],
    )
}

/// Generates interview questions as markdown.
pub async fn interview_questions(
    llm: &LlmClient,
    job_description: &str,
    resume_text: &str,
    assessment: &Assessment,
) -> Result<String, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }

    let prompt = build_interview_prompt(job_description, resume_text, assessment);
    let markdown = llm
        .complete(&prompt, INTERVIEW_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Interview question generation failed: {e}")))?;

    info!(candidate = %assessment.name, "interview questions generated");
    Ok(markdown.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_inlines_assessment() {
        let assessment = Assessment {
            name: "韩梅梅".to_string(),
            score: 78,
            tags: vec!["Java".to_string(), "微服务".to_string()],
            strengths: vec!["带过团队".to_string()],
            risks: vec!["缺少云原生经验".to_string(), "期望薪资偏高".to_string()],
            summary: String::new(),
        };
        let prompt = build_interview_prompt("后端工程师", "八年Java开发经验", &assessment);

        assert!(prompt.contains("后端工程师"));
        assert!(prompt.contains("八年Java开发经验"));
        assert!(prompt.contains("Match score: 78"));
        assert!(prompt.contains("Core tags: Java、微服务"));
        assert!(prompt.contains("Risks: 缺少云原生经验、期望薪资偏高"));
        assert!(!prompt.contains("{tags}"));
    }

    #[test]
    fn test_resume_text_with_braced_names_is_left_verbatim() {
        let assessment = Assessment {
            name: "Ada".to_string(),
            score: 78,
            tags: vec!["Rust".to_string()],
            strengths: vec![],
            risks: vec![],
            summary: String::new(),
        };
        let prompt = build_interview_prompt(
            "Backend engineer",
            "Wrote a templating engine using {score} and {tags} tokens",
            &assessment,
        );

        assert!(prompt.contains("Wrote a templating engine using {score} and {tags} tokens"));
        assert!(prompt.contains("Match score: 78"));
        assert!(prompt.contains("Core tags: Rust"));
    }
}
