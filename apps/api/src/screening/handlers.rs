//! Axum route handlers for the Screening API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::extract_document_text;
use crate::extraction::handlers::{Upload, UploadedFile};
use crate::models::candidate::{Assessment, CandidateEvaluation};
use crate::screening::evaluation::{evaluate_candidate, name_from_file, UNKNOWN_CANDIDATE};
use crate::screening::interview::interview_questions;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub job_description: String,
    pub resume_text: String,
    pub prompt_template: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Done,
    Error,
}

/// Outcome for one uploaded resume. A failed file never fails the batch.
#[derive(Debug, Serialize)]
pub struct FileEvaluation {
    pub file_name: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<CandidateEvaluation>,
    /// Extracted text, kept by the client for follow-up interview questions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchEvaluationResponse {
    pub evaluated: usize,
    pub failed: usize,
    /// One entry per `file` part, in upload order.
    pub results: Vec<FileEvaluation>,
}

#[derive(Debug, Deserialize)]
pub struct InterviewRequest {
    pub job_description: String,
    pub resume_text: String,
    pub evaluation: Assessment,
}

#[derive(Debug, Serialize)]
pub struct InterviewResponse {
    pub markdown: String,
    pub model: String,
}

/// POST /api/v1/screening/evaluate
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<CandidateEvaluation>, AppError> {
    let evaluation = evaluate_candidate(
        &state.llm,
        &req.job_description,
        &req.resume_text,
        req.prompt_template.as_deref(),
        UNKNOWN_CANDIDATE,
    )
    .await?;
    Ok(Json(evaluation))
}

/// POST /api/v1/screening/evaluate-upload
///
/// Multipart: one or more `file` parts (resumes) + `job_description`,
/// optional `prompt_template`. Files are evaluated in upload order.
pub async fn handle_evaluate_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BatchEvaluationResponse>, AppError> {
    let upload = Upload::read(multipart).await?;
    let job_description = upload
        .field("job_description")
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?
        .to_string();
    let prompt_template = upload.field("prompt_template").map(str::to_string);

    let mut results = Vec::with_capacity(upload.files.len());
    for file in upload.files {
        let file_name = file.file_name.clone();
        let result = match evaluate_file(&state, &job_description, prompt_template.as_deref(), file).await {
            Ok((evaluation, resume_text)) => FileEvaluation {
                file_name,
                status: FileStatus::Done,
                evaluation: Some(evaluation),
                resume_text: Some(resume_text),
                error: None,
            },
            Err(e) => {
                warn!("resume {file_name} could not be evaluated: {e}");
                FileEvaluation {
                    file_name,
                    status: FileStatus::Error,
                    evaluation: None,
                    resume_text: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(result);
    }

    let failed = results
        .iter()
        .filter(|r| r.status == FileStatus::Error)
        .count();
    info!(files = results.len(), failed, "resume batch evaluated");

    Ok(Json(BatchEvaluationResponse {
        evaluated: results.len() - failed,
        failed,
        results,
    }))
}

async fn evaluate_file(
    state: &AppState,
    job_description: &str,
    prompt_template: Option<&str>,
    file: UploadedFile,
) -> Result<(CandidateEvaluation, String), AppError> {
    let file = file.ensure_not_empty()?;
    let resume_text = extract_document_text(state.extractor.as_ref(), &file.file_name, file.bytes).await?;

    let mut evaluation = evaluate_candidate(
        &state.llm,
        job_description,
        &resume_text,
        prompt_template,
        name_from_file(&file.file_name),
    )
    .await?;
    evaluation.file_name = Some(file.file_name);

    Ok((evaluation, resume_text))
}

/// POST /api/v1/screening/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Json(req): Json<InterviewRequest>,
) -> Result<Json<InterviewResponse>, AppError> {
    let markdown =
        interview_questions(&state.llm, &req.job_description, &req.resume_text, &req.evaluation).await?;
    Ok(Json(InterviewResponse {
        markdown,
        model: state.llm.model().to_string(),
    }))
}
