//! Axum route handlers for the Contract API.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::service::{render_document, run_audit, RenderedDocument, Selection};
use crate::errors::AppError;
use crate::models::annotation::Annotation;
use crate::reconcile::locator::MatchStrategy;
use crate::reconcile::replace::{apply_all, apply_one, ApplyOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub contract_text: String,
    pub prompt_template: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse<'a> {
    pub audit_id: Uuid,
    pub model: &'a str,
    pub completed_at: DateTime<Utc>,
    pub summary: &'a str,
    #[serde(flatten)]
    pub document: RenderedDocument<'a>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub document: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub selection: Option<Selection>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub document: String,
    pub annotation: Annotation,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub document: String,
    pub applied: bool,
    pub annotation_id: String,
    pub strategy: MatchStrategy,
    /// Anchor match: the replaced text may extend past the excerpt.
    pub approximate: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApplyAllRequest {
    pub document: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Serialize)]
pub struct ApplyAllResponse<'a> {
    pub document: String,
    pub applied_count: usize,
    pub applied_ids: Vec<String>,
    pub skipped_ids: Vec<String>,
    /// Applied through an anchor match; worth a manual review.
    pub approximate_ids: Vec<String>,
    /// Annotations that were not applied, for the caller to keep or drop.
    pub remaining: Vec<&'a Annotation>,
}

/// Ids correlate highlights, statuses and `remaining` with their risks,
/// so a request may not repeat one.
fn ensure_unique_ids(annotations: &[Annotation]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(annotations.len());
    match annotations.iter().find(|a| !seen.insert(a.id.as_str())) {
        Some(duplicate) => Err(AppError::Validation(format!(
            "annotation id {} appears more than once",
            duplicate.id
        ))),
        None => Ok(()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/contracts/audit
///
/// Runs the model over the contract and returns risks already reconciled
/// against the submitted text.
pub async fn handle_audit(
    State(state): State<AppState>,
    Json(request): Json<AuditRequest>,
) -> Result<Response, AppError> {
    let run = run_audit(
        &state.llm,
        &request.contract_text,
        request.prompt_template.as_deref(),
    )
    .await?;

    let document = render_document(&request.contract_text, &run.draft.risks, None);

    Ok(Json(AuditResponse {
        audit_id: run.audit_id,
        model: &run.model,
        completed_at: run.completed_at,
        summary: &run.draft.summary,
        document,
    })
    .into_response())
}

/// POST /api/v1/contracts/render
///
/// Re-resolves a (possibly edited) document against the current risk list.
pub async fn handle_render(Json(request): Json<RenderRequest>) -> Result<Response, AppError> {
    ensure_unique_ids(&request.annotations)?;
    let document = render_document(
        &request.document,
        &request.annotations,
        request.selection.as_ref(),
    );
    Ok(Json(document).into_response())
}

/// POST /api/v1/contracts/apply
pub async fn handle_apply(
    Json(request): Json<ApplyRequest>,
) -> Result<Json<ApplyResponse>, AppError> {
    let result = apply_one(&request.document, &request.annotation);
    match result.outcome {
        ApplyOutcome::Applied { strategy } => Ok(Json(ApplyResponse {
            document: result.document,
            applied: true,
            annotation_id: request.annotation.id,
            strategy,
            approximate: strategy.is_approximate(),
        })),
        ApplyOutcome::NotLocated => Err(AppError::NotLocated(format!(
            "risk {} could not be found in the original text",
            request.annotation.id
        ))),
        ApplyOutcome::Informational => Err(AppError::Validation(format!(
            "risk {} is informational and has no replacement",
            request.annotation.id
        ))),
    }
}

/// POST /api/v1/contracts/apply-all
///
/// Applies every locatable replacement in one pass. Fails when a non-empty
/// list applies nothing; the document is then unchanged.
pub async fn handle_apply_all(Json(request): Json<ApplyAllRequest>) -> Result<Response, AppError> {
    ensure_unique_ids(&request.annotations)?;
    let result = apply_all(&request.document, &request.annotations);

    if result.applied_count == 0 && !request.annotations.is_empty() {
        return Err(AppError::NotLocated(format!(
            "none of the {} risks could be found in the original text",
            request.annotations.len()
        )));
    }

    let remaining = request
        .annotations
        .iter()
        .filter(|a| !result.applied_ids.contains(&a.id))
        .collect();

    Ok(Json(ApplyAllResponse {
        document: result.document,
        applied_count: result.applied_count,
        applied_ids: result.applied_ids,
        skipped_ids: result.skipped_ids,
        approximate_ids: result.approximate_ids,
        remaining,
    })
    .into_response())
}
