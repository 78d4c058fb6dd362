//! Contract audit pipeline and the views sent to the rendering client.
//!
//! Flow: fill prompt → LLM → parse_audit_response → build_spans → segments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::parse::{parse_audit_response, AuditDraft};
use crate::audit::prompts::{AUDIT_PROMPT_TEMPLATE, AUDIT_TEMPERATURE};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION, VERBATIM_EXCERPT_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::annotation::Annotation;
use crate::reconcile::cross_ref::{CrossReference, FocusTarget};
use crate::reconcile::locator::MatchStrategy;
use crate::reconcile::plan::{build_spans, HighlightPlan};
use crate::reconcile::segments::{render_segments, Segment};
use crate::reconcile::span::CharSpan;

// ────────────────────────────────────────────────────────────────────────────
// Audit
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AuditRun {
    pub audit_id: Uuid,
    pub model: String,
    pub completed_at: DateTime<Utc>,
    pub draft: AuditDraft,
}

/// Asks the model for risks in `contract_text` and coerces the answer.
/// A custom template must contain `{contract}`.
pub async fn run_audit(
    llm: &LlmClient,
    contract_text: &str,
    prompt_template: Option<&str>,
) -> Result<AuditRun, AppError> {
    if contract_text.trim().is_empty() {
        return Err(AppError::Validation(
            "contract_text cannot be empty".to_string(),
        ));
    }

    let template = prompt_template.unwrap_or(AUDIT_PROMPT_TEMPLATE);
    if !template.contains("{contract}") {
        return Err(AppError::Validation(
            "prompt_template must contain a {contract} placeholder".to_string(),
        ));
    }

    let prompt = fill_template(
        template,
        &[
            ("verbatim_instruction", VERBATIM_EXCERPT_INSTRUCTION),
            ("json_instruction", JSON_ONLY_INSTRUCTION),
            ("contract", contract_text),
        ],
    );

    let audit_id = Uuid::new_v4();
    info!(%audit_id, chars = contract_text.chars().count(), "starting contract audit");

    let content = llm
        .complete(&prompt, AUDIT_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Contract audit failed: {e}")))?;

    let draft = parse_audit_response(&content)
        .map_err(|e| AppError::Llm(format!("Contract audit returned an unusable answer: {e}")))?;

    info!(%audit_id, risks = draft.risks.len(), "contract audit finished");

    Ok(AuditRun {
        audit_id,
        model: llm.model().to_string(),
        completed_at: Utc::now(),
        draft,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Rendered view
// ────────────────────────────────────────────────────────────────────────────

/// A click on either side of the cross-reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Selection {
    List { annotation_id: String },
    Highlight { annotation_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    Highlighted,
    Unresolved,
    Overlapped,
}

#[derive(Debug, Serialize)]
pub struct SegmentView<'a> {
    #[serde(flatten)]
    pub segment: Segment<'a>,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct RiskView<'a> {
    #[serde(flatten)]
    pub annotation: &'a Annotation,
    pub status: RiskStatus,
    /// Character offsets, present only when highlighted.
    pub span: Option<CharSpan>,
    pub strategy: Option<MatchStrategy>,
    /// Anchor-only match: the highlight end is an estimate.
    pub approximate: bool,
    /// Offered for single / bulk apply.
    pub applicable: bool,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct RenderedDocument<'a> {
    pub segments: Vec<SegmentView<'a>>,
    pub risks: Vec<RiskView<'a>>,
    pub unresolved_ids: Vec<&'a str>,
    pub overlapped_ids: Vec<&'a str>,
    /// A non-empty risk list of which nothing could be matched.
    pub zero_resolution: bool,
    pub focus: Option<FocusTarget>,
}

/// Resolves `annotations` against `document` and lays out everything the
/// client needs for one render pass.
pub fn render_document<'a>(
    document: &'a str,
    annotations: &'a [Annotation],
    selection: Option<&Selection>,
) -> RenderedDocument<'a> {
    let plan = build_spans(document, annotations);
    let mut xref = CrossReference::default();

    let focus = selection.map(|selection| match selection {
        Selection::List { annotation_id } => xref.select_from_list(annotation_id, &plan),
        Selection::Highlight { annotation_id } => xref.select_from_highlight(annotation_id),
    });
    xref.retain(annotations.iter().map(|a| a.id.as_str()));
    let focus = focus.filter(|_| xref.active().is_some());

    if plan.is_zero_resolution() {
        warn!(
            risks = annotations.len(),
            "no risk excerpt could be matched in the document"
        );
    }

    let segments = render_segments(document, &plan.highlights)
        .into_iter()
        .map(|segment| SegmentView {
            active: segment.annotation_id().is_some_and(|id| xref.is_active(id)),
            segment,
        })
        .collect();

    let risks = annotations
        .iter()
        .map(|annotation| risk_view(document, annotation, &plan, &xref))
        .collect();

    RenderedDocument {
        segments,
        risks,
        zero_resolution: plan.is_zero_resolution(),
        unresolved_ids: plan.unresolved,
        overlapped_ids: plan.overlapped,
        focus,
    }
}

fn risk_view<'a>(
    document: &str,
    annotation: &'a Annotation,
    plan: &HighlightPlan<'a>,
    xref: &CrossReference,
) -> RiskView<'a> {
    let highlight = plan.highlight_for(&annotation.id);
    let status = match highlight {
        Some(_) => RiskStatus::Highlighted,
        None if plan.overlapped.contains(&annotation.id.as_str()) => RiskStatus::Overlapped,
        None => RiskStatus::Unresolved,
    };

    RiskView {
        annotation,
        status,
        span: highlight.map(|h| h.span.char_offsets(document)),
        strategy: highlight.map(|h| h.strategy),
        approximate: highlight.is_some_and(|h| h.strategy.is_approximate()),
        applicable: !annotation.is_informational() && status != RiskStatus::Unresolved,
        active: xref.is_active(&annotation.id),
    }
}
