//! Boundary between the model's loosely typed JSON and `Annotation`.
//!
//! Everything the model returns is coerced here, so the reconciliation core
//! only ever sees well-formed annotations.

use serde_json::Value;
use tracing::warn;

use crate::llm_client::{strip_json_fences, widest_slice, LlmError};
use crate::models::annotation::{Annotation, RiskLevel};

const DEFAULT_TITLE: &str = "Untitled risk";
const DEFAULT_SUMMARY: &str = "Review complete";

#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub risks: Vec<Annotation>,
    pub summary: String,
}

/// Extracts risk records from raw model output.
///
/// Accepts either `{"summary": ..., "risks": [...]}` or a bare array of
/// records, optionally wrapped in code fences or prose.
pub fn parse_audit_response(content: &str) -> Result<AuditDraft, LlmError> {
    let cleaned = strip_json_fences(content);

    let mut records: Vec<Value> = Vec::new();
    let mut summary = None;

    // Object form first so its summary is not lost to the inner array.
    if let Some(object) = widest_slice(&cleaned, '{', '}')
        .and_then(|slice| serde_json::from_str::<Value>(slice).ok())
        .filter(Value::is_object)
    {
        if let Some(risks) = object.get("risks").and_then(Value::as_array) {
            records = risks.clone();
            summary = string_field(&object, &["summary"]);
        }
    }

    if records.is_empty() {
        if let Some(Value::Array(items)) = widest_slice(&cleaned, '[', ']')
            .and_then(|slice| serde_json::from_str::<Value>(slice).ok())
        {
            records = items;
        }
    }

    if records.is_empty() {
        return Err(LlmError::Unusable(
            "expected a JSON array of risks or an object with a `risks` array".to_string(),
        ));
    }

    let risks: Vec<Annotation> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            if !record.is_object() {
                warn!(index, "skipping non-object risk record");
                return None;
            }
            Some(coerce_risk(index, record))
        })
        .collect();

    if risks.is_empty() {
        return Err(LlmError::Unusable("no risk record was a JSON object".to_string()));
    }

    Ok(AuditDraft {
        risks,
        summary: summary.unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
    })
}

fn coerce_risk(index: usize, record: &Value) -> Annotation {
    let level = string_field(record, &["level", "risk_level"])
        .and_then(|raw| RiskLevel::parse_lenient(&raw))
        .unwrap_or_default();

    let excerpt = string_field(record, &["excerpt", "original_text"]).unwrap_or_default();
    let replacement = string_field(record, &["replacement", "suggestion"]).unwrap_or_default();

    Annotation {
        title: string_field(record, &["title", "risk_type"])
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        analysis: string_field(record, &["analysis"]).unwrap_or_default(),
        ..Annotation::new(format!("risk-{index}"), level, excerpt).with_replacement(replacement)
    }
}

/// First non-empty string among `keys`. Non-string values count as absent.
fn string_field(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
