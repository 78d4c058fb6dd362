//! Replacement engine.
//!
//! Every call resolves spans against the document it is given. Spans from an
//! earlier render pass are never trusted because the document may have
//! changed since.

use std::cmp::Reverse;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::annotation::Annotation;
use crate::reconcile::locator::{locate_with_strategy, Locator, MatchStrategy};
use crate::reconcile::plan::{drop_overlaps, ResolvedAnnotation};
use crate::reconcile::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// Spliced over the span found by `strategy`.
    Applied { strategy: MatchStrategy },
    /// The excerpt could not be found; the user has to edit by hand.
    NotLocated,
    /// Empty replacement. Nothing is ever offered for these.
    Informational,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleApply {
    pub document: String,
    pub outcome: ApplyOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkApply {
    pub document: String,
    pub applied_count: usize,
    /// Ids applied, in document order.
    pub applied_ids: Vec<String>,
    /// Ids left untouched: unresolved, informational, or overlapping an
    /// applied span.
    pub skipped_ids: Vec<String>,
    /// Applied ids whose span came from an anchor match and may cover
    /// neighbouring text.
    pub approximate_ids: Vec<String>,
}

/// Splices `annotation.replacement` over its excerpt in `document`.
pub fn apply_one(document: &str, annotation: &Annotation) -> SingleApply {
    if annotation.is_informational() {
        return SingleApply {
            document: document.to_string(),
            outcome: ApplyOutcome::Informational,
        };
    }

    let Some(location) = locate_with_strategy(document, &annotation.excerpt) else {
        debug!(id = %annotation.id, "replacement target not located");
        return SingleApply {
            document: document.to_string(),
            outcome: ApplyOutcome::NotLocated,
        };
    };

    if location.strategy.is_approximate() {
        warn!(
            id = %annotation.id,
            covered = location.span.slice(document).unwrap_or_default(),
            "replacing an approximate anchor match"
        );
    }

    SingleApply {
        document: splice(document, location.span, &annotation.replacement),
        outcome: ApplyOutcome::Applied {
            strategy: location.strategy,
        },
    }
}

/// Applies every resolvable, non-informational annotation in one pass.
///
/// All spans come from the original `document`. Overlaps are settled the same
/// way as for highlighting (earliest start wins; ties go to the longer span,
/// then the smaller id) so input order never changes the result. Splices then
/// run from the highest start offset down, which keeps every pending span valid.
/// When nothing applies the returned document equals the input.
pub fn apply_all(document: &str, annotations: &[Annotation]) -> BulkApply {
    let locator = Locator::new(document);
    let mut resolved = Vec::with_capacity(annotations.len());
    let mut skipped_ids = Vec::new();

    for annotation in annotations {
        if annotation.is_informational() {
            skipped_ids.push(annotation.id.clone());
            continue;
        }
        match locator.locate(&annotation.excerpt) {
            Some(location) => resolved.push(ResolvedAnnotation {
                annotation,
                span: location.span,
                strategy: location.strategy,
            }),
            None => skipped_ids.push(annotation.id.clone()),
        }
    }

    resolved.sort_by(|a, b| {
        (a.span.start, Reverse(a.span.end), &a.annotation.id).cmp(&(
            b.span.start,
            Reverse(b.span.end),
            &b.annotation.id,
        ))
    });
    let (kept, overlapped) = drop_overlaps(resolved);
    skipped_ids.extend(overlapped.iter().map(|r| r.annotation.id.clone()));

    let applied_ids: Vec<String> = kept.iter().map(|r| r.annotation.id.clone()).collect();
    let approximate_ids: Vec<String> = kept
        .iter()
        .filter(|r| r.strategy.is_approximate())
        .map(|r| r.annotation.id.clone())
        .collect();

    let mut output = document.to_string();
    for entry in kept.iter().rev() {
        output.replace_range(entry.span.start..entry.span.end, &entry.annotation.replacement);
    }

    info!(
        total = annotations.len(),
        applied = applied_ids.len(),
        skipped = skipped_ids.len(),
        approximate = approximate_ids.len(),
        "bulk replacement finished"
    );

    BulkApply {
        document: output,
        applied_count: applied_ids.len(),
        applied_ids,
        skipped_ids,
        approximate_ids,
    }
}

fn splice(document: &str, span: Span, replacement: &str) -> String {
    let mut out = String::with_capacity(document.len() - span.len() + replacement.len());
    out.push_str(&document[..span.start]);
    out.push_str(replacement);
    out.push_str(&document[span.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::RiskLevel;
    use crate::reconcile::locator::locate;

    fn fix(id: &str, excerpt: &str, replacement: &str) -> Annotation {
        Annotation::new(id, RiskLevel::High, excerpt).with_replacement(replacement)
    }

    const CN_DOC: &str = "甲方应在签订合同后30天内支付款项。乙方保留追究责任的权利。";

    #[test]
    fn test_apply_one_chinese_scenario() {
        let a = fix("r1", "签订合同后30天内支付", "签订合同后15天内支付");
        let result = apply_one(CN_DOC, &a);
        assert_eq!(
            result.outcome,
            ApplyOutcome::Applied {
                strategy: MatchStrategy::Exact
            }
        );
        assert_eq!(
            result.document,
            "甲方应在签订合同后15天内支付款项。乙方保留追究责任的权利。"
        );
    }

    #[test]
    fn test_apply_one_equals_manual_splice() {
        let doc = "The fee is payable within 90 days of invoice.";
        let a = fix("fee", "within 90 days", "within 30 days");
        let span = locate(doc, &a.excerpt).unwrap();
        let expected = format!("{}{}{}", &doc[..span.start], a.replacement, &doc[span.end..]);
        let result = apply_one(doc, &a);
        assert_eq!(result.document, expected);
        assert_eq!(locate(&result.document, &a.excerpt), None);
    }

    #[test]
    fn test_apply_one_uses_whitespace_tolerant_span() {
        let doc = "Liability is\n  unlimited for the Supplier.";
        let a = fix("cap", "Liability is unlimited", "Liability is capped at fees paid");
        let result = apply_one(doc, &a);
        assert_eq!(
            result.outcome,
            ApplyOutcome::Applied {
                strategy: MatchStrategy::Normalized
            }
        );
        assert_eq!(result.document, "Liability is capped at fees paid for the Supplier.");
    }

    #[test]
    fn test_apply_one_not_located_leaves_document() {
        let doc = "Short and simple.";
        let result = apply_one(doc, &fix("x", "arbitration clause", "court"));
        assert_eq!(result.outcome, ApplyOutcome::NotLocated);
        assert_eq!(result.document, doc);
    }

    #[test]
    fn test_apply_one_informational_is_not_applied() {
        let doc = "Governing law is Delaware.";
        let a = Annotation::new("info", RiskLevel::Info, "Governing law");
        let result = apply_one(doc, &a);
        assert_eq!(result.outcome, ApplyOutcome::Informational);
        assert_eq!(result.document, doc);
    }

    #[test]
    fn test_apply_all_order_independent() {
        let doc = "Payment within 60 days. Penalty of 10% per day. Notice by fax.";
        let a1 = fix("a1", "within 60 days", "within 30 days");
        let a2 = fix("a2", "10% per day", "0.05% per day");
        let forward = apply_all(doc, &[a1.clone(), a2.clone()]);
        let backward = apply_all(doc, &[a2, a1]);
        assert_eq!(forward.document, backward.document);
        assert_eq!(
            forward.document,
            "Payment within 30 days. Penalty of 0.05% per day. Notice by fax."
        );
        assert_eq!(forward.applied_count, 2);
        assert_eq!(forward.applied_ids, vec!["a1", "a2"]);
    }

    #[test]
    fn test_apply_all_length_changes_do_not_corrupt_offsets() {
        let doc = "A: x1x1. B: y2y2. C: z3z3.";
        let annotations = vec![
            fix("a", "x1x1", "a much longer replacement"),
            fix("b", "y2y2", ""),
            fix("c", "z3z3", "z"),
        ];
        // "b" is informational (empty replacement) and must be skipped.
        let result = apply_all(doc, &annotations);
        assert_eq!(result.document, "A: a much longer replacement. B: y2y2. C: z.");
        assert_eq!(result.applied_count, 2);
        assert_eq!(result.skipped_ids, vec!["b"]);
    }

    #[test]
    fn test_apply_all_total_failure_keeps_document() {
        let doc = "Nothing here matches.";
        let result = apply_all(
            doc,
            &[fix("a", "force majeure", "x"), fix("b", "abc", "y")],
        );
        assert_eq!(result.document, doc);
        assert_eq!(result.applied_count, 0);
        assert_eq!(result.skipped_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_apply_all_partial_failure_reports_count() {
        let doc = "Deposit is non-refundable. Rent rises 20% yearly.";
        let result = apply_all(
            doc,
            &[
                fix("dep", "non-refundable", "refundable"),
                fix("ghost", "automatic renewal", "manual renewal"),
            ],
        );
        assert_eq!(result.applied_count, 1);
        assert_eq!(result.document, "Deposit is refundable. Rent rises 20% yearly.");
        assert_eq!(result.skipped_ids, vec!["ghost"]);
    }

    #[test]
    fn test_apply_all_overlaps_resolved_deterministically() {
        let doc = "The Tenant shall pay all repairs and all taxes.";
        let wide = fix("wide", "pay all repairs and all taxes", "pay ordinary repairs");
        let narrow = fix("narrow", "all repairs", "minor repairs");
        let one = apply_all(doc, &[narrow.clone(), wide.clone()]);
        let two = apply_all(doc, &[wide, narrow]);
        assert_eq!(one.document, two.document);
        assert_eq!(one.document, "The Tenant shall pay ordinary repairs.");
        assert_eq!(one.skipped_ids, vec!["narrow"]);
    }

    #[test]
    fn test_apply_all_duplicate_excerpt_applies_once() {
        let doc = "Term: 10 years. Renewal: automatic.";
        let result = apply_all(
            doc,
            &[fix("b", "10 years", "2 years"), fix("a", "10 years", "3 years")],
        );
        assert_eq!(result.applied_count, 1);
        assert_eq!(result.document, "Term: 3 years. Renewal: automatic.");
    }

    #[test]
    fn test_apply_one_reports_anchor_match() {
        let doc = "Fees. The Client pays monthly";
        let a = fix("fees", "The Client pays quarterly in advance", "The Client pays on delivery");
        let result = apply_one(doc, &a);
        assert_eq!(
            result.outcome,
            ApplyOutcome::Applied {
                strategy: MatchStrategy::Anchor
            }
        );
        assert_eq!(result.document, "Fees. The Client pays on delivery");
    }

    #[test]
    fn test_apply_all_lists_anchor_matched_ids() {
        let doc = "Term: 10 years. Fees. The Client pays monthly";
        let result = apply_all(
            doc,
            &[
                fix("term", "10 years", "2 years"),
                fix("fees", "The Client pays quarterly in advance", "The Client pays on delivery"),
            ],
        );
        assert_eq!(result.applied_ids, vec!["term", "fees"]);
        assert_eq!(result.approximate_ids, vec!["fees"]);
        assert_eq!(result.document, "Term: 2 years. Fees. The Client pays on delivery");
    }
}
