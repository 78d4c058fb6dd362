//! Annotation set builder: resolves every annotation against one document
//! and keeps a non-overlapping, position-sorted set of highlights.

use tracing::debug;

use crate::models::annotation::Annotation;
use crate::reconcile::locator::{Locator, MatchStrategy};
use crate::reconcile::span::Span;

/// An annotation paired with its span in one specific document.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedAnnotation<'a> {
    pub annotation: &'a Annotation,
    pub span: Span,
    pub strategy: MatchStrategy,
}

/// Result of resolving an annotation list against a document.
#[derive(Debug, Clone, Default)]
pub struct HighlightPlan<'a> {
    /// Sorted by `span.start`, pairwise non-overlapping.
    pub highlights: Vec<ResolvedAnnotation<'a>>,
    /// Ids whose excerpt could not be located. They stay in the caller's
    /// annotation list, they just have no highlight.
    pub unresolved: Vec<&'a str>,
    /// Ids that resolved but lost to an earlier-starting highlight.
    pub overlapped: Vec<&'a str>,
    total: usize,
}

impl<'a> HighlightPlan<'a> {
    /// True when a non-empty annotation list produced no highlight at all.
    pub fn is_zero_resolution(&self) -> bool {
        self.total > 0 && self.highlights.is_empty()
    }

    pub fn highlight_for(&self, annotation_id: &str) -> Option<&ResolvedAnnotation<'a>> {
        self.highlights
            .iter()
            .find(|h| h.annotation.id == annotation_id)
    }
}

/// Resolves annotations in input order, sorts by start, then drops any
/// highlight that starts before the previous kept one ends. The earliest
/// start always wins, regardless of severity; equal starts keep input order.
pub fn build_spans<'a>(document: &str, annotations: &'a [Annotation]) -> HighlightPlan<'a> {
    let locator = Locator::new(document);
    let mut resolved = Vec::with_capacity(annotations.len());
    let mut unresolved = Vec::new();

    for annotation in annotations {
        match locator.locate(&annotation.excerpt) {
            Some(location) => resolved.push(ResolvedAnnotation {
                annotation,
                span: location.span,
                strategy: location.strategy,
            }),
            None => unresolved.push(annotation.id.as_str()),
        }
    }

    // stable: ties keep input order
    resolved.sort_by_key(|r| r.span.start);

    let (highlights, overlapped) = drop_overlaps(resolved);

    debug!(
        total = annotations.len(),
        highlighted = highlights.len(),
        unresolved = unresolved.len(),
        overlapped = overlapped.len(),
        "highlight plan built"
    );

    HighlightPlan {
        highlights,
        unresolved,
        overlapped: overlapped.into_iter().map(|r| r.annotation.id.as_str()).collect(),
        total: annotations.len(),
    }
}

/// Greedy filter over start-sorted entries. Returns `(kept, dropped)`.
pub(crate) fn drop_overlaps<'a>(
    sorted: Vec<ResolvedAnnotation<'a>>,
) -> (Vec<ResolvedAnnotation<'a>>, Vec<ResolvedAnnotation<'a>>) {
    let mut kept: Vec<ResolvedAnnotation<'a>> = Vec::with_capacity(sorted.len());
    let mut dropped = Vec::new();

    for entry in sorted {
        // Kept spans are disjoint and ordered, so only the last can collide.
        if kept.last().is_some_and(|last| last.span.overlaps(&entry.span)) {
            dropped.push(entry);
        } else {
            kept.push(entry);
        }
    }

    (kept, dropped)
}
