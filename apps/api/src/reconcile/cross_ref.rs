//! Links a rendered highlight with its entry in the risk list.
//!
//! Selecting either side activates the annotation and tells the renderer
//! what to scroll to on the other side.

use serde::Serialize;

use crate::reconcile::plan::HighlightPlan;

/// Where the UI should bring focus after a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum FocusTarget {
    /// Scroll the document view to this highlight.
    Highlight { annotation_id: String },
    /// Scroll the risk list to this entry.
    ListEntry { annotation_id: String },
    /// The entry is selected but has no highlight in this render pass.
    Unhighlighted { annotation_id: String },
}

#[derive(Debug, Clone, Default)]
pub struct CrossReference {
    active: Option<String>,
}

impl CrossReference {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_active(&self, annotation_id: &str) -> bool {
        self.active.as_deref() == Some(annotation_id)
    }

    /// User clicked an entry in the risk list.
    pub fn select_from_list(&mut self, annotation_id: &str, plan: &HighlightPlan<'_>) -> FocusTarget {
        self.active = Some(annotation_id.to_string());
        if plan.highlight_for(annotation_id).is_some() {
            FocusTarget::Highlight {
                annotation_id: annotation_id.to_string(),
            }
        } else {
            FocusTarget::Unhighlighted {
                annotation_id: annotation_id.to_string(),
            }
        }
    }

    /// User clicked a highlight in the document view.
    pub fn select_from_highlight(&mut self, annotation_id: &str) -> FocusTarget {
        self.active = Some(annotation_id.to_string());
        FocusTarget::ListEntry {
            annotation_id: annotation_id.to_string(),
        }
    }

    /// Drops the active selection if its annotation is no longer present.
    pub fn retain<'a>(&mut self, mut remaining_ids: impl Iterator<Item = &'a str>) {
        if let Some(active) = self.active.as_deref() {
            if !remaining_ids.any(|id| id == active) {
                self.active = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{Annotation, RiskLevel};
    use crate::reconcile::plan::build_spans;

    #[test]
    fn test_select_from_list_targets_highlight() {
        let doc = "Renewal is automatic unless cancelled.";
        let annotations = vec![
            Annotation::new("renew", RiskLevel::Medium, "Renewal is automatic"),
            Annotation::new("ghost", RiskLevel::High, "exclusive jurisdiction"),
        ];
        let plan = build_spans(doc, &annotations);
        let mut xref = CrossReference::default();

        assert_eq!(
            xref.select_from_list("renew", &plan),
            FocusTarget::Highlight {
                annotation_id: "renew".to_string()
            }
        );
        assert!(xref.is_active("renew"));

        assert_eq!(
            xref.select_from_list("ghost", &plan),
            FocusTarget::Unhighlighted {
                annotation_id: "ghost".to_string()
            }
        );
        assert!(!xref.is_active("renew"));
    }

    #[test]
    fn test_select_from_highlight_targets_list() {
        let mut xref = CrossReference::default();
        let target = xref.select_from_highlight("risk-2");
        assert_eq!(
            target,
            FocusTarget::ListEntry {
                annotation_id: "risk-2".to_string()
            }
        );
        assert_eq!(xref.active(), Some("risk-2"));
    }

    #[test]
    fn test_retain_clears_removed_selection() {
        let mut xref = CrossReference::default();
        xref.select_from_highlight("risk-1");
        xref.retain(["risk-0", "risk-1"].into_iter());
        assert!(xref.is_active("risk-1"));
        xref.retain(["risk-0"].into_iter());
        assert_eq!(xref.active(), None);
    }
}
