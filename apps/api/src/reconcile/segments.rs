use serde::Serialize;

use crate::models::annotation::RiskLevel;
use crate::reconcile::plan::ResolvedAnnotation;

/// One display run of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment<'a> {
    Plain {
        text: &'a str,
    },
    Annotated {
        text: &'a str,
        annotation_id: &'a str,
        level: RiskLevel,
    },
}

impl<'a> Segment<'a> {
    #[cfg(test)]
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Plain { text } | Segment::Annotated { text, .. } => *text,
        }
    }

    pub fn annotation_id(&self) -> Option<&'a str> {
        match self {
            Segment::Plain { .. } => None,
            Segment::Annotated { annotation_id, .. } => Some(*annotation_id),
        }
    }
}

/// Partitions `document` into plain and annotated runs.
///
/// `highlights` must be sorted and non-overlapping, as produced by
/// `plan::build_spans`. Concatenating every segment's text always yields
/// `document` back. With no highlights the whole document is one plain run.
pub fn render_segments<'a>(
    document: &'a str,
    highlights: &[ResolvedAnnotation<'a>],
) -> Vec<Segment<'a>> {
    if highlights.is_empty() {
        return vec![Segment::Plain { text: document }];
    }

    let mut segments = Vec::with_capacity(highlights.len() * 2 + 1);
    let mut cursor = 0;

    for highlight in highlights {
        let span = highlight.span;
        if span.start > cursor {
            segments.push(Segment::Plain {
                text: &document[cursor..span.start],
            });
        }
        segments.push(Segment::Annotated {
            text: &document[span.start..span.end],
            annotation_id: &highlight.annotation.id,
            level: highlight.annotation.level,
        });
        cursor = span.end;
    }

    if cursor < document.len() {
        segments.push(Segment::Plain {
            text: &document[cursor..],
        });
    }

    segments
}
