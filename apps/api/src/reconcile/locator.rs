//! Fuzzy excerpt locator.
//!
//! Finds where a model-reported excerpt sits inside the source document.
//! Strategies are tried in order and the first hit wins:
//!
//! 1. exact substring
//! 2. whitespace-insensitive match, mapped back to original offsets
//! 3. anchor match on the first 15 characters, with an estimated end
//!
//! Excerpts shorter than 4 characters are never located.

use std::cell::OnceCell;

use serde::Serialize;
use tracing::debug;

use crate::reconcile::span::Span;

/// Excerpts with fewer characters than this are too ambiguous to trust.
pub const MIN_EXCERPT_CHARS: usize = 4;
/// Leading characters of the excerpt used as the anchor.
pub const ANCHOR_CHARS: usize = 15;
/// Extra characters added past the excerpt length for anchor matches.
pub const ANCHOR_SLACK_CHARS: usize = 20;

/// Which step of the cascade produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Normalized,
    Anchor,
}

impl MatchStrategy {
    /// Anchor matches estimate their end offset and may cover slightly more
    /// or less text than the excerpt.
    pub fn is_approximate(&self) -> bool {
        matches!(self, MatchStrategy::Anchor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub span: Span,
    pub strategy: MatchStrategy,
}

/// Locates `excerpt` in `document`. Pure; `None` means "no highlight".
#[cfg(test)]
pub fn locate(document: &str, excerpt: &str) -> Option<Span> {
    Locator::new(document).locate(excerpt).map(|l| l.span)
}

/// Locates `excerpt` in `document` and reports the winning strategy.
pub fn locate_with_strategy(document: &str, excerpt: &str) -> Option<Location> {
    Locator::new(document).locate(excerpt)
}

/// Locator bound to one document snapshot.
///
/// The whitespace-stripped copy of the document is built on first use and
/// shared by every later lookup.
pub struct Locator<'a> {
    document: &'a str,
    condensed: OnceCell<Condensed>,
}

impl<'a> Locator<'a> {
    pub fn new(document: &'a str) -> Self {
        Self {
            document,
            condensed: OnceCell::new(),
        }
    }

    pub fn locate(&self, excerpt: &str) -> Option<Location> {
        let excerpt_chars = excerpt.chars().count();
        if excerpt_chars < MIN_EXCERPT_CHARS {
            debug!(excerpt_chars, "excerpt below minimum length, not located");
            return None;
        }

        if let Some(start) = self.document.find(excerpt) {
            return Some(Location {
                span: Span::new(start, start + excerpt.len()),
                strategy: MatchStrategy::Exact,
            });
        }

        let condensed = self.condensed();

        if let Some(span) = condensed.find(&strip_whitespace(excerpt)) {
            return Some(Location {
                span,
                strategy: MatchStrategy::Normalized,
            });
        }

        let anchor: String = excerpt
            .chars()
            .take(ANCHOR_CHARS)
            .filter(|c| !c.is_whitespace())
            .collect();
        if let Some(anchor_span) = condensed.find(&anchor) {
            let start = anchor_span.start;
            let end = advance_chars(self.document, start, excerpt_chars + ANCHOR_SLACK_CHARS);
            debug!(start, end, "excerpt located by anchor only");
            return Some(Location {
                span: Span::new(start, end),
                strategy: MatchStrategy::Anchor,
            });
        }

        debug!(excerpt_chars, "excerpt not found in document");
        None
    }

    fn condensed(&self) -> &Condensed {
        self.condensed.get_or_init(|| Condensed::new(self.document))
    }
}

/// Whitespace-stripped copy of a document plus the way back.
///
/// `origin[i]` is the byte offset in the original document of byte `i` of
/// `text`. Bytes of one char stay contiguous, so the end of a match maps to
/// `origin[last_byte] + 1`.
struct Condensed {
    text: String,
    origin: Vec<usize>,
}

impl Condensed {
    fn new(document: &str) -> Self {
        let mut text = String::with_capacity(document.len());
        let mut origin = Vec::with_capacity(document.len());
        for (offset, ch) in document.char_indices() {
            if ch.is_whitespace() {
                continue;
            }
            text.push(ch);
            origin.extend(offset..offset + ch.len_utf8());
        }
        Self { text, origin }
    }

    fn find(&self, needle: &str) -> Option<Span> {
        if needle.is_empty() {
            return None;
        }
        let at = self.text.find(needle)?;
        let start = self.origin[at];
        let end = self.origin[at + needle.len() - 1] + 1;
        Some(Span::new(start, end))
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Byte offset `count` characters after `start`, clamped to the document end.
fn advance_chars(document: &str, start: usize, count: usize) -> usize {
    document[start..]
        .char_indices()
        .nth(count)
        .map(|(i, _)| start + i)
        .unwrap_or(document.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squeeze(text: &str) -> String {
        strip_whitespace(text)
    }

    #[test]
    fn test_exact_match_returns_first_occurrence() {
        let doc = "pay the fee, then pay the fee again";
        let span = locate(doc, "pay the fee").unwrap();
        assert_eq!(span, Span::new(0, 11));
        assert_eq!(span.slice(doc), Some("pay the fee"));
    }

    #[test]
    fn test_exact_substrings_round_trip() {
        let doc = "Clause 4. The Supplier shall deliver within 10 business days.\nClause 5. Fees.";
        for (start, _) in doc.char_indices() {
            for len in [4usize, 7, 12] {
                let Some(excerpt) = doc[start..].char_indices().nth(len).map(|(i, _)| &doc[start..start + i]) else {
                    continue;
                };
                let span = locate(doc, excerpt).unwrap();
                assert_eq!(span.slice(doc), Some(excerpt));
            }
        }
    }

    #[test]
    fn test_short_excerpts_are_rejected() {
        assert_eq!(locate("abc abc abc", "abc"), None);
        assert_eq!(locate("甲方乙方", "甲方乙"), None);
        assert_eq!(locate("", ""), None);
        assert!(locate("甲方乙方", "甲方乙方").is_some());
    }

    #[test]
    fn test_whitespace_tolerant_match() {
        let doc = "clause A.  Payment due in 30 days.";
        let excerpt = "Payment due in 30\ndays";
        let location = locate_with_strategy(doc, excerpt).unwrap();
        assert_eq!(location.strategy, MatchStrategy::Normalized);
        let covered = location.span.slice(doc).unwrap();
        assert_eq!(squeeze(covered), squeeze(excerpt));
        assert_eq!(covered, "Payment due in 30 days");
    }

    #[test]
    fn test_normalized_match_spans_line_breaks_in_document() {
        let doc = "The Lessee shall\r\n   indemnify the Lessor\tagainst all claims.";
        let excerpt = "shall indemnify the Lessor against";
        let span = locate(doc, excerpt).unwrap();
        assert_eq!(
            span.slice(doc),
            Some("shall\r\n   indemnify the Lessor\tagainst")
        );
    }

    #[test]
    fn test_normalized_match_with_ideographic_space() {
        let doc = "乙方保留　追究责任的权利。";
        let span = locate(doc, "乙方保留追究责任").unwrap();
        assert_eq!(span.slice(doc), Some("乙方保留　追究责任"));
    }

    #[test]
    fn test_anchor_match_estimates_end() {
        let doc = "Termination. Either party may terminate this agreement upon thirty days notice in writing.";
        // Prefix matches, tail was paraphrased by the model.
        let excerpt = "Either party may terminate on short notice";
        let location = locate_with_strategy(doc, excerpt).unwrap();
        assert_eq!(location.strategy, MatchStrategy::Anchor);
        assert!(location.strategy.is_approximate());
        let start = doc.find("Either").unwrap();
        assert_eq!(location.span.start, start);
        assert_eq!(
            location.span.end,
            start + excerpt.chars().count() + ANCHOR_SLACK_CHARS
        );
    }

    #[test]
    fn test_anchor_end_is_clamped_to_document() {
        let doc = "Fees. The Client pays monthly";
        let excerpt = "The Client pays quarterly in advance";
        let location = locate_with_strategy(doc, excerpt).unwrap();
        assert_eq!(location.strategy, MatchStrategy::Anchor);
        assert_eq!(location.span.end, doc.len());
    }

    #[test]
    fn test_anchor_end_counts_characters_not_bytes() {
        let doc = "第一条：甲方应在签订合同后三十日内一次性支付全部款项，逾期按日万分之五支付违约金，并承担乙方因此产生的全部损失。";
        let excerpt = "甲方应在签订合同后三十日内一次性分期付清";
        let location = locate_with_strategy(doc, excerpt).unwrap();
        assert_eq!(location.strategy, MatchStrategy::Anchor);
        let covered = location.span.slice(doc).unwrap();
        assert_eq!(
            covered.chars().count(),
            excerpt.chars().count() + ANCHOR_SLACK_CHARS
        );
    }

    #[test]
    fn test_unrelated_excerpt_is_not_found() {
        assert_eq!(locate("The quick brown fox", "lazy dog sleeps"), None);
    }

    #[test]
    fn test_whitespace_only_excerpt_without_exact_hit() {
        assert_eq!(locate("no gaps here", "    \n"), None);
    }

    #[test]
    fn test_chinese_scenario_exact_span() {
        let doc = "甲方应在签订合同后30天内支付款项。乙方保留追究责任的权利。";
        let excerpt = "签订合同后30天内支付";
        let span = locate(doc, excerpt).unwrap();
        assert_eq!(span.slice(doc), Some(excerpt));
    }

    #[test]
    fn test_locator_reuses_condensed_document() {
        let doc = "alpha  beta\ngamma delta";
        let locator = Locator::new(doc);
        assert_eq!(
            locator.locate("alpha beta").map(|l| l.strategy),
            Some(MatchStrategy::Normalized)
        );
        assert_eq!(
            locator.locate("beta gamma").map(|l| l.span.slice(doc).unwrap()),
            Some("beta\ngamma")
        );
    }
}
