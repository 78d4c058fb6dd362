use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into one specific document value.
///
/// Both ends always sit on `char` boundaries of the document the span was
/// resolved against. A span is meaningless for any other document version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} after end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The covered text. Returns `None` if the span does not fit `document`.
    pub fn slice<'a>(&self, document: &'a str) -> Option<&'a str> {
        document.get(self.start..self.end)
    }

    /// Converts byte offsets into character offsets, for clients that index
    /// text by character.
    pub fn char_offsets(&self, document: &str) -> CharSpan {
        let start = document[..self.start].chars().count();
        let len = document[self.start..self.end].chars().count();
        CharSpan {
            start,
            end: start + len,
        }
    }
}

/// Character-indexed view of a [`Span`], as sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_half_open() {
        let a = Span::new(0, 5);
        assert!(!a.overlaps(&Span::new(5, 9)));
        assert!(a.overlaps(&Span::new(4, 9)));
        assert!(Span::new(2, 3).overlaps(&a));
    }

    #[test]
    fn test_char_offsets_on_multibyte_text() {
        let doc = "甲方应在签订合同后30天内支付";
        let start = doc.find("签订").unwrap();
        let span = Span::new(start, start + "签订合同".len());
        assert_eq!(span.slice(doc), Some("签订合同"));
        assert_eq!(span.char_offsets(doc), CharSpan { start: 4, end: 8 });
    }

    #[test]
    fn test_slice_out_of_range_is_none() {
        assert_eq!(Span::new(3, 40).slice("short"), None);
    }
}
