// Shared source-location types

/// A byte-offset span into the original source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: usize,
    /// Ending byte offset (exclusive).
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered by the span.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(span: pest::Span<'_>) -> Self {
        Span::new(span.start(), span.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pest_span_converts_to_byte_offsets() {
        let input = "service S {}";
        let span = Span::from(pest::Span::new(input, 8, 9).unwrap());
        assert_eq!(span, Span::new(8, 9));
        assert_eq!(span.len(), 1);
    }

    #[test]
    fn inverted_span_is_empty() {
        assert!(Span::new(9, 3).is_empty());
    }
}
