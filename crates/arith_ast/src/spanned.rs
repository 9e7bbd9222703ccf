//! Byte spans into the original source text

/// A trait for anything that can provide the [Span] it covers in the source
/// text
pub trait Spanned {
    fn span(&self) -> Span;
}

/// A half-open byte range within the source expression
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Span {
    offset: usize,
    len: usize,
}

impl Span {
    /// Creates a new span
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// The byte offset of the first covered byte
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The number of bytes covered
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The byte offset one past the last covered byte
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Whether `other` starts exactly where this span ends, with nothing in
    /// between
    pub const fn adjacent_to(&self, other: &Span) -> bool {
        self.end() == other.offset
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency() {
        let minus = Span::new(3, 1);
        let digits = Span::new(4, 2);
        assert!(minus.adjacent_to(&digits));
        assert!(!minus.adjacent_to(&Span::new(5, 1)));
    }
}
