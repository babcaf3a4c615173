/// A region of source text.
///
/// Lines and columns are 1-based. `length` is measured in characters and is
/// only used to draw an underline beneath the region when an error is
/// rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// The source line of the first character.
    pub line:   usize,
    /// The column of the first character.
    pub column: usize,
    /// The number of characters covered.
    pub length: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(line: usize, column: usize, length: usize) -> Self {
        Self { line,
               column,
               length }
    }

    /// Returns a span stretching from the start of `self` to the end of
    /// `other`.
    ///
    /// When the two spans sit on different lines the result keeps the first
    /// line and extends to the end of it, which is all a single-line
    /// underline can show anyway.
    ///
    /// ## Example
    /// ```
    /// use lilt::util::span::Span;
    ///
    /// let left = Span::new(1, 1, 3);
    /// let right = Span::new(1, 7, 2);
    ///
    /// assert_eq!(left.to(right), Span::new(1, 1, 8));
    /// ```
    #[must_use]
    pub const fn to(self, other: Self) -> Self {
        if other.line != self.line || other.column < self.column {
            return self;
        }
        Self { line:   self.line,
               column: self.column,
               length: other.column + other.length - self.column, }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
