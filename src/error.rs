use crate::util::span::Span;

/// Static binding errors.
///
/// Raised by the binder after parsing succeeds: identifiers used before (or
/// without) a definition, redefinitions in the same scope, unknown type
/// annotations, and calls that no known signature accepts.
pub mod bind_error;
/// Lexical errors.
///
/// Raised by the tokenizer for tab indentation, inconsistent dedents,
/// malformed numbers, unterminated strings and unrecognized characters.
pub mod lex_error;
/// Syntax errors.
///
/// Raised by the parser and the token source: unexpected tokens, malformed
/// call-argument sequences, missing blocks and positional arguments placed
/// after named ones.
pub mod parse_error;
/// Runtime errors.
///
/// Raised while evaluating: member access on `none`, calling a value that is
/// not callable, division by zero, and generic dispatch misses.
pub mod runtime_error;

pub use bind_error::BindError;
pub use lex_error::LexError;
pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;

/// Any error the language core can surface to a caller.
///
/// Every variant carries a message and a [`Span`], so callers can render a
/// caret underline beneath the offending source text without knowing which
/// phase failed.
#[derive(Debug)]
pub enum LanguageError {
    /// The source could not be tokenized.
    Lexical(LexError),
    /// The token stream could not be parsed.
    Syntax(ParseError),
    /// The parsed module failed static scope checking.
    Binding(BindError),
    /// Evaluation of a top-level statement failed.
    Runtime(RuntimeError),
}

impl LanguageError {
    /// A short name for the phase that failed.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Lexical(_) => "lexical error",
            Self::Syntax(_) => "syntax error",
            Self::Binding(_) => "binding error",
            Self::Runtime(_) => "runtime error",
        }
    }

    /// The human readable message, without location information.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Lexical(e) => e.message(),
            Self::Syntax(e) => e.message(),
            Self::Binding(e) => e.message(),
            Self::Runtime(e) => e.message(),
        }
    }

    /// The source region the error refers to.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Lexical(e) => e.span(),
            Self::Syntax(e) => e.span(),
            Self::Binding(e) => e.span(),
            Self::Runtime(e) => e.span(),
        }
    }

    /// 1-based line of the error.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.span().line
    }

    /// 1-based column of the error.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.span().column
    }

    /// Number of characters to underline.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.span().length
    }

    /// Renders the error with the offending source line and a caret
    /// underline.
    ///
    /// ## Example
    /// ```
    /// use lilt::parse_module;
    ///
    /// let source = "x: 1\ny: z";
    /// let err = parse_module(source, &[]).unwrap_err();
    /// let rendered = err.render(source);
    ///
    /// assert!(rendered.contains("y: z"));
    /// assert!(rendered.ends_with("   ^"));
    /// ```
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        let span = self.span();
        let mut out = format!("{}: {}", self.kind(), self.message());
        if let Some(text) = source.lines().nth(span.line.saturating_sub(1)) {
            let text = text.trim_end_matches('\r');
            let gutter = format!("{} | ", span.line);
            let padding = " ".repeat(gutter.len() + span.column.saturating_sub(1));
            out.push('\n');
            out.push_str(&gutter);
            out.push_str(text);
            out.push('\n');
            out.push_str(&padding);
            out.push_str(&"^".repeat(span.length.max(1)));
        }
        out
    }
}

impl std::fmt::Display for LanguageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexical(e) => e.fmt(f),
            Self::Syntax(e) => e.fmt(f),
            Self::Binding(e) => e.fmt(f),
            Self::Runtime(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for LanguageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lexical(e) => Some(e),
            Self::Syntax(e) => Some(e),
            Self::Binding(e) => Some(e),
            Self::Runtime(e) => Some(e),
        }
    }
}

impl From<LexError> for LanguageError {
    fn from(e: LexError) -> Self {
        Self::Lexical(e)
    }
}

impl From<ParseError> for LanguageError {
    fn from(e: ParseError) -> Self {
        Self::Syntax(e)
    }
}

impl From<BindError> for LanguageError {
    fn from(e: BindError) -> Self {
        Self::Binding(e)
    }
}

impl From<RuntimeError> for LanguageError {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}
