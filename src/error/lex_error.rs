use crate::util::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while tokenizing.
pub enum LexError {
    /// A tab character was found in the leading whitespace of a line.
    TabIndentation {
        /// Location of the tab.
        span: Span,
    },
    /// A line dedented to a level that was never pushed.
    InconsistentDedent {
        /// The indentation width that was found.
        found: usize,
        /// Location of the first character of the line.
        span:  Span,
    },
    /// A numeric prefix was not followed by a valid digit.
    InvalidNumber {
        /// The offending text.
        text: String,
        /// Location of the literal.
        span: Span,
    },
    /// A string literal was not closed before the end of the line.
    UnterminatedString {
        /// Location of the opening quote up to the end of the line.
        span: Span,
    },
    /// A character that starts no token.
    UnrecognizedCharacter {
        /// The offending text.
        text: String,
        /// Location of the character.
        span: Span,
    },
}

impl LexError {
    /// The error message without location information.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::TabIndentation { .. } => "Tabs are not allowed in indentation.".to_string(),
            Self::InconsistentDedent { found, .. } => {
                format!("Dedent to column {} does not match any enclosing indentation level.",
                        found + 1)
            },
            Self::InvalidNumber { text, .. } => format!("Invalid number literal '{text}'."),
            Self::UnterminatedString { .. } => "Unterminated string literal.".to_string(),
            Self::UnrecognizedCharacter { text, .. } => {
                format!("Unrecognized character '{text}'.")
            },
        }
    }

    /// The source region the error refers to.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::TabIndentation { span }
            | Self::InconsistentDedent { span, .. }
            | Self::InvalidNumber { span, .. }
            | Self::UnterminatedString { span }
            | Self::UnrecognizedCharacter { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let span = self.span();
        write!(f,
               "Error on line {}, column {}: {}",
               span.line,
               span.column,
               self.message())
    }
}

impl std::error::Error for LexError {}
