use crate::util::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while parsing.
pub enum ParseError {
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// What was found.
        token:    String,
        /// What the parser was looking for.
        expected: String,
        /// Location of the token.
        span:     Span,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// Location of the end of input.
        span: Span,
    },
    /// A closing parenthesis `)` was expected but not found.
    ExpectedClosingParen {
        /// Location where the parenthesis was expected.
        span: Span,
    },
    /// A line ending in `:` was not followed by an indented block.
    EmptyStatementBlock {
        /// Location of the line after the `:`.
        span: Span,
    },
    /// A line is indented further than its context allows.
    UnexpectedIndentation {
        /// Location of the indented line.
        span: Span,
    },
    /// A zero-argument call was immediately followed by `()` or another
    /// argument without being wrapped in parentheses first.
    CallAfterZeroArgumentCall {
        /// Location of the offending token.
        span: Span,
    },
    /// A positional argument followed a named, flag or enum argument.
    PositionalAfterNamed {
        /// Location of the positional argument.
        span: Span,
    },
    /// The value of an enum argument (`-name:value`) was not a bare
    /// identifier.
    EnumValueNotIdentifier {
        /// Location of the value.
        span: Span,
    },
    /// The left side of `:` was not a plain identifier.
    InvalidBindingTarget {
        /// Location of the left side.
        span: Span,
    },
    /// An argument was juxtaposed with something that cannot be called.
    InvalidCallHead {
        /// Location of the would-be head.
        span: Span,
    },
    /// A `-name` flag appeared outside of a call's argument list.
    FlagOutsideCall {
        /// Name of the flag.
        name: String,
        /// Location of the flag.
        span: Span,
    },
    /// A parameter list was malformed.
    InvalidParameter {
        /// Details about what is wrong.
        details: String,
        /// Location of the parameter.
        span:    Span,
    },
}

impl ParseError {
    /// The error message without location information.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::UnexpectedToken { token, expected, .. } => {
                format!("Unexpected token {token}, expected {expected}.")
            },
            Self::UnexpectedEndOfInput { .. } => "Unexpected end of input.".to_string(),
            Self::ExpectedClosingParen { .. } => {
                "Expected closing parenthesis ')' but none found.".to_string()
            },
            Self::EmptyStatementBlock { .. } => {
                "Empty statement block: expected an indented line after ':'.".to_string()
            },
            Self::UnexpectedIndentation { .. } => "Unexpected indentation.".to_string(),
            Self::CallAfterZeroArgumentCall { .. } => {
                "A zero-argument call cannot be called again or given more arguments; wrap it \
                 in parentheses first."
                    .to_string()
            },
            Self::PositionalAfterNamed { .. } => {
                "Positional arguments cannot follow named, flag or enum arguments.".to_string()
            },
            Self::EnumValueNotIdentifier { .. } => {
                "The value of an enum argument must be a bare identifier.".to_string()
            },
            Self::InvalidBindingTarget { .. } => {
                "Only a plain identifier can be bound with ':'.".to_string()
            },
            Self::InvalidCallHead { .. } => {
                "Only identifiers, member accesses and parenthesized expressions can be called."
                    .to_string()
            },
            Self::FlagOutsideCall { name, .. } => {
                format!("Flag '-{name}' can only appear in a call's argument list.")
            },
            Self::InvalidParameter { details, .. } => format!("Invalid parameter: {details}."),
        }
    }

    /// The source region the error refers to.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfInput { span }
            | Self::ExpectedClosingParen { span }
            | Self::EmptyStatementBlock { span }
            | Self::UnexpectedIndentation { span }
            | Self::CallAfterZeroArgumentCall { span }
            | Self::PositionalAfterNamed { span }
            | Self::EnumValueNotIdentifier { span }
            | Self::InvalidBindingTarget { span }
            | Self::InvalidCallHead { span }
            | Self::FlagOutsideCall { span, .. }
            | Self::InvalidParameter { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let span = self.span();
        write!(f,
               "Error on line {}, column {}: {}",
               span.line,
               span.column,
               self.message())
    }
}

impl std::error::Error for ParseError {}
