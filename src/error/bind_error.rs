use crate::{interpreter::signature::MatchError, util::span::Span};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors found by the static binder.
pub enum BindError {
    /// An identifier was used where no enclosing scope defines it, or before
    /// its definition.
    UndefinedIdentifier {
        /// The identifier.
        name: String,
        /// Location of the use.
        span: Span,
    },
    /// A name was bound twice in the same scope.
    Redefinition {
        /// The name.
        name: String,
        /// Location of the second definition.
        span: Span,
    },
    /// A parameter annotation names no known type or constructor.
    UnknownType {
        /// The annotation.
        name: String,
        /// Location of the parameter.
        span: Span,
    },
    /// A call's arguments fit none of the callee's known signatures.
    InvalidCall {
        /// The callee name.
        name:   String,
        /// Why the first candidate signature rejected the arguments.
        reason: MatchError,
        /// Location of the call.
        span:   Span,
    },
}

impl BindError {
    /// The error message without location information.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::UndefinedIdentifier { name, .. } => format!("Undefined identifier '{name}'."),
            Self::Redefinition { name, .. } => {
                format!("'{name}' is already defined in this scope.")
            },
            Self::UnknownType { name, .. } => format!("Unknown type '{name}'."),
            Self::InvalidCall { name, reason, .. } => {
                format!("Invalid call to '{name}': {reason}.")
            },
        }
    }

    /// The source region the error refers to.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::UndefinedIdentifier { span, .. }
            | Self::Redefinition { span, .. }
            | Self::UnknownType { span, .. }
            | Self::InvalidCall { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let span = self.span();
        write!(f,
               "Error on line {}, column {}: {}",
               span.line,
               span.column,
               self.message())
    }
}

impl std::error::Error for BindError {}
