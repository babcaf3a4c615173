use crate::{interpreter::signature::MatchError, util::span::Span};

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur during evaluation.
pub enum RuntimeError {
    /// A name was not found on the scope chain. The binder should have
    /// rejected the program, so this indicates an internal inconsistency.
    UndefinedVariable {
        /// The name.
        name: String,
        /// Location of the use.
        span: Span,
    },
    /// A value that is not a function, generic function or constructor was
    /// called.
    NotCallable {
        /// Description of the value.
        found: String,
        /// Location of the call.
        span:  Span,
    },
    /// A member was read off `none`.
    MemberOfNone {
        /// The member name.
        member: String,
        /// Location of the access.
        span:   Span,
    },
    /// A member was read off a value that does not have it.
    UnknownMember {
        /// The member name.
        member: String,
        /// Description of the base value.
        found:  String,
        /// Location of the access.
        span:   Span,
    },
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// Location of the operation.
        span:    Span,
    },
    /// Attempted division by zero.
    DivisionByZero {
        /// Location of the operation.
        span: Span,
    },
    /// The arguments of a call do not fit the callee's signature.
    ArgumentMismatch {
        /// Name of the callee.
        name:   String,
        /// Why the signature rejected the arguments.
        reason: MatchError,
        /// Location of the call.
        span:   Span,
    },
    /// No instance of a generic function accepts the call's arguments.
    NoMatchingInstance {
        /// Name of the generic function.
        name: String,
        /// Location of the call.
        span: Span,
    },
    /// `assert` received a falsy value.
    AssertionFailed {
        /// Location of the call.
        span: Span,
    },
    /// Too many interpreted calls were active at once.
    RecursionLimit {
        /// The maximum call depth.
        limit: usize,
        /// Location of the call that exceeded it.
        span:  Span,
    },
    /// An argument to a native function was invalid or out of range.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// Location of the call.
        span:    Span,
    },
}

impl RuntimeError {
    /// The error message without location information.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::UndefinedVariable { name, .. } => {
                format!("Internal error: '{name}' is not bound in any enclosing scope.")
            },
            Self::NotCallable { found, .. } => format!("Cannot call a value of type {found}."),
            Self::MemberOfNone { member, .. } => {
                format!("Cannot read member '{member}' of none.")
            },
            Self::UnknownMember { member, found, .. } => {
                format!("A value of type {found} has no member '{member}'.")
            },
            Self::TypeError { details, .. } => format!("Type error: {details}."),
            Self::DivisionByZero { .. } => "Division by zero.".to_string(),
            Self::ArgumentMismatch { name, reason, .. } => {
                format!("Invalid call to '{name}': {reason}.")
            },
            Self::NoMatchingInstance { name, .. } => {
                format!("No instance of '{name}' accepts these arguments.")
            },
            Self::AssertionFailed { .. } => "Assertion failed.".to_string(),
            Self::RecursionLimit { limit, .. } => {
                format!("Maximum call depth of {limit} exceeded.")
            },
            Self::InvalidArgument { details, .. } => format!("Invalid argument: {details}."),
        }
    }

    /// The source region the error refers to.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::UndefinedVariable { span, .. }
            | Self::NotCallable { span, .. }
            | Self::MemberOfNone { span, .. }
            | Self::UnknownMember { span, .. }
            | Self::TypeError { span, .. }
            | Self::DivisionByZero { span }
            | Self::AssertionFailed { span }
            | Self::ArgumentMismatch { span, .. }
            | Self::NoMatchingInstance { span, .. }
            | Self::RecursionLimit { span, .. }
            | Self::InvalidArgument { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let span = self.span();
        write!(f,
               "Error on line {}, column {}: {}",
               span.line,
               span.column,
               self.message())
    }
}

impl std::error::Error for RuntimeError {}
