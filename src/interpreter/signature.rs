use crate::ast::{Argument, Parameter};

/// The declared parameter list of a callable.
///
/// Used by the binder to validate call sites and by the evaluator to bind
/// actual arguments to parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
}

impl Signature {
    /// Creates a signature from declared parameters.
    #[must_use]
    pub const fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    /// Indices of the parameters positional arguments may fill, in
    /// declaration order.
    #[must_use]
    pub fn positional_parameters(&self) -> Vec<usize> {
        self.parameters
            .iter()
            .enumerate()
            .filter(|(_, p)| p.positional)
            .map(|(i, _)| i)
            .collect()
    }

    /// Finds a parameter by name.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }
}

/// Which argument supplies each parameter, indexed like
/// [`Signature::parameters`].
///
/// `None` means no argument was given and the parameter's default applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMatch {
    /// For every parameter, the index of its argument in the call.
    pub sources: Vec<Option<usize>>,
}

/// Why a call's arguments do not fit a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// A named, flag or enum argument names no declared parameter.
    NotAValidArgument {
        /// The argument name.
        name: String,
    },
    /// Two arguments claim the same parameter.
    DuplicateArgument {
        /// The parameter name.
        name: String,
    },
    /// More positional arguments than free positional parameters.
    TooManyPositionalArguments {
        /// How many positional parameters the signature declares.
        expected: usize,
    },
    /// A parameter without a default received no argument.
    MissingValue {
        /// The parameter name.
        name: String,
    },
    /// An enum argument selects a member the parameter does not list.
    InvalidEnumValue {
        /// The parameter name.
        name:  String,
        /// The selected member.
        value: String,
    },
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAValidArgument { name } => write!(f, "'-{name}' is not a valid argument"),
            Self::DuplicateArgument { name } => write!(f, "duplicate argument name '{name}'"),
            Self::TooManyPositionalArguments { expected } => {
                write!(f, "too many positional args (at most {expected})")
            },
            Self::MissingValue { name } => write!(f, "missing value for parameter '{name}'"),
            Self::InvalidEnumValue { name, value } => {
                write!(f, "'{value}' is not a member of '-{name}'")
            },
        }
    }
}

impl std::error::Error for MatchError {}

/// Matches actual call arguments against a signature.
///
/// Arguments are processed in call order:
/// - a named, flag or enum argument claims the parameter of that name; an
///   unknown name or a name claimed twice fails,
/// - a positional argument claims the next unclaimed positional parameter in
///   declaration order, skipping those already claimed by name; running out
///   of positional parameters fails.
///
/// Afterwards every parameter that is still unclaimed must have a default.
/// Defaults are not evaluated here.
///
/// # Errors
/// A [`MatchError`] naming the first rule the arguments break.
///
/// # Example
/// ```
/// use lilt::{
///     ast::{Argument, Expr, Parameter},
///     interpreter::signature::{Signature, match_arguments},
///     util::span::Span,
/// };
///
/// let param = |name: &str, positional| Parameter { name: name.to_string(),
///                                                  positional,
///                                                  default: None,
///                                                  enum_members: None,
///                                                  type_name: None,
///                                                  span: Span::default() };
/// let signature = Signature::new(vec![param("a", true), param("b", true)]);
/// let arguments = vec![Argument::Named { name:  "a".to_string(),
///                                        value: Expr::Bool { value: true,
///                                                            span:  Span::default(), },
///                                        span:  Span::default(), },
///                      Argument::Positional(Expr::Bool { value: false,
///                                                        span:  Span::default(), })];
///
/// let matched = match_arguments(&signature, &arguments).unwrap();
/// assert_eq!(matched.sources, vec![Some(0), Some(1)]);
/// ```
pub fn match_arguments(signature: &Signature,
                       arguments: &[Argument])
                       -> Result<ArgumentMatch, MatchError> {
    let positional = signature.positional_parameters();
    let mut sources = vec![None; signature.parameters.len()];
    let mut next_positional = 0;

    for (index, argument) in arguments.iter().enumerate() {
        if let Some(name) = argument.name() {
            let Some(slot) = signature.position(name) else {
                return Err(MatchError::NotAValidArgument { name: name.to_string() });
            };
            if sources[slot].is_some() {
                return Err(MatchError::DuplicateArgument { name: name.to_string() });
            }
            if let Argument::Enum { value, .. } = argument
               && let Some(members) = &signature.parameters[slot].enum_members
               && !members.contains(value)
            {
                return Err(MatchError::InvalidEnumValue { name:  name.to_string(),
                                                          value: value.clone(), });
            }
            sources[slot] = Some(index);
            continue;
        }

        while next_positional < positional.len() && sources[positional[next_positional]].is_some()
        {
            next_positional += 1;
        }
        let Some(&slot) = positional.get(next_positional) else {
            return Err(MatchError::TooManyPositionalArguments { expected: positional.len() });
        };
        sources[slot] = Some(index);
        next_positional += 1;
    }

    for (parameter, source) in signature.parameters.iter().zip(&sources) {
        if source.is_none() && parameter.default.is_none() {
            return Err(MatchError::MissingValue { name: parameter.name.clone() });
        }
    }

    Ok(ArgumentMatch { sources })
}
