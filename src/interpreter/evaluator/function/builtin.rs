use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
    util::{num::usize_to_f64_checked, span::Span},
};

/// Prints a value to standard output and returns it unchanged.
///
/// The value is formatted using its `Display` implementation, so strings
/// print without quotes.
///
/// # Example
/// ```
/// use lilt::{
///     interpreter::{evaluator::function::builtin::print, value::core::Value},
///     util::span::Span,
/// };
///
/// // The function prints the value to stdout, but the doctest
/// // only checks the returned result.
/// let result = print(&[Value::from(42.0)], Span::default()).unwrap();
///
/// assert_eq!(result, 42.0.into());
/// ```
pub fn print(args: &[Value], _: Span) -> EvalResult<Value> {
    println!("{}", args[0]);
    Ok(args[0].clone())
}

/// Asserts that the argument is truthy.
///
/// If the value is falsy, an `AssertionFailed` error is returned.
/// Otherwise the function returns the value unchanged.
///
/// # Example
/// ```
/// use lilt::{
///     interpreter::{evaluator::function::builtin::assert_fn, value::core::Value},
///     util::span::Span,
/// };
///
/// assert!(assert_fn(&[Value::from(true)], Span::default()).is_ok());
/// assert!(assert_fn(&[Value::None], Span::default()).is_err());
/// ```
pub fn assert_fn(args: &[Value], span: Span) -> EvalResult<Value> {
    if args[0].is_truthy() {
        Ok(args[0].clone())
    } else {
        Err(RuntimeError::AssertionFailed { span })
    }
}

/// Absolute value of a number.
pub fn abs(args: &[Value], span: Span) -> EvalResult<Value> {
    Ok(args[0].as_number(span)?.abs().into())
}

/// Square root of a non-negative number.
///
/// Negative input is an `InvalidArgument` error rather than `NaN`.
///
/// # Example
/// ```
/// use lilt::{interpreter::evaluator::function::builtin::sqrt, util::span::Span};
///
/// assert_eq!(sqrt(&[16.0.into()], Span::default()).unwrap(), 4.0.into());
/// assert!(sqrt(&[(-1.0).into()], Span::default()).is_err());
/// ```
pub fn sqrt(args: &[Value], span: Span) -> EvalResult<Value> {
    let x = args[0].as_number(span)?;
    if x < 0.0 {
        return Err(RuntimeError::InvalidArgument { details: format!("cannot take the square \
                                                                     root of {}",
                                                                    args[0]),
                                                   span });
    }
    Ok(x.sqrt().into())
}

/// Largest integer not greater than the argument.
pub fn floor(args: &[Value], span: Span) -> EvalResult<Value> {
    Ok(args[0].as_number(span)?.floor().into())
}

/// The smaller of two numbers.
pub fn min(args: &[Value], span: Span) -> EvalResult<Value> {
    Ok(args[0].as_number(span)?.min(args[1].as_number(span)?).into())
}

/// The larger of two numbers.
pub fn max(args: &[Value], span: Span) -> EvalResult<Value> {
    Ok(args[0].as_number(span)?.max(args[1].as_number(span)?).into())
}

/// Number of characters in a string.
pub fn length(args: &[Value], span: Span) -> EvalResult<Value> {
    let count = args[0].as_str(span)?.chars().count();
    let count = usize_to_f64_checked(count,
                                     RuntimeError::InvalidArgument { details: "string is too \
                                                                               long"
                                                                              .to_string(),
                                                                     span })?;
    Ok(count.into())
}

/// Converts any value to its display string.
pub fn string(args: &[Value], _: Span) -> EvalResult<Value> {
    match &args[0] {
        Value::Str(_) => Ok(args[0].clone()),
        other => Ok(Value::from(other.to_string())),
    }
}
