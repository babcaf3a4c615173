use std::cmp::Ordering;

use crate::{
    ast::{BinaryOperator, Expr},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalResult, Interpreter},
            scope::FrameId,
        },
        value::core::Value,
    },
    util::span::Span,
};

impl Interpreter {
    /// Evaluates a binary expression.
    ///
    /// `and` and `or` evaluate their right side only when the left side does
    /// not already decide the result, and always yield a `bool`. Every other
    /// operator evaluates both sides, left first, and applies
    /// [`apply_binary`].
    pub(crate) fn eval_binary(&mut self,
                              left: &Expr,
                              op: BinaryOperator,
                              right: &Expr,
                              span: Span,
                              frame: FrameId)
                              -> EvalResult<Value> {
        match op {
            BinaryOperator::And => {
                if !self.eval(left, frame)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval(right, frame)?.is_truthy()))
            },
            BinaryOperator::Or => {
                if self.eval(left, frame)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval(right, frame)?.is_truthy()))
            },
            _ => {
                let left = self.eval(left, frame)?;
                let right = self.eval(right, frame)?;
                apply_binary(op, &left, &right, span)
            },
        }
    }
}

/// Applies a non-short-circuit binary operator to two values.
///
/// - `=` and `!=` compare structurally (functions by identity).
/// - Ordering operators accept two numbers or two strings.
/// - `+` adds numbers or concatenates strings.
/// - `-`, `*`, `/`, `%` need numbers; `/` and `%` reject a zero divisor.
///
/// # Errors
/// [`RuntimeError::TypeError`] for unsupported operand kinds and
/// [`RuntimeError::DivisionByZero`].
///
/// # Example
/// ```
/// use lilt::{
///     ast::BinaryOperator,
///     interpreter::{evaluator::binary::apply_binary, value::core::Value},
///     util::span::Span,
/// };
///
/// let sum = apply_binary(BinaryOperator::Add, &"ab".into(), &"c".into(), Span::default());
/// assert_eq!(sum.unwrap(), Value::from("abc"));
///
/// let quotient = apply_binary(BinaryOperator::Div, &1.0.into(), &0.0.into(), Span::default());
/// assert!(quotient.is_err());
/// ```
pub fn apply_binary(op: BinaryOperator,
                    left: &Value,
                    right: &Value,
                    span: Span)
                    -> EvalResult<Value> {
    use BinaryOperator::{
        Add, And, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mod, Mul, NotEqual, Or, Sub,
    };

    match op {
        Equal => Ok(Value::Bool(left == right)),
        NotEqual => Ok(Value::Bool(left != right)),
        Less | LessEqual | Greater | GreaterEqual => {
            let ordering = compare(op, left, right, span)?;
            let result = match op {
                Less => ordering == Ordering::Less,
                LessEqual => ordering != Ordering::Greater,
                Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        },
        Add => match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::from(format!("{a}{b}"))),
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            _ => Err(operand_error(op, left, right, span)),
        },
        Sub | Mul | Div | Mod => {
            let (Value::Number(a), Value::Number(b)) = (left, right) else {
                return Err(operand_error(op, left, right, span));
            };
            let (a, b) = (a.into_inner(), b.into_inner());
            match op {
                Sub => Ok(Value::from(a - b)),
                Mul => Ok(Value::from(a * b)),
                _ if b == 0.0 => Err(RuntimeError::DivisionByZero { span }),
                Div => Ok(Value::from(a / b)),
                _ => Ok(Value::from(a % b)),
            }
        },
        And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

fn compare(op: BinaryOperator, left: &Value, right: &Value, span: Span) -> EvalResult<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => Err(operand_error(op, left, right, span)),
    }
}

fn operand_error(op: BinaryOperator, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::TypeError { details: format!("cannot apply '{op}' to {} and {}",
                                               left.type_name(),
                                               right.type_name()),
                              span }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(op: BinaryOperator, left: Value, right: Value) -> EvalResult<Value> {
        apply_binary(op, &left, &right, Span::default())
    }

    #[test]
    fn arithmetic() {
        assert_eq!(apply(BinaryOperator::Sub, 5.0.into(), 7.0.into()), Ok(Value::from(-2.0)));
        assert_eq!(apply(BinaryOperator::Mod, 7.0.into(), 4.0.into()), Ok(Value::from(3.0)));
        assert_eq!(apply(BinaryOperator::Mod, 7.0.into(), 0.0.into()),
                   Err(RuntimeError::DivisionByZero { span: Span::default() }));
    }

    #[test]
    fn comparison_of_strings_and_numbers() {
        assert_eq!(apply(BinaryOperator::Less, "a".into(), "b".into()), Ok(Value::Bool(true)));
        assert_eq!(apply(BinaryOperator::GreaterEqual, 2.0.into(), 2.0.into()),
                   Ok(Value::Bool(true)));
        assert!(apply(BinaryOperator::Less, "a".into(), 1.0.into()).is_err());
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(apply(BinaryOperator::Equal, "x".into(), "x".into()), Ok(Value::Bool(true)));
        assert_eq!(apply(BinaryOperator::Equal, 1.0.into(), "1".into()), Ok(Value::Bool(false)));
        assert_eq!(apply(BinaryOperator::NotEqual, Value::None, Value::None),
                   Ok(Value::Bool(false)));
    }
}
