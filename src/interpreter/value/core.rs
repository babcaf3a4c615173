use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::{
    ast::FunctionDef,
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, scope::FrameHandle},
        signature::Signature,
    },
    util::{num::format_number, span::Span},
};

/// Handler of a native function: receives the bound arguments in parameter
/// order and the location of the call.
pub type NativeFn = fn(&[Value], Span) -> EvalResult<Value>;

/// Represents a runtime value in the interpreter.
///
/// Data values (numbers, strings, booleans, instances) compare structurally.
/// Functions, types and constructors compare by identity.
#[derive(Debug, Clone)]
pub enum Value {
    /// A number (double precision floating-point).
    Number(OrderedFloat<f64>),
    /// An immutable string.
    Str(Rc<str>),
    /// A boolean value (`true` or `false`).
    Bool(bool),
    /// The "no value" sentinel, e.g. the value of an `if` whose test was
    /// falsy and that has no `else`.
    None,
    /// A function implemented in Rust.
    Native(Rc<NativeFunction>),
    /// A function literal closed over its defining frame.
    Function(Rc<Closure>),
    /// A function defined with `fn name`, possibly with several instances.
    Generic(Rc<GenericFunction>),
    /// A union type; its members are its constructors.
    Type(Rc<UnionType>),
    /// A constructor of a union type.
    Constructor(Rc<Constructor>),
    /// A value built by a constructor.
    Instance(Rc<Instance>),
}

/// A function implemented in Rust, with a declared signature.
#[derive(Debug)]
pub struct NativeFunction {
    /// The global name.
    pub name:      &'static str,
    /// Parameters the call's arguments are matched against.
    pub signature: Signature,
    /// The implementation.
    pub func:      NativeFn,
}

/// An interpreted function together with the frame it was defined in.
#[derive(Debug)]
pub struct Closure {
    /// The definition.
    pub def:       Rc<FunctionDef>,
    /// The definition's parameters as a signature.
    pub signature: Signature,
    /// The frame free names of the body resolve in.
    pub scope:     Rc<FrameHandle>,
}

/// The instances of a generic function, in definition order.
///
/// Instances are only ever appended. Appending goes through `Rc::make_mut`
/// on the defining frame's binding, so a copy of the value taken earlier keeps
/// the instances it saw.
#[derive(Debug, Clone)]
pub struct GenericFunction {
    /// The function name.
    pub name:      String,
    /// Instances, tried in this order.
    pub instances: Vec<Rc<Closure>>,
}

/// A union type declared with `type`.
#[derive(Debug)]
pub struct UnionType {
    /// The type name.
    pub name:         String,
    /// The constructors, in declaration order.
    pub constructors: Vec<Rc<Constructor>>,
}

/// One constructor of a union type.
#[derive(Debug)]
pub struct Constructor {
    /// Name of the union type.
    pub type_name: String,
    /// The constructor name.
    pub name:      String,
    /// The fields, declared like parameters.
    pub signature: Signature,
    /// The frame field defaults are evaluated in.
    pub scope:     Rc<FrameHandle>,
}

/// A value built by a constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Name of the union type.
    pub type_name:   String,
    /// Name of the constructor that built it.
    pub constructor: String,
    /// Field values in declaration order.
    pub fields:      Vec<(String, Value)>,
}

impl Instance {
    /// Reads a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(field, _)| field == name).map(|(_, value)| value)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(OrderedFloat(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl Value {
    /// `false` and `none` are falsy; every other value is truthy.
    ///
    /// # Example
    /// ```
    /// use lilt::interpreter::value::core::Value;
    ///
    /// assert!(!Value::None.is_truthy());
    /// assert!(!Value::from(false).is_truthy());
    /// assert!(Value::from(0.0).is_truthy());
    /// assert!(Value::from("").is_truthy());
    /// ```
    #[must_use]
    pub const fn is_truthy(&self) -> bool {
        !matches!(self, Self::None | Self::Bool(false))
    }

    /// A short description of the value's kind, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::None => "none",
            Self::Native(_) | Self::Function(_) | Self::Generic(_) => "function",
            Self::Type(_) => "type",
            Self::Constructor(_) => "constructor",
            Self::Instance(instance) => &instance.type_name,
        }
    }

    /// Whether the value satisfies a parameter annotation.
    ///
    /// `number`, `string`, `bool` and `function` test the value's kind and
    /// `any` accepts everything. Any other name matches instances of the
    /// union type or of the constructor with that name.
    #[must_use]
    pub fn satisfies(&self, annotation: &str) -> bool {
        match (annotation, self) {
            ("any", _)
            | ("number", Self::Number(_))
            | ("string", Self::Str(_))
            | ("bool", Self::Bool(_))
            | ("function", Self::Native(_) | Self::Function(_) | Self::Generic(_)) => true,
            (name, Self::Instance(instance)) => {
                instance.type_name == name || instance.constructor == name
            },
            _ => false,
        }
    }

    /// Converts the value to an `f64`, or returns an error if not a number.
    ///
    /// # Parameters
    /// - `span`: Location reported on failure.
    ///
    /// # Returns
    /// - `Ok(f64)`: If value is a number.
    /// - `Err(RuntimeError::TypeError)`: Otherwise.
    pub fn as_number(&self, span: Span) -> EvalResult<f64> {
        match self {
            Self::Number(n) => Ok(n.into_inner()),
            other => Err(RuntimeError::TypeError { details: format!("expected a number, found {}",
                                                                    other.type_name()),
                                                   span }),
        }
    }

    /// Borrows the contents of a string value, or returns an error.
    pub fn as_str(&self, span: Span) -> EvalResult<&str> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(RuntimeError::TypeError { details: format!("expected a string, found {}",
                                                                    other.type_name()),
                                                   span }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::None, Self::None) => true,
            (Self::Native(a), Self::Native(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Generic(a), Self::Generic(b)) => Rc::ptr_eq(a, b),
            (Self::Type(a), Self::Type(b)) => Rc::ptr_eq(a, b),
            (Self::Constructor(a), Self::Constructor(b)) => Rc::ptr_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::None => f.write_str("none"),
            Self::Native(native) => write!(f, "<native fn {}>", native.name),
            Self::Function(closure) => match &closure.def.name {
                Some(name) => write!(f, "<fn {name}>"),
                None => f.write_str("<fn>"),
            },
            Self::Generic(generic) => write!(f, "<fn {}>", generic.name),
            Self::Type(union) => write!(f, "<type {}>", union.name),
            Self::Constructor(constructor) => {
                write!(f, "<constructor {}.{}>", constructor.type_name, constructor.name)
            },
            Self::Instance(instance) => {
                write!(f, "{}", instance.constructor)?;
                if instance.fields.is_empty() {
                    return Ok(());
                }
                write!(f, "(")?;
                for (index, (name, value)) in instance.fields.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    match value {
                        Self::Str(s) => write!(f, "{name}: {s:?}")?,
                        _ => write!(f, "{name}: {value}")?,
                    }
                }
                write!(f, ")")
            },
        }
    }
}
