use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::util::span::Span;

/// A parsed source unit: the statements of one file or one REPL entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
}

/// An AST node representing a statement.
///
/// Named function definitions and union type declarations can only appear at
/// the start of a logical line; everything else is an expression used as a
/// statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// An expression evaluated for its value (or its bindings).
    Expression(Expr),
    /// `fn name(params): body`, adding an instance to the generic function
    /// `name`.
    Function(Rc<FunctionDef>),
    /// `type Name: ctor(params) | ctor(params)`.
    Type(TypeDecl),
}

impl Statement {
    /// The source location of the statement.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Expression(expr) => expr.span(),
            Self::Function(def) => def.span,
            Self::Type(decl) => decl.span,
        }
    }
}

/// A sequence of statements evaluated in a fresh scope.
///
/// Both indented blocks and inline bodies (`if x then y`, `fn (a): a`) are
/// represented as blocks; an inline body holds exactly one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Statements in source order.
    pub statements: Vec<Statement>,
    /// Location of the first statement.
    pub span:       Span,
}

/// Binary operators, from loosest to tightest binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `and`, short-circuit.
    And,
    /// `or`, short-circuit.
    Or,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        };
        f.write_str(symbol)
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `- x`
    Negate,
    /// `not x`
    Not,
}

/// An abstract syntax tree (AST) node representing an expression.
///
/// Every variant carries the [`Span`] of the construct so that the binder and
/// the evaluator can point at it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a name.
    Identifier {
        /// The name.
        name: String,
        /// Location in the source code.
        span: Span,
    },
    /// A numeric literal.
    Number {
        /// The value.
        value: OrderedFloat<f64>,
        /// Location in the source code.
        span:  Span,
    },
    /// A string literal, escapes already resolved.
    Str {
        /// The value.
        value: String,
        /// Location in the source code.
        span:  Span,
    },
    /// `true` or `false`.
    Bool {
        /// The value.
        value: bool,
        /// Location in the source code.
        span:  Span,
    },
    /// A prefix operation.
    Unary {
        /// The operator.
        op:      UnaryOperator,
        /// The operand.
        operand: Box<Self>,
        /// Location of the operator.
        span:    Span,
    },
    /// A binary operation.
    Binary {
        /// Left operand.
        left:  Box<Self>,
        /// The operator.
        op:    BinaryOperator,
        /// Right operand.
        right: Box<Self>,
        /// Location of the operator.
        span:  Span,
    },
    /// `object.member`
    Member {
        /// The value whose member is read.
        object: Box<Self>,
        /// Name of the member.
        member: String,
        /// From the start of the object through the member name.
        span:   Span,
    },
    /// A function call, with arguments in source order.
    Call {
        /// The expression being called.
        callee:    Box<Self>,
        /// The arguments.
        arguments: Vec<Argument>,
        /// Location of the callee.
        span:      Span,
    },
    /// `if test then a else b`, or the indented-block form.
    If {
        /// The condition.
        condition:   Box<Self>,
        /// Evaluated when the condition is truthy.
        then_branch: Block,
        /// Evaluated when the condition is falsy; without it the expression
        /// yields `none`.
        else_branch: Option<Block>,
        /// Location of the `if` keyword.
        span:        Span,
    },
    /// `name: value, name: value, ...`
    Binding {
        /// The bound names and their value expressions, left to right.
        bindings: Vec<BindingPair>,
        /// Location of the first name.
        span:     Span,
    },
    /// An anonymous function literal `fn (params): body`.
    Function(Rc<FunctionDef>),
}

impl Expr {
    /// Gets the source location of `self`.
    ///
    /// ## Example
    /// ```
    /// use lilt::{ast::Expr, util::span::Span};
    ///
    /// let expr = Expr::Identifier { name: "x".to_string(),
    ///                               span: Span::new(5, 3, 1), };
    ///
    /// assert_eq!(expr.span().line, 5);
    /// ```
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Identifier { span, .. }
            | Self::Number { span, .. }
            | Self::Str { span, .. }
            | Self::Bool { span, .. }
            | Self::Unary { span, .. }
            | Self::Binary { span, .. }
            | Self::Member { span, .. }
            | Self::Call { span, .. }
            | Self::If { span, .. }
            | Self::Binding { span, .. } => *span,
            Self::Function(def) => def.span,
        }
    }

    /// Whether the expression is a plain identifier or a member access: the
    /// values a named argument may hold before being turned into a nested
    /// call by a following comma.
    #[must_use]
    pub const fn is_simple_reference(&self) -> bool {
        matches!(self, Self::Identifier { .. } | Self::Member { .. })
    }
}

/// One `name: value` pair of a binding expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingPair {
    /// The bound name.
    pub name:  String,
    /// The value expression.
    pub value: Expr,
    /// Location of the name.
    pub span:  Span,
}

/// A call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// `foo x`
    Positional(Expr),
    /// `foo -name expr`
    Named {
        /// Parameter name, without the dash.
        name:  String,
        /// The value expression.
        value: Expr,
        /// Location of the flag token.
        span:  Span,
    },
    /// `foo -name`; binds `true`.
    Flag {
        /// Parameter name, without the dash.
        name: String,
        /// Location of the flag token.
        span: Span,
    },
    /// `foo -name:value`; binds the string `"value"`.
    Enum {
        /// Parameter name, without the dash.
        name:  String,
        /// The selected member.
        value: String,
        /// Location of the flag token.
        span:  Span,
    },
}

impl Argument {
    /// The parameter name this argument claims, if it is not positional.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Positional(_) => None,
            Self::Named { name, .. } | Self::Flag { name, .. } | Self::Enum { name, .. } => {
                Some(name)
            },
        }
    }

    /// The source location of the argument.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Positional(expr) => expr.span(),
            Self::Named { span, .. } | Self::Flag { span, .. } | Self::Enum { span, .. } => *span,
        }
    }
}

/// A declared parameter of a function or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The parameter name.
    pub name:         String,
    /// Whether positional arguments may fill it. Parameters declared with a
    /// leading dash can only be passed by name.
    pub positional:   bool,
    /// Evaluated in the callee's scope when no argument supplies a value.
    pub default:      Option<Expr>,
    /// For `-name: a | b | c`, the allowed enum members.
    pub enum_members: Option<Vec<String>>,
    /// For `name: T`, the type or constructor the argument must be an
    /// instance of for a generic instance to be selected.
    pub type_name:    Option<String>,
    /// Location of the parameter name.
    pub span:         Span,
}

/// A function definition or literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// The name for `fn name(...)` definitions; `None` for literals.
    pub name:       Option<String>,
    /// Declared parameters in order.
    pub parameters: Vec<Parameter>,
    /// The body.
    pub body:       Block,
    /// Location of the `fn` keyword.
    pub span:       Span,
}

/// A union type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    /// The type name.
    pub name:         String,
    /// The constructors, in declaration order.
    pub constructors: Vec<ConstructorDecl>,
    /// Location of the `type` keyword.
    pub span:         Span,
}

/// One constructor of a union type.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    /// The constructor name.
    pub name:       String,
    /// The fields, declared like function parameters.
    pub parameters: Vec<Parameter>,
    /// Location of the constructor name.
    pub span:       Span,
}

/// Renders the tree in a compact prefix form that ignores source locations.
///
/// Two expressions that differ only in layout (extra parentheses, line
/// breaks inside parentheses) render identically, which is what the parser
/// tests compare.
///
/// ## Example
/// ```
/// use lilt::parse_module;
///
/// let module = parse_module("1 + 2 * 3", &[]).unwrap();
/// assert_eq!(module.to_string(), "(+ 1 (* 2 3))");
/// ```
impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier { name, .. } => f.write_str(name),
            Self::Number { value, .. } => f.write_str(&crate::util::num::format_number(*value)),
            Self::Str { value, .. } => write!(f, "{value:?}"),
            Self::Bool { value, .. } => write!(f, "{value}"),
            Self::Unary { op: UnaryOperator::Negate,
                          operand,
                          .. } => write!(f, "(- {operand})"),
            Self::Unary { op: UnaryOperator::Not,
                          operand,
                          .. } => write!(f, "(not {operand})"),
            Self::Binary { left, op, right, .. } => write!(f, "({op} {left} {right})"),
            Self::Member { object, member, .. } => write!(f, "(. {object} {member})"),
            Self::Call { callee, arguments, .. } => {
                write!(f, "(call {callee}")?;
                for argument in arguments {
                    write!(f, " {argument}")?;
                }
                f.write_str(")")
            },
            Self::If { condition,
                       then_branch,
                       else_branch,
                       .. } => {
                write!(f, "(if {condition} {then_branch}")?;
                if let Some(else_branch) = else_branch {
                    write!(f, " {else_branch}")?;
                }
                f.write_str(")")
            },
            Self::Binding { bindings, .. } => {
                f.write_str("(bind")?;
                for pair in bindings {
                    write!(f, " {} {}", pair.name, pair.value)?;
                }
                f.write_str(")")
            },
            Self::Function(def) => def.fmt(f),
        }
    }
}

impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positional(expr) => expr.fmt(f),
            Self::Named { name, value, .. } => write!(f, "-{name}={value}"),
            Self::Flag { name, .. } => write!(f, "-{name}"),
            Self::Enum { name, value, .. } => write!(f, "-{name}:{value}"),
        }
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            statement.fmt(f)?;
        }
        f.write_str("}")
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.positional {
            f.write_str("-")?;
        }
        f.write_str(&self.name)?;
        if let Some(type_name) = &self.type_name {
            write!(f, ":{type_name}")?;
        }
        if let Some(members) = &self.enum_members {
            write!(f, ":{}", members.join("|"))?;
        }
        if let Some(default) = &self.default {
            write!(f, "={default}")?;
        }
        Ok(())
    }
}

/// Writes `(p1 p2 ...)`.
fn write_parameters(f: &mut std::fmt::Formatter<'_>, parameters: &[Parameter]) -> std::fmt::Result {
    f.write_str("(")?;
    for (i, parameter) in parameters.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        std::fmt::Display::fmt(parameter, f)?;
    }
    f.write_str(")")
}

impl std::fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(fn ")?;
        if let Some(name) = &self.name {
            write!(f, "{name} ")?;
        }
        write_parameters(f, &self.parameters)?;
        write!(f, " {})", self.body)
    }
}

impl std::fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(type {}", self.name)?;
        for constructor in &self.constructors {
            write!(f, " {}", constructor.name)?;
            write_parameters(f, &constructor.parameters)?;
        }
        f.write_str(")")
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expression(expr) => expr.fmt(f),
            Self::Function(def) => def.fmt(f),
            Self::Type(decl) => decl.fmt(f),
        }
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            statement.fmt(f)?;
        }
        Ok(())
    }
}
