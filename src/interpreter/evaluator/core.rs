use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::{Block, BindingPair, Expr, FunctionDef, Module, Statement, TypeDecl, UnaryOperator},
    error::RuntimeError,
    interpreter::{
        evaluator::scope::{FrameId, Scope},
        signature::Signature,
        value::core::{Closure, Constructor, GenericFunction, UnionType, Value},
    },
    util::span::Span,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// How many interpreted calls may be active at once before evaluation fails
/// with [`RuntimeError::RecursionLimit`].
pub const MAX_CALL_DEPTH: usize = 1000;

/// Walks a bound module and computes its value.
///
/// ## Usage
///
/// An `Interpreter` owns the [`Scope`] arena for the duration of one
/// evaluation. Module-level statements run directly in [`Scope::ROOT`], so
/// the scope handed back by [`Self::into_scope`] holds every top-level
/// binding and can be reused for the next REPL entry.
///
/// Every interpreted call uses native stack, so the number of active calls
/// is bounded by `max_depth`. Deep recursion also needs a thread with a large
/// enough stack; the command-line tool provides one.
pub struct Interpreter {
    /// The scope chain.
    pub scope:     Scope,
    /// Number of interpreted calls currently running.
    depth:         usize,
    /// Maximum allowed call depth.
    pub max_depth: usize,
}

impl Interpreter {
    /// Creates an interpreter over an existing scope.
    #[must_use]
    pub const fn new(scope: Scope) -> Self {
        Self { scope,
               depth: 0,
               max_depth: MAX_CALL_DEPTH }
    }

    /// Gives back the scope, including all top-level bindings made so far.
    #[must_use]
    pub fn into_scope(self) -> Scope {
        self.scope
    }

    /// Evaluates every statement of `module` in the root frame.
    ///
    /// # Returns
    /// The value of the last statement, or `none` for an empty module.
    ///
    /// # Errors
    /// The first [`RuntimeError`]. Bindings made by earlier statements stay
    /// in the scope.
    pub fn eval_module(&mut self, module: &Module) -> EvalResult<Value> {
        self.eval_statements(&module.statements, Scope::ROOT)
    }

    /// Evaluates statements in order in `frame`, returning the value of the
    /// last one.
    pub(crate) fn eval_statements(&mut self,
                                  statements: &[Statement],
                                  frame: FrameId)
                                  -> EvalResult<Value> {
        let mut last = Value::None;
        for statement in statements {
            last = self.eval_statement(statement, frame)?;
        }
        Ok(last)
    }

    /// Evaluates a single statement.
    ///
    /// Expression statements yield their value. A function definition yields
    /// the generic function it extended and a type declaration the new type.
    ///
    /// # Errors
    /// Any [`RuntimeError`] raised while evaluating the statement.
    pub fn eval_statement(&mut self, statement: &Statement, frame: FrameId) -> EvalResult<Value> {
        match statement {
            Statement::Expression(expr) => self.eval(expr, frame),
            Statement::Function(def) => Ok(self.define_function(def, frame)),
            Statement::Type(decl) => Ok(self.define_type(decl, frame)),
        }
    }

    /// Evaluates an expression and returns the resulting value.
    ///
    /// This is the main entry point for expression evaluation. The evaluator
    /// dispatches on the expression variant only; operand kinds are checked
    /// by the individual operations.
    ///
    /// # Errors
    /// Any [`RuntimeError`] raised while evaluating `expr`.
    pub fn eval(&mut self, expr: &Expr, frame: FrameId) -> EvalResult<Value> {
        match expr {
            Expr::Identifier { name, span } => self.eval_identifier(name, *span, frame),
            Expr::Number { value, .. } => Ok(Value::Number(*value)),
            Expr::Str { value, .. } => Ok(Value::from(value.as_str())),
            Expr::Bool { value, .. } => Ok(Value::Bool(*value)),
            Expr::Unary { op, operand, span } => self.eval_unary(*op, operand, *span, frame),
            Expr::Binary { left,
                           op,
                           right,
                           span, } => self.eval_binary(left, *op, right, *span, frame),
            Expr::Member { object,
                           member,
                           span, } => self.eval_member(object, member, *span, frame),
            Expr::Call { callee,
                         arguments,
                         span, } => self.eval_call(callee, arguments, *span, frame),
            Expr::If { condition,
                       then_branch,
                       else_branch,
                       .. } => {
                if self.eval(condition, frame)?.is_truthy() {
                    self.eval_block(then_branch, frame)
                } else if let Some(block) = else_branch {
                    self.eval_block(block, frame)
                } else {
                    Ok(Value::None)
                }
            },
            Expr::Binding { bindings, .. } => self.eval_bindings(bindings, frame),
            Expr::Function(def) => Ok(self.make_closure(def, frame)),
        }
    }

    fn eval_identifier(&self, name: &str, span: Span, frame: FrameId) -> EvalResult<Value> {
        self.scope
            .lookup(frame, name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.to_string(),
                                                             span })
    }

    fn eval_unary(&mut self,
                  op: UnaryOperator,
                  operand: &Expr,
                  span: Span,
                  frame: FrameId)
                  -> EvalResult<Value> {
        let value = self.eval(operand, frame)?;
        match op {
            UnaryOperator::Negate => Ok(Value::from(-value.as_number(span)?)),
            UnaryOperator::Not => Ok(Value::Bool(!value.is_truthy())),
        }
    }

    /// Counts an interpreted call about to start at `span`.
    pub(crate) fn enter_call(&mut self, span: Span) -> EvalResult<()> {
        if self.depth >= self.max_depth {
            return Err(RuntimeError::RecursionLimit { limit: self.max_depth,
                                                      span });
        }
        self.depth += 1;
        Ok(())
    }

    /// Counts a call started by [`Self::enter_call`] as finished.
    pub(crate) const fn leave_call(&mut self) {
        self.depth -= 1;
    }

    /// Runs a block's statements in a fresh child frame of `parent`.
    pub(crate) fn eval_block(&mut self, block: &Block, parent: FrameId) -> EvalResult<Value> {
        let frame = self.scope.push(parent);
        let result = self.eval_statements(&block.statements, frame);
        self.scope.release(frame);
        result
    }

    /// Binds each pair left to right; the value is the last bound value.
    fn eval_bindings(&mut self, bindings: &[BindingPair], frame: FrameId) -> EvalResult<Value> {
        let mut last = Value::None;
        for pair in bindings {
            let value = self.eval(&pair.value, frame)?;
            self.scope.define(frame, &pair.name, value.clone());
            last = value;
        }
        Ok(last)
    }

    /// Reads a field off an instance or a constructor off a union type.
    fn eval_member(&mut self,
                   object: &Expr,
                   member: &str,
                   span: Span,
                   frame: FrameId)
                   -> EvalResult<Value> {
        let base = self.eval(object, frame)?;
        let found = match &base {
            Value::None => {
                return Err(RuntimeError::MemberOfNone { member: member.to_string(),
                                                        span });
            },
            Value::Instance(instance) => instance.field(member).cloned(),
            Value::Type(union) => union.constructors
                                       .iter()
                                       .find(|constructor| constructor.name == member)
                                       .map(|constructor| Value::Constructor(Rc::clone(constructor))),
            _ => None,
        };
        found.ok_or_else(|| RuntimeError::UnknownMember { member: member.to_string(),
                                                          found: base.type_name().to_string(),
                                                          span })
    }

    /// Creates a closure over `frame`, which stays allocated for as long as
    /// the closure is reachable.
    fn make_closure(&mut self, def: &Rc<FunctionDef>, frame: FrameId) -> Value {
        Value::Function(self.closure(def, frame))
    }

    fn closure(&mut self, def: &Rc<FunctionDef>, frame: FrameId) -> Rc<Closure> {
        Rc::new(Closure { def:       Rc::clone(def),
                          signature: Signature::new(def.parameters.clone()),
                          scope:     self.scope.capture(frame), })
    }

    /// `fn name(...)`: adds an instance to the generic function bound to
    /// `name` in `frame`, creating it if `frame` has none. A generic of the
    /// same name in an enclosing frame is shadowed, not extended.
    fn define_function(&mut self, def: &Rc<FunctionDef>, frame: FrameId) -> Value {
        let name = def.name.clone().unwrap_or_default();
        let instance = self.closure(def, frame);

        if let Some(Value::Generic(generic)) = self.scope.local_mut(frame, &name) {
            Rc::make_mut(generic).instances.push(instance);
            trace!(name = %name, instances = generic.instances.len(), "added generic instance");
            return Value::Generic(Rc::clone(generic));
        }

        let generic = Value::Generic(Rc::new(GenericFunction { name:      name.clone(),
                                                               instances: vec![instance], }));
        self.scope.define(frame, &name, generic.clone());
        generic
    }

    /// Binds the type name and each of its constructors in `frame`.
    fn define_type(&mut self, decl: &TypeDecl, frame: FrameId) -> Value {
        let scope = self.scope.capture(frame);
        let constructors: Vec<Rc<Constructor>> =
            decl.constructors
                .iter()
                .map(|constructor| {
                    Rc::new(Constructor { type_name: decl.name.clone(),
                                          name:      constructor.name.clone(),
                                          signature: Signature::new(constructor.parameters
                                                                               .clone()),
                                          scope:     Rc::clone(&scope), })
                })
                .collect();

        for constructor in &constructors {
            self.scope.define(frame,
                              &constructor.name,
                              Value::Constructor(Rc::clone(constructor)));
        }
        let union = Value::Type(Rc::new(UnionType { name: decl.name.clone(),
                                                    constructors }));
        self.scope.define(frame, &decl.name, union.clone());
        union
    }
}
