use std::collections::HashMap;

use crate::{
    ast::{Argument, Block, Expr, FunctionDef, Module, Parameter, Statement, TypeDecl},
    error::BindError,
    interpreter::signature::{Signature, match_arguments},
    util::span::Span,
};

/// Type names every parameter annotation may use without a declaration.
pub const BUILTIN_TYPE_NAMES: &[&str] = &["number", "string", "bool", "function", "any"];

/// What the binder knows about a name.
#[derive(Debug, Clone)]
enum Entry {
    /// Any value whose shape is unknown before evaluation.
    Value,
    /// A name bound to a function literal.
    Function(Signature),
    /// The instances of a generic function defined with `fn name`. `open`
    /// generics extend a global of the same name, so their full instance
    /// list is not known statically.
    Generic { signatures: Vec<Signature>, open: bool },
    /// A union type.
    Type,
    /// A constructor of a union type.
    Constructor(Signature),
}

impl Entry {
    fn signatures(&self) -> Option<&[Signature]> {
        match self {
            Self::Function(signature) | Self::Constructor(signature) => {
                Some(std::slice::from_ref(signature))
            },
            Self::Generic { signatures, open: false } => Some(signatures),
            _ => None,
        }
    }
}

/// A call whose callee resolved to a known callable, checked once the scope
/// defining that callable is complete.
struct PendingCall<'m> {
    name:      &'m str,
    arguments: &'m [Argument],
    span:      Span,
}

#[derive(Default)]
struct Scope<'m> {
    names:   HashMap<String, Entry>,
    pending: Vec<PendingCall<'m>>,
}

/// Resolves every identifier of a module against its lexical scopes.
///
/// Scopes form a stack: index 0 holds the global names, index 1 the module
/// itself, and every block, `if` branch and function body pushes one more.
struct Binder<'m> {
    scopes: Vec<Scope<'m>>,
}

/// Checks that every identifier in `module` is defined before it is used,
/// that no name is bound twice in one scope, that parameter annotations name
/// known types, and that calls to statically known functions and
/// constructors fit one of their signatures.
///
/// `global_names` are visible everywhere and may be shadowed by the module.
///
/// # Errors
/// The first [`BindError`] found, in source order.
///
/// # Example
/// ```
/// use lilt::{
///     error::BindError,
///     interpreter::{binder::bind, lexer::tokenize, parser::core::parse_tokens},
/// };
///
/// let module = parse_tokens(tokenize("y: x + 1").unwrap()).unwrap();
/// assert!(bind(&module, &["x"]).is_ok());
///
/// let error = bind(&module, &[]).unwrap_err();
/// assert!(matches!(error, BindError::UndefinedIdentifier { .. }));
/// ```
pub fn bind(module: &Module, global_names: &[&str]) -> Result<(), BindError> {
    let globals = global_names.iter()
                              .map(|name| ((*name).to_string(), Entry::Value))
                              .collect();
    let mut binder = Binder { scopes: vec![Scope { names:   globals,
                                                   pending: Vec::new(), }], };

    binder.push_scope();
    for statement in &module.statements {
        binder.bind_statement(statement)?;
    }
    binder.pop_scope()
}

impl<'m> Binder<'m> {
    fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Closes the innermost scope, validating the calls that resolved to its
    /// callables.
    fn pop_scope(&mut self) -> Result<(), BindError> {
        let Some(scope) = self.scopes.pop() else {
            return Ok(());
        };
        for call in &scope.pending {
            let Some(signatures) = scope.names.get(call.name).and_then(Entry::signatures) else {
                continue;
            };
            check_call(call, signatures)?;
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<(usize, &Entry)> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, scope)| scope.names.get(name).map(|entry| (index, entry)))
    }

    fn current(&mut self) -> &mut Scope<'m> {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Adds `name` to the innermost scope.
    fn define(&mut self, name: &str, entry: Entry, span: Span) -> Result<(), BindError> {
        let scope = self.current();
        if scope.names.contains_key(name) {
            return Err(BindError::Redefinition { name: name.to_string(),
                                                 span });
        }
        scope.names.insert(name.to_string(), entry);
        Ok(())
    }

    fn bind_statement(&mut self, statement: &'m Statement) -> Result<(), BindError> {
        match statement {
            Statement::Expression(expr) => self.bind_expr(expr),
            Statement::Function(def) => self.bind_function_definition(def),
            Statement::Type(decl) => self.bind_type(decl),
        }
    }

    fn bind_block(&mut self, block: &'m Block) -> Result<(), BindError> {
        self.push_scope();
        for statement in &block.statements {
            self.bind_statement(statement)?;
        }
        self.pop_scope()
    }

    /// `fn name(...)`: the first definition in a scope creates the generic
    /// function, later ones add instances. The name is visible in the body.
    fn bind_function_definition(&mut self, def: &'m FunctionDef) -> Result<(), BindError> {
        let Some(name) = def.name.as_deref() else {
            return self.bind_function(def);
        };
        let signature = Signature::new(def.parameters.clone());
        let global = self.scopes.len() == 2 && self.scopes[0].names.contains_key(name);

        match self.current().names.get_mut(name) {
            Some(Entry::Generic { signatures, .. }) => signatures.push(signature),
            Some(_) => {
                return Err(BindError::Redefinition { name: name.to_string(),
                                                     span: def.span, });
            },
            None => {
                self.define(name,
                            Entry::Generic { signatures: vec![signature],
                                             open:       global, },
                            def.span)?;
            },
        }

        self.bind_function(def)
    }

    /// Binds parameter defaults and the body in a fresh scope holding the
    /// parameters.
    fn bind_function(&mut self, def: &'m FunctionDef) -> Result<(), BindError> {
        self.push_scope();
        self.bind_parameters(&def.parameters)?;
        for statement in &def.body.statements {
            self.bind_statement(statement)?;
        }
        self.pop_scope()
    }

    /// Defines parameters in order; a default sees only the parameters
    /// declared before it.
    fn bind_parameters(&mut self, parameters: &'m [Parameter]) -> Result<(), BindError> {
        for parameter in parameters {
            if let Some(type_name) = &parameter.type_name {
                self.check_type_name(type_name, parameter.span)?;
            }
            if let Some(default) = &parameter.default
               && parameter.enum_members.is_none()
            {
                self.bind_expr(default)?;
            }
            self.define(&parameter.name, Entry::Value, parameter.span)?;
        }
        Ok(())
    }

    fn check_type_name(&self, name: &str, span: Span) -> Result<(), BindError> {
        if BUILTIN_TYPE_NAMES.contains(&name)
           || matches!(self.lookup(name), Some((_, Entry::Type | Entry::Constructor(_))))
        {
            return Ok(());
        }
        Err(BindError::UnknownType { name: name.to_string(),
                                     span })
    }

    /// The type name and every constructor go into the current scope. Field
    /// defaults are bound like parameter defaults.
    fn bind_type(&mut self, decl: &'m TypeDecl) -> Result<(), BindError> {
        self.define(&decl.name, Entry::Type, decl.span)?;
        for constructor in &decl.constructors {
            self.push_scope();
            let fields = self.bind_parameters(&constructor.parameters);
            self.scopes.pop();
            fields?;
            self.define(&constructor.name,
                        Entry::Constructor(Signature::new(constructor.parameters.clone())),
                        constructor.span)?;
        }
        Ok(())
    }

    fn bind_expr(&mut self, expr: &'m Expr) -> Result<(), BindError> {
        match expr {
            Expr::Identifier { name, span } => match self.lookup(name) {
                Some(_) => Ok(()),
                None => Err(BindError::UndefinedIdentifier { name: name.clone(),
                                                             span: *span, }),
            },
            Expr::Number { .. } | Expr::Str { .. } | Expr::Bool { .. } => Ok(()),
            Expr::Unary { operand, .. } => self.bind_expr(operand),
            Expr::Binary { left, right, .. } => {
                self.bind_expr(left)?;
                self.bind_expr(right)
            },
            Expr::Member { object, .. } => self.bind_expr(object),
            Expr::Call { callee,
                         arguments,
                         span, } => self.bind_call(callee, arguments, *span),
            Expr::If { condition,
                       then_branch,
                       else_branch,
                       .. } => {
                self.bind_expr(condition)?;
                self.bind_block(then_branch)?;
                match else_branch {
                    Some(block) => self.bind_block(block),
                    None => Ok(()),
                }
            },
            Expr::Binding { bindings, .. } => {
                for pair in bindings {
                    self.bind_expr(&pair.value)?;
                    let entry = match &pair.value {
                        Expr::Function(def) => {
                            Entry::Function(Signature::new(def.parameters.clone()))
                        },
                        _ => Entry::Value,
                    };
                    self.define(&pair.name, entry, pair.span)?;
                }
                Ok(())
            },
            Expr::Function(def) => self.bind_function(def),
        }
    }

    fn bind_call(&mut self,
                 callee: &'m Expr,
                 arguments: &'m [Argument],
                 span: Span)
                 -> Result<(), BindError> {
        self.bind_expr(callee)?;
        for argument in arguments {
            match argument {
                Argument::Positional(value) | Argument::Named { value, .. } => {
                    self.bind_expr(value)?;
                },
                Argument::Flag { .. } | Argument::Enum { .. } => {},
            }
        }

        if let Expr::Identifier { name, .. } = callee
           && let Some((index, entry)) = self.lookup(name)
           && entry.signatures().is_some()
        {
            self.scopes[index].pending.push(PendingCall { name,
                                                          arguments,
                                                          span });
        }
        Ok(())
    }
}

fn check_call(call: &PendingCall<'_>, signatures: &[Signature]) -> Result<(), BindError> {
    let mut first_error = None;
    for signature in signatures {
        match match_arguments(signature, call.arguments) {
            Ok(_) => return Ok(()),
            Err(error) => {
                first_error.get_or_insert(error);
            },
        }
    }
    match first_error {
        Some(reason) => Err(BindError::InvalidCall { name: call.name.to_string(),
                                                     reason,
                                                     span: call.span }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{lexer::tokenize, parser::core::parse_tokens, signature::MatchError};

    fn bind_source(source: &str, globals: &[&str]) -> Result<(), BindError> {
        let module = parse_tokens(tokenize(source).unwrap()).unwrap();
        bind(&module, globals)
    }

    #[test]
    fn block_bindings_do_not_leak() {
        let source = "if true:\n    inner: 1\n    inner\ninner\n";
        assert!(matches!(bind_source(source, &[]),
                         Err(BindError::UndefinedIdentifier { name, .. }) if name == "inner"));
    }

    #[test]
    fn use_before_binding_is_rejected() {
        assert!(matches!(bind_source("y: x\nx: 1", &[]),
                         Err(BindError::UndefinedIdentifier { .. })));
    }

    #[test]
    fn redefinition_in_same_scope() {
        assert!(matches!(bind_source("x: 1\nx: 2", &[]),
                         Err(BindError::Redefinition { .. })));
        assert!(bind_source("x: 1\nif true:\n    x: 2\n", &[]).is_ok());
    }

    #[test]
    fn module_may_shadow_globals() {
        assert!(bind_source("x: x + 1", &["x"]).is_ok());
    }

    #[test]
    fn recursion_and_generic_instances() {
        let source = "fn fact(n): if n < 2 then 1 else n * fact (n - 1)\n\
                      fn fact(): 0\n\
                      fact 5\n";
        assert!(bind_source(source, &[]).is_ok());
    }

    #[test]
    fn calls_are_checked_against_known_signatures() {
        let bad = bind_source("fn f(x): x\nf -y 1", &[]);
        assert!(matches!(bad,
                         Err(BindError::InvalidCall { reason: MatchError::NotAValidArgument { .. },
                                                      .. })));

        let missing = bind_source("fn f(x, y): x\nf 1", &[]);
        assert!(matches!(missing, Err(BindError::InvalidCall { .. })));

        // A later instance may accept a call seen earlier in the same scope.
        assert!(bind_source("fn f(x): x\ng: fn (): f 1 2\nfn f(x, y): y", &[]).is_ok());
    }

    #[test]
    fn parameter_annotations_name_types() {
        let source = "type shape: circle(r) | square(s)\nfn area(s: circle): s.r";
        assert!(bind_source(source, &[]).is_ok());
        assert!(bind_source("fn twice(x: number): x * 2", &[]).is_ok());
        assert!(matches!(bind_source("fn f(x: widget): x", &[]),
                         Err(BindError::UnknownType { .. })));
    }
}
