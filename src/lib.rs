//! # lilt
//!
//! lilt is a small, indentation-sensitive, expression-oriented language
//! written in Rust. Source text is tokenized with the off-side rule, parsed
//! by an operator-precedence parser with a juxtaposition call syntax,
//! checked by a static binder, and evaluated by a tree-walking interpreter
//! with closures, named/flag/enum arguments and generic functions over
//! union types.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::Module,
    error::LanguageError,
    interpreter::{
        binder::bind,
        evaluator::{
            core::Interpreter,
            function::core::{BUILTIN_FUNCTIONS, prelude},
            scope::Scope,
        },
        lexer::tokenize,
        parser::core::parse_tokens,
        value::core::Value,
    },
};

/// Defines the structure of parsed code.
///
/// This module declares the `Statement`, `Expr` and `Argument` enums and
/// related types that represent the syntactic structure of source code as a
/// tree. The AST is built by the parser, checked by the binder and traversed
/// by the evaluator.
///
/// # Responsibilities
/// - Defines closed sum types for all language constructs.
/// - Attaches source spans to AST nodes for error reporting.
/// - Renders trees in a layout-independent prefix form.
pub mod ast;
/// Provides unified error types for every phase.
///
/// This module defines all errors that can be raised during tokenizing,
/// parsing, binding or evaluating code, and the [`error::LanguageError`]
/// wrapper callers receive. Every error carries a message and a source span.
///
/// # Responsibilities
/// - Defines error enums for all failure modes.
/// - Attaches line, column and length for caret rendering.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together the tokenizer, token source, parser, binder,
/// signature matcher, evaluator and value representations.
pub mod interpreter;
/// General utilities: source spans and safe numeric conversion.
pub mod util;

/// Options for [`evaluate`].
#[derive(Debug, Default)]
pub struct EvaluateOptions {
    /// A scope returned by an earlier evaluation, to continue from. A fresh
    /// scope is created when absent.
    pub scope:           Option<Scope>,
    /// Values bound in the root frame before evaluation starts.
    pub initial_globals: HashMap<String, Value>,
}

/// The outcome of a successful [`evaluate`].
#[derive(Debug)]
pub struct Evaluation {
    /// The value of the module's last statement.
    pub value: Value,
    /// The scope after evaluation, holding every top-level binding.
    pub scope: Scope,
}

/// Tokenizes, parses and statically binds `source`.
///
/// `global_names` are the names the caller will provide at evaluation time,
/// e.g. the keys of [`EvaluateOptions::initial_globals`] or the top-level
/// names of a REPL scope.
///
/// # Errors
/// A lexical, syntax or binding [`LanguageError`]. Nothing has been
/// evaluated at that point, so a REPL scope the names came from is still
/// valid.
///
/// # Example
/// ```
/// use lilt::parse_module;
///
/// let module = parse_module("foo -nmd 123 + 456", &["foo"]).unwrap();
/// assert_eq!(module.to_string(), "(+ (call foo -nmd=123) 456)");
/// ```
pub fn parse_module(source: &str, global_names: &[&str]) -> Result<Module, LanguageError> {
    let tokens = tokenize(source)?;
    debug!(tokens = tokens.len(), "tokenized source");

    let module = parse_tokens(tokens)?;
    debug!(statements = module.statements.len(), "parsed module");

    bind(&module, global_names)?;
    debug!("bound module");
    Ok(module)
}

/// Evaluates a parsed module.
///
/// Statements run in the root frame of `options.scope` (or of a fresh
/// scope), after `options.initial_globals` have been bound there.
///
/// # Errors
/// A runtime [`LanguageError`]. The scope in `options` is consumed either
/// way and is not handed back on failure, even though statements before the
/// failing one may already have changed it. A caller that wants to continue
/// from the earlier state after an error, like a REPL, passes a clone and
/// keeps the original:
///
/// ```
/// use std::collections::HashMap;
///
/// use lilt::{EvaluateOptions, evaluate, interpreter::evaluator::scope::Scope, parse_module};
///
/// let scope = Scope::new();
/// let module = parse_module("x: 1\n1 / 0", &[]).unwrap();
/// let options = EvaluateOptions { scope:           Some(scope.clone()),
///                                 initial_globals: HashMap::new(), };
///
/// assert!(evaluate(&module, options).is_err());
/// assert_eq!(scope.lookup(Scope::ROOT, "x"), None);
/// ```
///
/// # Example
/// ```
/// use std::collections::HashMap;
///
/// use lilt::{EvaluateOptions, evaluate, interpreter::value::core::Value, parse_module};
///
/// let module = parse_module("if x > y then z", &["x", "y", "z"]).unwrap();
/// let globals = HashMap::from([("x".to_string(), Value::from(5.0)),
///                              ("y".to_string(), Value::from(2.0)),
///                              ("z".to_string(), Value::from(9.0))]);
/// let options = EvaluateOptions { scope:           None,
///                                 initial_globals: globals, };
///
/// assert_eq!(evaluate(&module, options).unwrap().value, Value::from(9.0));
/// ```
pub fn evaluate(module: &Module, options: EvaluateOptions) -> Result<Evaluation, LanguageError> {
    let mut scope = options.scope.unwrap_or_default();
    for (name, value) in options.initial_globals {
        scope.define(Scope::ROOT, &name, value);
    }

    let mut interpreter = Interpreter::new(scope);
    let value = interpreter.eval_module(module)?;
    debug!(%value, "evaluated module");

    Ok(Evaluation { value,
                    scope: interpreter.into_scope() })
}

/// Runs a whole program with the native functions in scope and returns the
/// value of its last statement.
///
/// If `auto_print` is set, that value is printed unless it is `none`.
///
/// # Errors
/// Any [`LanguageError`] from parsing, binding or evaluation.
///
/// # Examples
/// ```
/// use lilt::{interpreter::value::core::Value, run_source};
///
/// let value = run_source("1 + 2 * 3", false).unwrap();
/// assert_eq!(value, Value::from(7.0));
///
/// // 'x' is not defined
/// assert!(run_source("y: x + 1", false).is_err());
/// ```
pub fn run_source(source: &str, auto_print: bool) -> Result<Value, LanguageError> {
    let module = parse_module(source, BUILTIN_FUNCTIONS)?;
    let options = EvaluateOptions { scope:           None,
                                    initial_globals: prelude(), };
    let evaluation = evaluate(&module, options)?;

    if auto_print && evaluation.value != Value::None {
        println!("{}", evaluation.value);
    }

    Ok(evaluation.value)
}
