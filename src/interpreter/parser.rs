/// The expression loop, delimiter stack and module entry point.
///
/// Owns the [`core::Parser`] state and drives the operator table: one
/// prefix handler per term, then infix handlers for as long as their binding
/// power allows.
pub mod core;

/// The operator table.
///
/// Maps each token kind to its prefix handler and to its infix handler with
/// left and right binding powers. The standard table is built once.
pub mod operators;

/// The call-syntax resolver.
///
/// Turns a call head followed by `()` or by juxtaposed arguments into a call
/// node, classifying each argument as positional, named, flag or enum.
pub mod call;

/// Statements and statement blocks.
///
/// Parses logical lines, indented blocks, named function definitions,
/// union type declarations and `if` expressions.
pub mod statement;

/// Parameter lists of functions and constructors.
pub mod params;
