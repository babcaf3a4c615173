/// Core evaluation logic.
///
/// Contains the [`core::Interpreter`], statement and expression dispatch,
/// blocks, bindings, member access and the definition of generic functions
/// and union types.
pub mod core;

/// The scope chain as an arena of frames addressed by index.
pub mod scope;

/// Binary operator evaluation logic.
///
/// Handles short-circuit `and`/`or`, arithmetic, string concatenation,
/// ordering and structural equality.
pub mod binary;

/// Call evaluation.
///
/// Matches arguments against signatures, evaluates them in the caller's
/// frame, dispatches generic functions and builds union type instances.
pub mod call;

/// Native functions.
///
/// Holds the built-in function table and the prelude of global bindings
/// derived from it.
pub mod function;
