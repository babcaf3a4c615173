/// Native function implementations.
///
/// Numeric, string and output helpers available in every program.
pub mod builtin;

/// The native function table.
///
/// Declares each native's name, parameters and implementation in one place
/// and builds the global prelude from it.
pub mod core;
