/// Numeric conversion helpers.
///
/// This module provides safe functions for converting between integer and
/// floating-point types without risking silent data loss or rounding errors.
/// Every number in the language is an `f64`, so anything that crosses from a
/// host integer (a string length, a hexadecimal literal) goes through here.
pub mod num;
/// Source locations.
///
/// Defines [`span::Span`], the `(line, column, length)` triple attached to
/// every token, AST node and error so that callers can underline the
/// offending source text.
pub mod span;
