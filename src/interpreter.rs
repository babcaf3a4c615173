/// The lexer module tokenizes source code for further parsing.
///
/// The lexer (tokenizer) reads the raw source text line by line, measures
/// each line's indentation, and produces a stream of tokens: literals,
/// identifiers, flags, operators, keywords, and the structural `Newline`,
/// `Indent`, `Dedent` and `Eof` tokens that encode the off-side rule.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with type and source
///   location.
/// - Tracks the indentation stack and rejects inconsistent dedents.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// Groups the token stream into logical lines.
///
/// Hides line breaks and indentation changes that only continue an
/// expression inside parentheses, and tracks the indentation of open
/// statement blocks.
pub mod token_source;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser is an operator-precedence (Pratt) parser driven by a fixed
/// operator table, with a dedicated resolver for juxtaposition call syntax.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes (expressions, statements).
/// - Validates correct grammar and syntax, reporting errors with location
///   info at the earliest offending token.
/// - Classifies call arguments as positional, named, flag or enum.
pub mod parser;
/// The static binder.
///
/// Checks every identifier against its lexical scopes before evaluation and
/// validates calls to statically known functions and constructors.
pub mod binder;
/// Signatures and the argument matcher shared by the binder and the
/// evaluator.
pub mod signature;
/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the bound AST over an arena of scope frames.
///
/// # Responsibilities
/// - Evaluates expressions and statements, including closures, generic
///   function dispatch and union type constructors.
/// - Reports runtime errors such as division by zero or a call no generic
///   instance accepts.
pub mod evaluator;
/// The value module defines the runtime data types for evaluation.
///
/// # Responsibilities
/// - Defines the `Value` enum and all supported value variants.
/// - Implements truthiness, structural equality and type tests.
pub mod value;
