use logos::Logos;
use ordered_float::OrderedFloat;

use crate::{
    error::LexError,
    util::{num::parse_hex_digits, span::Span},
};

/// The reasons the in-line scanner can reject input.
///
/// Logos produces these; [`tokenize`] turns them into a [`LexError`] once the
/// location is known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    /// No token starts with the current character.
    #[default]
    UnrecognizedCharacter,
    /// A string literal runs to the end of the line.
    UnterminatedString,
    /// A `0x` prefix is not followed by a hexadecimal digit.
    InvalidNumber,
}

/// The kind of a lexical token, together with its value where it has one.
///
/// Everything that can appear inside a single line is recognized by logos.
/// `Newline`, `Indent`, `Dedent` and `Eof` are structural: [`tokenize`]
/// inserts them while it tracks indentation.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(error = LexErrorKind)]
pub enum TokenKind {
    /// Numeric literal tokens, such as `42`, `-3.5` or `0x1F`.
    ///
    /// A leading `-` belongs to the number only when a digit follows it
    /// immediately.
    #[regex(r"-?[0-9]+(\.[0-9]+)?", parse_decimal)]
    #[regex(r"-?0[xX][0-9a-fA-F]+", parse_hex)]
    #[regex(r"-?0[xX]", invalid_number)]
    Number(OrderedFloat<f64>),
    /// Double-quoted string literals with `\n`, `\t`, `\"` and `\\` escapes.
    #[regex(r#""([^"\\]|\\.)*""#, parse_string)]
    #[regex(r#""([^"\\]|\\.)*"#, unterminated_string)]
    Str(String),
    /// `true` and `false`.
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),
    /// `if`
    #[token("if")]
    If,
    /// `then`
    #[token("then")]
    Then,
    /// `else`
    #[token("else")]
    Else,
    /// `and`
    #[token("and")]
    And,
    /// `or`
    #[token("or")]
    Or,
    /// `not`
    #[token("not")]
    Not,
    /// `fn`
    #[token("fn")]
    Fn,
    /// `type`
    #[token("type")]
    Type,
    /// Identifiers, which may be kebab-case: `area`, `max-width`, `x2`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(-[a-zA-Z0-9_]+)*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// A flag such as `-verbose`; the value is the name without the dash.
    #[regex(r"-[a-zA-Z_][a-zA-Z0-9_]*(-[a-zA-Z0-9_]+)*", |lex| lex.slice()[1..].to_string())]
    Flag(String),
    /// `()`, optionally with spaces inside.
    #[regex(r"\([ \t]*\)")]
    EmptyParens,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `=`
    #[token("=")]
    Equals,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `.`
    #[token(".")]
    Dot,
    /// `,`
    #[token(",")]
    Comma,
    /// `:`
    #[token(":")]
    Colon,
    /// `|`
    #[token("|")]
    Pipe,
    /// `// Comments.`
    #[regex(r"//[^\n]*", logos::skip)]
    Comment,
    /// Spaces, tabs and feeds between tokens.
    #[regex(r"[ \t\f]+", logos::skip)]
    Ignored,

    /// End of a physical line.
    Newline,
    /// Indentation increased.
    Indent,
    /// Indentation decreased by one level.
    Dedent,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Describes the token for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number {}", crate::util::num::format_number(*n)),
            Self::Str(s) => format!("string {s:?}"),
            Self::Bool(b) => format!("'{b}'"),
            Self::Identifier(name) => format!("identifier '{name}'"),
            Self::Flag(name) => format!("flag '-{name}'"),
            Self::Newline => "end of line".to_string(),
            Self::Indent => "indentation".to_string(),
            Self::Dedent => "dedent".to_string(),
            Self::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    const fn symbol(&self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Then => "then",
            Self::Else => "else",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Fn => "fn",
            Self::Type => "type",
            Self::EmptyParens => "()",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Equals => "=",
            Self::BangEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Pipe => "|",
            _ => "?",
        }
    }

    /// Returns `true` for tokens that can begin a call argument.
    ///
    /// These are the tokens that turn a call head followed by whitespace into
    /// a juxtaposition call.
    #[must_use]
    pub const fn starts_argument(&self) -> bool {
        matches!(self,
                 Self::Number(_)
                 | Self::Str(_)
                 | Self::Bool(_)
                 | Self::Identifier(_)
                 | Self::Flag(_)
                 | Self::LParen
                 | Self::Fn)
    }
}

/// A lexical token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What the token is.
    pub kind:   TokenKind,
    /// 1-based line.
    pub line:   usize,
    /// 1-based column of the first character.
    pub column: usize,
    /// Length in characters.
    pub length: usize,
}

impl Token {
    /// The source region covered by this token.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.line, self.column, self.length)
    }
}

/// Parses a decimal literal from the current token slice.
fn parse_decimal(lex: &logos::Lexer<TokenKind>) -> Result<OrderedFloat<f64>, LexErrorKind> {
    lex.slice()
       .parse::<f64>()
       .map(OrderedFloat)
       .map_err(|_| LexErrorKind::InvalidNumber)
}

/// Parses a hexadecimal literal, keeping an optional leading sign.
fn parse_hex(lex: &logos::Lexer<TokenKind>) -> Result<OrderedFloat<f64>, LexErrorKind> {
    let slice = lex.slice();
    let (negative, digits) = match slice.strip_prefix('-') {
        Some(rest) => (true, &rest[2..]),
        None => (false, &slice[2..]),
    };
    let value = parse_hex_digits(digits).ok_or(LexErrorKind::InvalidNumber)?;
    Ok(OrderedFloat(if negative { -value } else { value }))
}

/// A `0x` prefix that is not followed by a hexadecimal digit.
const fn invalid_number(_: &logos::Lexer<TokenKind>) -> Result<OrderedFloat<f64>, LexErrorKind> {
    Err(LexErrorKind::InvalidNumber)
}

/// Strips the quotes off a string literal and resolves its escapes.
///
/// Unknown escapes are kept verbatim, backslash included.
fn parse_string(lex: &logos::Lexer<TokenKind>) -> String {
    let slice = lex.slice();
    let body = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }
    out
}

/// A string literal that reaches the end of its line without a closing quote.
const fn unterminated_string(_: &logos::Lexer<TokenKind>) -> Result<String, LexErrorKind> {
    Err(LexErrorKind::UnterminatedString)
}

/// Turns source text into a flat token stream.
///
/// Each physical line is measured for its leading spaces before its contents
/// are scanned. An increase over the top of the indent stack pushes the new
/// level and emits [`TokenKind::Indent`]; a decrease pops levels, emitting one
/// [`TokenKind::Dedent`] per level, until the top equals the new width
/// exactly. Blank and comment-only lines emit a lone [`TokenKind::Newline`]
/// and leave the stack alone. At the end of input every open level is closed
/// and a terminal [`TokenKind::Eof`] is emitted.
///
/// While a parenthesis opened on an earlier line is still unclosed, a dedent
/// that lands between two levels re-pushes the new width instead of failing.
/// Such lines are continuation lines; the token source hides their
/// indentation from the parser.
///
/// # Errors
/// Returns a [`LexError`] for tabs in indentation, inconsistent dedents,
/// invalid numbers, unterminated strings and unrecognized characters.
///
/// # Example
/// ```
/// use lilt::interpreter::lexer::{TokenKind, tokenize};
///
/// let tokens = tokenize("if x:\n    y\n").unwrap();
/// let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
///
/// assert_eq!(kinds,
///            vec![TokenKind::If,
///                 TokenKind::Identifier("x".into()),
///                 TokenKind::Colon,
///                 TokenKind::Newline,
///                 TokenKind::Indent,
///                 TokenKind::Identifier("y".into()),
///                 TokenKind::Newline,
///                 TokenKind::Newline,
///                 TokenKind::Dedent,
///                 TokenKind::Eof]);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut indents = vec![0_usize];
    let mut depth: i64 = 0;
    let mut last_line = 1;

    for (index, raw) in source.split('\n').enumerate() {
        let line = index + 1;
        last_line = line;
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        let rest = text.trim_start_matches([' ', '\t']);
        let leading = &text[..text.len() - rest.len()];

        if rest.is_empty() || rest.starts_with("//") {
            tokens.push(structural(TokenKind::Newline, line, text.chars().count() + 1));
            continue;
        }
        if let Some(position) = leading.find('\t') {
            return Err(LexError::TabIndentation { span: Span::new(line, position + 1, 1) });
        }

        let indent = leading.len();
        push_indentation(&mut tokens, &mut indents, indent, depth > 0, line)?;

        let mut lexer = TokenKind::lexer(rest);
        while let Some(result) = lexer.next() {
            let range = lexer.span();
            let column = indent + rest[..range.start].chars().count() + 1;
            let length = lexer.slice().chars().count();
            let span = Span::new(line, column, length);
            match result {
                Ok(kind) => {
                    match kind {
                        TokenKind::LParen => depth += 1,
                        TokenKind::RParen => depth -= 1,
                        _ => {},
                    }
                    tokens.push(Token { kind,
                                        line,
                                        column,
                                        length });
                },
                Err(kind) => return Err(lex_error(kind, lexer.slice(), span)),
            }
        }
        tokens.push(structural(TokenKind::Newline, line, text.chars().count() + 1));
    }

    while indents.len() > 1 {
        indents.pop();
        tokens.push(structural(TokenKind::Dedent, last_line, 1));
    }
    tokens.push(structural(TokenKind::Eof, last_line, 1));

    Ok(tokens)
}

/// Compares a line's indentation with the indent stack and emits the
/// matching `Indent`/`Dedent` tokens.
fn push_indentation(tokens: &mut Vec<Token>,
                    indents: &mut Vec<usize>,
                    indent: usize,
                    continuation: bool,
                    line: usize)
                    -> Result<(), LexError> {
    let top = indents.last().copied().unwrap_or(0);
    if indent > top {
        indents.push(indent);
        tokens.push(structural(TokenKind::Indent, line, indent + 1));
        return Ok(());
    }

    while indents.last().is_some_and(|&level| indent < level) {
        indents.pop();
        tokens.push(structural(TokenKind::Dedent, line, indent + 1));
    }

    let top = indents.last().copied().unwrap_or(0);
    if indent != top {
        if !continuation {
            return Err(LexError::InconsistentDedent { found: indent,
                                                      span:  Span::new(line, indent + 1, 1), });
        }
        indents.push(indent);
        tokens.push(structural(TokenKind::Indent, line, indent + 1));
    }
    Ok(())
}

/// Creates a zero-length structural token.
const fn structural(kind: TokenKind, line: usize, column: usize) -> Token {
    Token { kind,
            line,
            column,
            length: 0 }
}

/// Attaches a location to a scanner error.
fn lex_error(kind: LexErrorKind, slice: &str, span: Span) -> LexError {
    match kind {
        LexErrorKind::UnrecognizedCharacter => {
            LexError::UnrecognizedCharacter { text: slice.to_string(),
                                              span }
        },
        LexErrorKind::UnterminatedString => LexError::UnterminatedString { span },
        LexErrorKind::InvalidNumber => LexError::InvalidNumber { text: slice.to_string(),
                                                                 span },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn dashes_form_flags_numbers_and_names() {
        assert_eq!(kinds("f -v -1 a-b - c"),
                   vec![TokenKind::Identifier("f".into()),
                        TokenKind::Flag("v".into()),
                        TokenKind::Number(OrderedFloat(-1.0)),
                        TokenKind::Identifier("a-b".into()),
                        TokenKind::Minus,
                        TokenKind::Identifier("c".into()),
                        TokenKind::Newline,
                        TokenKind::Eof]);
    }

    #[test]
    fn empty_parentheses_are_one_token() {
        assert_eq!(kinds("f ( )")[1], TokenKind::EmptyParens);
        assert_eq!(kinds("f()")[1], TokenKind::EmptyParens);
        assert_eq!(kinds("(x)")[0], TokenKind::LParen);
    }

    #[test]
    fn tabs_in_indentation_are_rejected() {
        assert!(matches!(tokenize("if x:\n\ty"), Err(LexError::TabIndentation { .. })));
    }

    #[test]
    fn dedent_between_levels_is_rejected_outside_parentheses() {
        assert!(matches!(tokenize("a:\n    b\n  c"),
                         Err(LexError::InconsistentDedent { found: 2, .. })));
        assert!(tokenize("f (a,\n        b,\n    c)").is_ok());
    }

    #[test]
    fn comment_lines_are_blank() {
        assert_eq!(kinds("// note\nx"),
                   vec![TokenKind::Newline,
                        TokenKind::Identifier("x".into()),
                        TokenKind::Newline,
                        TokenKind::Eof]);
    }
}
