use crate::{
    ast::{Expr, Module},
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind},
        parser::operators::{OperatorTable, STANDARD_TABLE},
        token_source::TokenSource,
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Delimiter set in which `,` ends the expression.
pub const COMMA_DELIMITED: &[TokenKind] = &[TokenKind::Comma];
/// Delimiter set of a parenthesized expression.
pub const NO_DELIMITERS: &[TokenKind] = &[];

/// The left operand handed to an infix handler.
///
/// `grouped` records whether the expression was written in parentheses. It
/// is not part of the tree: it only matters for deciding whether the
/// expression may serve as a call head.
#[derive(Debug, Clone)]
pub struct Operand {
    /// The expression parsed so far.
    pub expr:    Expr,
    /// Whether `expr` was wrapped in explicit parentheses.
    pub grouped: bool,
}

/// A table-driven expression parser over a [`TokenSource`].
///
/// Besides the token source the parser keeps a stack of delimiter sets.
/// While a set is on top, its token kinds end the expression being parsed
/// even if the operator table knows an infix handler for them. This is how a
/// `,` ends an argument only inside the call that owns it.
pub struct Parser<'t> {
    /// The logical-line view of the token stream.
    pub source:   TokenSource,
    table:        &'t OperatorTable,
    delimiters:   Vec<&'static [TokenKind]>,
    /// Set by the group handler, read once by the expression loop.
    last_grouped: bool,
}

impl Parser<'static> {
    /// Creates a parser over `tokens` using the standard operator table.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser::with_table(tokens, &STANDARD_TABLE)
    }
}

impl<'t> Parser<'t> {
    /// Creates a parser over `tokens` using a caller-supplied operator
    /// table.
    #[must_use]
    pub fn with_table(tokens: Vec<Token>, table: &'t OperatorTable) -> Self {
        Self { source: TokenSource::new(tokens),
               table,
               delimiters: Vec::new(),
               last_grouped: false }
    }

    /// Parses a whole module: statements separated by line breaks until the
    /// end of input.
    ///
    /// # Errors
    /// The first [`ParseError`] encountered.
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        let mut statements = Vec::new();
        while self.source.eat(&TokenKind::Newline) {}

        while !self.source.at(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
            while self.source.eat(&TokenKind::Newline) {}
            if self.source.at(&TokenKind::Dedent) {
                return Err(self.source.unexpected("a statement"));
            }
        }

        Ok(Module { statements })
    }

    /// Parses an expression whose operators all bind tighter than
    /// `min_binding_power`.
    ///
    /// This is the core loop: one prefix handler for the first term, then,
    /// while the current token has an infix handler, is not an active
    /// delimiter, and binds tighter than `min_binding_power`, that handler is
    /// applied with the expression so far as its left operand.
    ///
    /// A `:` at the end of a line is never treated as an operator; it opens a
    /// block for the enclosing construct.
    ///
    /// # Errors
    /// A [`ParseError`] if the current token cannot start an expression or a
    /// handler fails.
    pub fn parse_expression(&mut self, min_binding_power: u8) -> ParseResult<Expr> {
        let prefix = match self.table.prefix(self.source.current_kind()) {
            Some(prefix) => prefix,
            None => return Err(self.no_prefix_error()),
        };
        self.last_grouped = false;
        let expr = prefix(self)?;
        let mut left = Operand { expr,
                                 grouped: std::mem::take(&mut self.last_grouped) };

        loop {
            let kind = self.source.current_kind();
            // A block closed the line; the next token starts a new statement.
            if self.is_delimiter(kind) || self.at_block_opener() || self.source.after_line_end() {
                break;
            }
            let Some(rule) = self.table.infix(kind) else {
                break;
            };
            if rule.left_binding_power <= min_binding_power {
                break;
            }
            let (handler, right_binding_power) = (rule.handler, rule.right_binding_power);
            let expr = handler(self, left, right_binding_power)?;
            left = Operand { expr,
                             grouped: false };
        }

        Ok(left.expr)
    }

    /// Makes `delimiters` end expressions until the matching
    /// [`Self::pop_delimiters`].
    pub fn push_delimiters(&mut self, delimiters: &'static [TokenKind]) {
        self.delimiters.push(delimiters);
    }

    /// Restores the delimiter set that was active before the last push.
    pub fn pop_delimiters(&mut self) {
        self.delimiters.pop();
    }

    /// Whether `kind` ends expressions in the current context.
    #[must_use]
    pub fn is_delimiter(&self, kind: &TokenKind) -> bool {
        self.delimiters.last().is_some_and(|set| set.contains(kind))
    }

    /// Marks the expression just returned by a prefix handler as written in
    /// parentheses.
    pub(in crate::interpreter::parser) const fn mark_grouped(&mut self) {
        self.last_grouped = true;
    }

    /// `:` followed by the end of the line.
    fn at_block_opener(&self) -> bool {
        self.source.at(&TokenKind::Colon) && self.source.peek(1).kind == TokenKind::Newline
    }

    fn no_prefix_error(&self) -> ParseError {
        let token = self.source.current();
        match &token.kind {
            TokenKind::Flag(name) => ParseError::FlagOutsideCall { name: name.clone(),
                                                                   span: token.span(), },
            _ => self.source.unexpected("an expression"),
        }
    }
}

/// Tokenizes nothing itself: parses an already tokenized module.
///
/// # Errors
/// The first [`ParseError`] encountered.
///
/// # Example
/// ```
/// use lilt::interpreter::{lexer::tokenize, parser::core::parse_tokens};
///
/// let module = parse_tokens(tokenize("foo -verbose bar, x").unwrap()).unwrap();
/// assert_eq!(module.to_string(), "(call foo -verbose=(call bar x))");
/// ```
pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Module> {
    Parser::new(tokens).parse_module()
}
