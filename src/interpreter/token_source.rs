use std::collections::HashMap;

use crate::{
    error::ParseError,
    interpreter::lexer::{Token, TokenKind},
    util::span::Span,
};

/// Groups the raw token stream into logical lines for the parser.
///
/// The tokenizer reports every physical line ending and every change of
/// indentation. The parser only wants to see a [`TokenKind::Newline`] when a
/// statement really ends, so this wrapper hides the ones that sit inside an
/// open parenthesis (as long as the continuation line is indented at least as
/// far as the line that opened the statement), collapses runs of blank lines
/// into one, and swallows the `Indent`/`Dedent` tokens produced purely by
/// the indentation of continuation lines.
///
/// Swallowed indentation is counted in `excess` and reconciled against the
/// `Dedent`s that follow once the parenthesis closes
/// ([`Self::skip_continued_line_excess_indentation`]), so visual alignment
/// inside parentheses never desynchronizes block structure.
///
/// Blocks are tracked on a separate stack of indentation widths, pushed by
/// [`Self::try_enter_block`] and popped by [`Self::exit_block`].
pub struct TokenSource {
    tokens:        Vec<Token>,
    position:      usize,
    /// Open `(` minus closed `)` among consumed tokens.
    depth:         i32,
    /// Indent tokens minus dedent tokens swallowed while `depth > 0`.
    excess:        i32,
    /// Indentation of each physical line that holds a real token.
    line_indents:  HashMap<usize, usize>,
    /// Indentation of the line that opened each logical line in progress.
    logical_lines: Vec<usize>,
    /// Indentation of each open statement block.
    block_indents: Vec<usize>,
    /// Whether the last consumed token ended a line or a block.
    line_ended:    bool,
}

impl TokenSource {
    /// Wraps a token stream produced by
    /// [`tokenize`](crate::interpreter::lexer::tokenize).
    ///
    /// The stream must end with [`TokenKind::Eof`]; one is appended if it
    /// does not.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token { kind: TokenKind::Eof,
                                line,
                                column: 1,
                                length: 0 });
        }

        let mut line_indents = HashMap::new();
        for token in &tokens {
            if !is_structural(&token.kind) {
                line_indents.entry(token.line)
                            .or_insert_with(|| token.column.saturating_sub(1));
            }
        }

        let mut source = Self { tokens,
                                position: 0,
                                depth: 0,
                                excess: 0,
                                line_indents,
                                logical_lines: Vec::new(),
                                block_indents: vec![0],
                                line_ended: true };
        source.settle();
        source
    }

    /// The token the parser is looking at.
    #[must_use]
    pub fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    /// The kind of the current token.
    #[must_use]
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// The raw token `offset` places after the current one, without any
    /// logical-line filtering.
    #[must_use]
    pub fn peek(&self, offset: usize) -> &Token {
        &self.tokens[(self.position + offset).min(self.tokens.len() - 1)]
    }

    /// Consumes the current token and returns it.
    ///
    /// Parenthesis depth is updated before the next token is settled, so a
    /// line break right after `(` is already treated as a continuation.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        match token.kind {
            TokenKind::LParen => self.depth += 1,
            TokenKind::RParen => self.depth -= 1,
            TokenKind::Eof => return token,
            _ => {},
        }
        self.line_ended = matches!(token.kind, TokenKind::Newline | TokenKind::Dedent);
        self.position += 1;
        self.settle();
        token
    }

    /// Returns `true` when the current token is `kind`.
    #[must_use]
    pub fn at(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token if it is `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// Consumes the current token, failing if it is not `kind`.
    pub fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            return Ok(self.advance());
        }
        Err(self.unexpected(expected))
    }

    /// Builds an "unexpected token" error for the current token.
    #[must_use]
    pub fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        match token.kind {
            TokenKind::Eof => ParseError::UnexpectedEndOfInput { span: token.span() },
            TokenKind::Indent => ParseError::UnexpectedIndentation { span: token.span() },
            _ => ParseError::UnexpectedToken { token:    token.kind.describe(),
                                               expected: expected.to_string(),
                                               span:     token.span(), },
        }
    }

    /// Marks the start of a logical line at the current token.
    ///
    /// Its indentation becomes the reference against which continuation
    /// lines inside parentheses are compared.
    pub fn begin_logical_line(&mut self) {
        let indent = self.indent_of(self.current().line);
        self.logical_lines.push(indent);
    }

    /// Closes the logical line opened by the matching
    /// [`Self::begin_logical_line`].
    pub fn end_logical_line(&mut self) {
        self.logical_lines.pop();
    }

    /// Enters an indented statement block if the current tokens are `:`
    /// followed by the end of the line.
    ///
    /// On success the `:`, the line break (and any blank lines) and the
    /// indentation increase are consumed, and the indentation of the block's
    /// first line is pushed on the block-indent stack.
    ///
    /// Inside parentheses line breaks do not separate statements, so no block
    /// starts there and the body continues inline on the following lines.
    ///
    /// # Returns
    /// `Ok(false)` without consuming anything if no block starts here.
    ///
    /// # Errors
    /// [`ParseError::EmptyStatementBlock`] when the line after `:` is not
    /// indented.
    pub fn try_enter_block(&mut self) -> Result<bool, ParseError> {
        if self.in_parentheses()
           || !self.at(&TokenKind::Colon)
           || self.peek(1).kind != TokenKind::Newline
        {
            return Ok(false);
        }
        self.advance();
        self.advance();
        while self.at(&TokenKind::Newline) {
            self.advance();
        }
        let opener = self.logical_lines.last().copied().unwrap_or(0);
        if self.at(&TokenKind::Indent) {
            self.advance();
        } else if self.excess > 0 && self.indent_of(self.current().line) > opener {
            // The level was already pushed by a continuation line of the
            // block's header; it now belongs to the block.
            self.excess -= 1;
        } else {
            return Err(ParseError::EmptyStatementBlock { span: self.current().span() });
        }
        let indent = self.indent_of(self.current().line);
        self.block_indents.push(indent);
        Ok(true)
    }

    /// Returns `true` when the current logical line no longer belongs to
    /// the innermost open block: the tokenizer closed the level, input ended,
    /// or the line sits left of the block's indentation.
    #[must_use]
    pub fn current_line_is_dedented(&self) -> bool {
        match self.current_kind() {
            TokenKind::Dedent | TokenKind::Eof => true,
            _ => {
                let top = self.block_indents.last().copied().unwrap_or(0);
                self.indent_of(self.current().line) < top
            },
        }
    }

    /// Fails if the current line is indented further than the innermost
    /// open block without having opened a block of its own.
    ///
    /// # Errors
    /// [`ParseError::UnexpectedIndentation`] for an over-indented line.
    pub fn check_line_indentation(&self) -> Result<(), ParseError> {
        if self.at(&TokenKind::Indent) {
            return Err(ParseError::UnexpectedIndentation { span: self.current().span() });
        }
        let top = self.block_indents.last().copied().unwrap_or(0);
        if self.indent_of(self.current().line) > top {
            return Err(ParseError::UnexpectedIndentation { span: self.current().span() });
        }
        Ok(())
    }

    /// Leaves the innermost open block, consuming the `Dedent` that closed
    /// it.
    pub fn exit_block(&mut self) {
        if self.at(&TokenKind::Dedent) {
            self.advance();
        }
        if self.block_indents.len() > 1 {
            self.block_indents.pop();
        }
    }

    /// Whether the last consumed token was a line break or closed a block, so
    /// a statement may end here without another `Newline`.
    #[must_use]
    pub const fn after_line_end(&self) -> bool {
        self.line_ended
    }

    /// Whether the current position is inside an open parenthesis.
    #[must_use]
    pub const fn in_parentheses(&self) -> bool {
        self.depth > 0
    }

    /// The span of the current token.
    #[must_use]
    pub fn span(&self) -> Span {
        self.current().span()
    }

    /// Drops the `Indent`/`Dedent` tokens that only undo the indentation of
    /// continuation lines.
    ///
    /// Continuation lines inside parentheses push indentation levels the
    /// parser never saw. Once the parenthesis has closed, the tokenizer pops
    /// those levels again; each such `Dedent` cancels one counted `Indent`.
    pub fn skip_continued_line_excess_indentation(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::Dedent if self.excess > 0 => self.excess -= 1,
                TokenKind::Indent if self.excess < 0 => self.excess += 1,
                _ => return,
            }
            self.position += 1;
        }
    }

    /// Applies the logical-line rules to the token at the current position.
    fn settle(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::Newline if self.depth > 0 && self.continues_logical_line() => {},
                TokenKind::Newline if self.peek(1).kind == TokenKind::Newline => {},
                TokenKind::Indent if self.depth > 0 => self.excess += 1,
                TokenKind::Dedent if self.depth > 0 => self.excess -= 1,
                TokenKind::Indent | TokenKind::Dedent if self.depth <= 0 && self.excess != 0 => {
                    let before = self.position;
                    self.skip_continued_line_excess_indentation();
                    if self.position == before {
                        return;
                    }
                    continue;
                },
                _ => return,
            }
            self.position += 1;
        }
    }

    /// Whether the next real token sits on a line indented at least as far
    /// as the open logical line.
    fn continues_logical_line(&self) -> bool {
        let next = self.tokens[self.position..].iter()
                                               .find(|t| !is_structural(&t.kind));
        let Some(next) = next else {
            return false;
        };
        let start = self.logical_lines.last().copied().unwrap_or(0);
        self.indent_of(next.line) >= start
    }

    fn indent_of(&self, line: usize) -> usize {
        self.line_indents.get(&line).copied().unwrap_or(0)
    }
}

/// `Newline`, `Indent`, `Dedent` and `Eof` carry no source text.
const fn is_structural(kind: &TokenKind) -> bool {
    matches!(kind,
             TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof)
}
