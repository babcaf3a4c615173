use std::rc::Rc;

use crate::{
    ast::{Block, ConstructorDecl, Expr, FunctionDef, Statement, TypeDecl},
    interpreter::{
        lexer::TokenKind,
        parser::core::{ParseResult, Parser},
    },
    util::span::Span,
};

impl Parser<'_> {
    /// Parses one statement occupying one logical line (plus any blocks it
    /// opens).
    ///
    /// # Errors
    /// A [`ParseError`] for malformed input, including trailing tokens
    /// after a complete statement.
    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        self.source.check_line_indentation()?;
        self.source.begin_logical_line();
        let statement = self.parse_statement_body();
        self.source.end_logical_line();
        let statement = statement?;
        self.finish_statement()?;
        Ok(statement)
    }

    fn parse_statement_body(&mut self) -> ParseResult<Statement> {
        match self.source.current_kind() {
            TokenKind::Fn if matches!(self.source.peek(1).kind, TokenKind::Identifier(_)) => {
                Ok(Statement::Function(Rc::new(self.parse_function(true)?)))
            },
            TokenKind::Type => Ok(Statement::Type(self.parse_type_declaration()?)),
            _ => Ok(Statement::Expression(self.parse_expression(0)?)),
        }
    }

    /// A statement ends at a line break, at the end of input, where its
    /// block closes, or right after a nested block it opened.
    fn finish_statement(&mut self) -> ParseResult<()> {
        match self.source.current_kind() {
            TokenKind::Newline => {
                self.source.advance();
                Ok(())
            },
            TokenKind::Eof | TokenKind::Dedent => Ok(()),
            _ if self.source.after_line_end() => Ok(()),
            _ => Err(self.source.unexpected("end of line")),
        }
    }

    /// Parses the statements of an indented block whose header has just been
    /// consumed by [`TokenSource::try_enter_block`].
    ///
    /// [`TokenSource::try_enter_block`]: crate::interpreter::token_source::TokenSource::try_enter_block
    fn parse_block_statements(&mut self) -> ParseResult<Block> {
        let span = self.source.span();
        let mut statements = Vec::new();
        loop {
            statements.push(self.parse_statement()?);
            while self.source.at(&TokenKind::Newline) {
                self.source.advance();
            }
            if self.source.current_line_is_dedented() {
                self.source.exit_block();
                break;
            }
        }
        Ok(Block { statements, span })
    }

    /// A body introduced by `:`: an indented block, or a single expression on
    /// the same line.
    fn parse_body(&mut self) -> ParseResult<Block> {
        if self.source.try_enter_block()? {
            return self.parse_block_statements();
        }
        self.source.expect(&TokenKind::Colon, "':'")?;
        self.parse_inline_body()
    }

    fn parse_inline_body(&mut self) -> ParseResult<Block> {
        let expr = self.parse_expression(0)?;
        Ok(Block { span:       expr.span(),
                   statements: vec![Statement::Expression(expr)], })
    }

    /// `fn name(params): body` when `named`, `fn (params): body` otherwise.
    fn parse_function(&mut self, named: bool) -> ParseResult<FunctionDef> {
        let span = self.source.advance().span();
        let name = if named { Some(self.expect_identifier("a function name")?.0) } else { None };
        let parameters = self.parse_parameters()?;
        let body = self.parse_body()?;
        Ok(FunctionDef { name,
                         parameters,
                         body,
                         span })
    }

    /// `type Name: ctor(fields) | ctor | ...`, or the same constructors one
    /// or more per line in an indented block.
    fn parse_type_declaration(&mut self) -> ParseResult<TypeDecl> {
        let span = self.source.advance().span();
        let (name, _) = self.expect_identifier("a type name")?;
        let mut constructors = Vec::new();

        if self.source.try_enter_block()? {
            loop {
                self.source.check_line_indentation()?;
                self.source.begin_logical_line();
                let line = self.parse_constructors(&mut constructors);
                self.source.end_logical_line();
                line?;
                self.finish_statement()?;
                while self.source.at(&TokenKind::Newline) {
                    self.source.advance();
                }
                if self.source.current_line_is_dedented() {
                    self.source.exit_block();
                    break;
                }
            }
        } else {
            self.source.expect(&TokenKind::Colon, "':'")?;
            self.parse_constructors(&mut constructors)?;
        }

        Ok(TypeDecl { name,
                      constructors,
                      span })
    }

    fn parse_constructors(&mut self, constructors: &mut Vec<ConstructorDecl>) -> ParseResult<()> {
        loop {
            let (name, span) = self.expect_identifier("a constructor name")?;
            let parameters = match self.source.current_kind() {
                TokenKind::LParen | TokenKind::EmptyParens => self.parse_parameters()?,
                _ => Vec::new(),
            };
            constructors.push(ConstructorDecl { name,
                                                parameters,
                                                span });
            if !self.source.eat(&TokenKind::Pipe) {
                return Ok(());
            }
        }
    }

    /// Consumes an identifier and returns its name and location.
    pub(super) fn expect_identifier(&mut self, expected: &str) -> ParseResult<(String, Span)> {
        let token = self.source.current().clone();
        let span = token.span();
        let TokenKind::Identifier(name) = token.kind else {
            return Err(self.source.unexpected(expected));
        };
        self.source.advance();
        Ok((name, span))
    }
}

/// `if test then a [else b]`, or the block form:
///
/// ```text
/// if test:
///     a
/// else if other:
///     b
/// else:
///     c
/// ```
pub(super) fn parse_if(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let span = parser.source.advance().span();
    let condition = parser.parse_expression(0)?;

    let then_branch = if parser.source.try_enter_block()? {
        parser.parse_block_statements()?
    } else {
        // Inside parentheses a `:` that ends the line introduces an inline
        // body.
        if !(parser.source.in_parentheses() && parser.source.eat(&TokenKind::Colon)) {
            parser.source.expect(&TokenKind::Then, "'then' or ':'")?;
        }
        parser.parse_inline_body()?
    };

    let else_branch = if parser.source.eat(&TokenKind::Else) {
        Some(parse_else_branch(parser)?)
    } else {
        None
    };

    Ok(Expr::If { condition: Box::new(condition),
                  then_branch,
                  else_branch,
                  span })
}

fn parse_else_branch(parser: &mut Parser<'_>) -> ParseResult<Block> {
    if parser.source.at(&TokenKind::If) {
        let nested = parse_if(parser)?;
        return Ok(Block { span:       nested.span(),
                          statements: vec![Statement::Expression(nested)], });
    }
    if parser.source.try_enter_block()? {
        return parser.parse_block_statements();
    }
    parser.source.eat(&TokenKind::Colon);
    parser.parse_inline_body()
}

/// `fn (params): body` in expression position.
pub(super) fn parse_function_literal(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    Ok(Expr::Function(Rc::new(parser.parse_function(false)?)))
}
