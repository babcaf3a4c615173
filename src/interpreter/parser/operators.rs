use std::{collections::HashMap, mem::Discriminant, sync::LazyLock};

use ordered_float::OrderedFloat;

use crate::{
    ast::{BinaryOperator, BindingPair, Expr, UnaryOperator},
    error::ParseError,
    interpreter::{
        lexer::TokenKind,
        parser::{
            call,
            core::{COMMA_DELIMITED, NO_DELIMITERS, Operand, ParseResult, Parser},
            statement,
        },
    },
    util::span::Span,
};

/// `and`, `or`
pub const LOGICAL: u8 = 20;
/// Operand level of `not`: above the logical operators, below comparison.
pub const NOT_OPERAND: u8 = 25;
/// `=`, `!=`, `<`, `<=`, `>`, `>=`
pub const COMPARISON: u8 = 30;
/// `+`, `-`
pub const ADDITIVE: u8 = 40;
/// `*`, `/`, `%`
pub const MULTIPLICATIVE: u8 = 50;
/// Operand level of prefix `-`.
pub const NEGATION: u8 = 60;
/// Juxtaposition: a call head followed by its first argument.
pub const APPLICATION: u8 = 70;
/// Level at which each juxtaposed argument and each named value is parsed.
pub const ARGUMENT: u8 = 75;
/// `()` after a call head.
pub const ZERO_ARGUMENT_CALL: u8 = 78;
/// `.`
pub const MEMBER: u8 = 80;
/// `:` after a name.
pub const BINDING: u8 = 100;
/// Level at which the value of a binding is parsed.
pub const BINDING_VALUE: u8 = 10;

/// Starts an expression at the current token.
pub type PrefixHandler = fn(&mut Parser<'_>) -> ParseResult<Expr>;

/// Extends `left` starting at the current token. The `u8` is the rule's right
/// binding power.
pub type InfixHandler = fn(&mut Parser<'_>, Operand, u8) -> ParseResult<Expr>;

/// An infix handler with its binding powers.
#[derive(Debug, Clone, Copy)]
pub struct InfixRule {
    /// How tightly the operator binds to the expression on its left.
    pub left_binding_power:  u8,
    /// The minimum binding power passed down when parsing its right side.
    pub right_binding_power: u8,
    /// The handler.
    pub handler:             InfixHandler,
}

/// Prefix and infix handlers keyed by token kind.
///
/// Keys are token discriminants, so a rule registered for
/// `TokenKind::Identifier(String::new())` applies to every identifier.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    prefix: HashMap<Discriminant<TokenKind>, PrefixHandler>,
    infix:  HashMap<Discriminant<TokenKind>, InfixRule>,
}

/// The table every parser uses unless given another one.
pub static STANDARD_TABLE: LazyLock<OperatorTable> = LazyLock::new(OperatorTable::standard);

impl OperatorTable {
    /// Registers the prefix handler for tokens shaped like `sample`.
    pub fn register_prefix(&mut self, sample: &TokenKind, handler: PrefixHandler) {
        self.prefix.insert(std::mem::discriminant(sample), handler);
    }

    /// Registers the infix handler for tokens shaped like `sample`.
    pub fn register_infix(&mut self,
                          sample: &TokenKind,
                          left_binding_power: u8,
                          right_binding_power: u8,
                          handler: InfixHandler) {
        self.infix.insert(std::mem::discriminant(sample),
                          InfixRule { left_binding_power,
                                      right_binding_power,
                                      handler });
    }

    /// The prefix handler for `kind`.
    #[must_use]
    pub fn prefix(&self, kind: &TokenKind) -> Option<PrefixHandler> {
        self.prefix.get(&std::mem::discriminant(kind)).copied()
    }

    /// The infix rule for `kind`.
    #[must_use]
    pub fn infix(&self, kind: &TokenKind) -> Option<&InfixRule> {
        self.infix.get(&std::mem::discriminant(kind))
    }

    /// Builds the language's operator table.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::default();

        table.register_prefix(&TokenKind::Number(OrderedFloat(0.0)), parse_literal);
        table.register_prefix(&TokenKind::Str(String::new()), parse_literal);
        table.register_prefix(&TokenKind::Bool(false), parse_literal);
        table.register_prefix(&TokenKind::Identifier(String::new()), parse_literal);
        table.register_prefix(&TokenKind::LParen, parse_group);
        table.register_prefix(&TokenKind::Minus, parse_unary);
        table.register_prefix(&TokenKind::Not, parse_unary);
        table.register_prefix(&TokenKind::If, statement::parse_if);
        table.register_prefix(&TokenKind::Fn, statement::parse_function_literal);

        table.register_infix(&TokenKind::And, LOGICAL, LOGICAL, parse_binary);
        table.register_infix(&TokenKind::Or, LOGICAL, LOGICAL, parse_binary);
        for kind in [TokenKind::Equals,
                     TokenKind::BangEqual,
                     TokenKind::Less,
                     TokenKind::LessEqual,
                     TokenKind::Greater,
                     TokenKind::GreaterEqual]
        {
            table.register_infix(&kind, COMPARISON, COMPARISON, parse_binary);
        }
        table.register_infix(&TokenKind::Plus, ADDITIVE, ADDITIVE, parse_binary);
        table.register_infix(&TokenKind::Minus, ADDITIVE, ADDITIVE, parse_binary);
        table.register_infix(&TokenKind::Star, MULTIPLICATIVE, MULTIPLICATIVE, parse_binary);
        table.register_infix(&TokenKind::Slash, MULTIPLICATIVE, MULTIPLICATIVE, parse_binary);
        table.register_infix(&TokenKind::Percent, MULTIPLICATIVE, MULTIPLICATIVE, parse_binary);

        table.register_infix(&TokenKind::Dot, MEMBER, MEMBER, parse_member);
        table.register_infix(&TokenKind::Colon, BINDING, BINDING_VALUE, parse_binding);
        table.register_infix(&TokenKind::EmptyParens,
                             ZERO_ARGUMENT_CALL,
                             ZERO_ARGUMENT_CALL,
                             call::parse_zero_argument_call);
        for kind in [TokenKind::Number(OrderedFloat(0.0)),
                     TokenKind::Str(String::new()),
                     TokenKind::Bool(false),
                     TokenKind::Identifier(String::new()),
                     TokenKind::Flag(String::new()),
                     TokenKind::LParen,
                     TokenKind::Fn]
        {
            table.register_infix(&kind, APPLICATION, ARGUMENT, call::parse_application);
        }

        table
    }
}

fn parse_literal(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let token = parser.source.advance();
    let span = token.span();
    match token.kind {
        TokenKind::Number(value) => Ok(Expr::Number { value, span }),
        TokenKind::Str(value) => Ok(Expr::Str { value, span }),
        TokenKind::Bool(value) => Ok(Expr::Bool { value, span }),
        TokenKind::Identifier(name) => Ok(Expr::Identifier { name, span }),
        kind => Err(ParseError::UnexpectedToken { token: kind.describe(),
                                                  expected: "a literal".to_string(),
                                                  span }),
    }
}

/// `( expr )`. Inside the parentheses no delimiter from the enclosing
/// context applies.
fn parse_group(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    parser.source.advance();
    parser.push_delimiters(NO_DELIMITERS);
    let inner = parser.parse_expression(0);
    parser.pop_delimiters();
    let inner = inner?;

    if !parser.source.at(&TokenKind::RParen) {
        return Err(ParseError::ExpectedClosingParen { span: parser.source.span() });
    }
    parser.source.advance();
    parser.mark_grouped();
    Ok(inner)
}

fn parse_unary(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let token = parser.source.advance();
    let (op, binding_power) = match token.kind {
        TokenKind::Not => (UnaryOperator::Not, NOT_OPERAND),
        _ => (UnaryOperator::Negate, NEGATION),
    };
    let operand = parser.parse_expression(binding_power)?;
    Ok(Expr::Unary { op,
                     operand: Box::new(operand),
                     span: token.span() })
}

fn parse_binary(parser: &mut Parser<'_>,
                left: Operand,
                right_binding_power: u8)
                -> ParseResult<Expr> {
    let token = parser.source.advance();
    let op = match token.kind {
        TokenKind::And => BinaryOperator::And,
        TokenKind::Or => BinaryOperator::Or,
        TokenKind::Equals => BinaryOperator::Equal,
        TokenKind::BangEqual => BinaryOperator::NotEqual,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::LessEqual => BinaryOperator::LessEqual,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Sub,
        TokenKind::Star => BinaryOperator::Mul,
        TokenKind::Slash => BinaryOperator::Div,
        _ => BinaryOperator::Mod,
    };
    let right = parser.parse_expression(right_binding_power)?;
    Ok(Expr::Binary { left: Box::new(left.expr),
                      op,
                      right: Box::new(right),
                      span: token.span() })
}

fn parse_member(parser: &mut Parser<'_>, left: Operand, _: u8) -> ParseResult<Expr> {
    parser.source.advance();
    let token = parser.source.current().clone();
    let token_span = token.span();
    let TokenKind::Identifier(member) = token.kind else {
        return Err(parser.source.unexpected("a member name"));
    };
    parser.source.advance();
    let span = left.expr.span().to(token_span);
    Ok(Expr::Member { object: Box::new(left.expr),
                      member,
                      span })
}

/// `name: value`, optionally followed by more `, name: value` pairs when the
/// enclosing context does not own commas.
fn parse_binding(parser: &mut Parser<'_>,
                 left: Operand,
                 right_binding_power: u8)
                 -> ParseResult<Expr> {
    let Expr::Identifier { name, span } = left.expr else {
        return Err(ParseError::InvalidBindingTarget { span: left.expr.span() });
    };
    let owns_commas = !parser.is_delimiter(&TokenKind::Comma);
    parser.source.advance();

    parser.push_delimiters(COMMA_DELIMITED);
    let bindings = parse_binding_values(parser, name, span, owns_commas, right_binding_power);
    parser.pop_delimiters();

    Ok(Expr::Binding { bindings: bindings?,
                       span })
}

fn parse_binding_values(parser: &mut Parser<'_>,
                        name: String,
                        span: Span,
                        owns_commas: bool,
                        binding_power: u8)
                        -> ParseResult<Vec<BindingPair>> {
    let value = parser.parse_expression(binding_power)?;
    let mut bindings = vec![BindingPair { name, value, span }];

    while owns_commas
          && parser.source.at(&TokenKind::Comma)
          && matches!(parser.source.peek(1).kind, TokenKind::Identifier(_))
          && parser.source.peek(2).kind == TokenKind::Colon
    {
        parser.source.advance();
        let token = parser.source.advance();
        let token_span = token.span();
        let TokenKind::Identifier(name) = token.kind else {
            return Err(parser.source.unexpected("a name"));
        };
        parser.source.advance();
        let value = parser.parse_expression(binding_power)?;
        bindings.push(BindingPair { name,
                                    value,
                                    span: token_span });
    }

    Ok(bindings)
}
