use crate::{
    ast::{Argument, Expr},
    error::ParseError,
    interpreter::{
        lexer::TokenKind,
        parser::{
            core::{COMMA_DELIMITED, Operand, ParseResult, Parser},
            operators::ARGUMENT,
        },
    },
};

/// Whether `operand` may be called: a name, a member access, or any
/// parenthesized expression.
const fn is_call_head(operand: &Operand) -> bool {
    operand.grouped || operand.expr.is_simple_reference()
}

/// `head ()`: a call with no arguments.
///
/// A zero-argument call cannot be called again or given arguments by
/// juxtaposition; `(foo ()) x` has to be written instead.
pub(super) fn parse_zero_argument_call(parser: &mut Parser<'_>,
                                       left: Operand,
                                       _: u8)
                                       -> ParseResult<Expr> {
    if !is_call_head(&left) {
        return Err(ParseError::InvalidCallHead { span: left.expr.span() });
    }
    parser.source.advance();

    let next = parser.source.current_kind();
    if *next == TokenKind::EmptyParens || next.starts_argument() {
        return Err(ParseError::CallAfterZeroArgumentCall { span: parser.source.span() });
    }

    let span = left.expr.span();
    Ok(Expr::Call { callee: Box::new(left.expr),
                    arguments: Vec::new(),
                    span })
}

/// `head arg arg ...`: the current token starts the first argument.
pub(super) fn parse_application(parser: &mut Parser<'_>,
                                left: Operand,
                                _: u8)
                                -> ParseResult<Expr> {
    if !is_call_head(&left) {
        return Err(ParseError::InvalidCallHead { span: left.expr.span() });
    }

    // The call owns `,` unless the enclosing context already uses it as a
    // delimiter. Nested expressions never own it.
    let owns_commas = !parser.is_delimiter(&TokenKind::Comma);
    parser.push_delimiters(COMMA_DELIMITED);
    let arguments = parse_arguments(parser, owns_commas);
    parser.pop_delimiters();

    let span = left.expr.span();
    Ok(Expr::Call { callee: Box::new(left.expr),
                    arguments: arguments?,
                    span })
}

/// Parses juxtaposed arguments until a token that cannot start one.
///
/// Once a named, flag or enum argument has been seen, positional arguments
/// are rejected, with one exception: in a call that owns commas,
/// `-name value, arg` where `value` is a name or member access means
/// `-name (value arg)`.
fn parse_arguments(parser: &mut Parser<'_>, owns_commas: bool) -> ParseResult<Vec<Argument>> {
    let mut arguments = Vec::new();
    let mut seen_named = false;

    loop {
        let kind = parser.source.current_kind();

        if owns_commas && *kind == TokenKind::Comma {
            parser.source.advance();
            let next = parser.source.current_kind();
            if !next.starts_argument() {
                // trailing comma
                break;
            }
            if seen_named && !matches!(next, TokenKind::Flag(_)) {
                reinterpret_named_value(parser, &mut arguments)?;
            }
            continue;
        }

        if !kind.starts_argument() {
            break;
        }

        if let TokenKind::Flag(_) = kind {
            arguments.push(parse_flag_argument(parser)?);
            seen_named = true;
            continue;
        }

        if seen_named {
            return Err(ParseError::PositionalAfterNamed { span: parser.source.span() });
        }
        arguments.push(Argument::Positional(parser.parse_expression(ARGUMENT)?));
    }

    Ok(arguments)
}

/// Applies the `-name value, arg` rule to the last argument, or fails if it
/// does not qualify.
fn reinterpret_named_value(parser: &mut Parser<'_>,
                           arguments: &mut [Argument])
                           -> ParseResult<()> {
    let span = parser.source.span();
    let Some(Argument::Named { value, .. }) = arguments.last_mut() else {
        return Err(ParseError::PositionalAfterNamed { span });
    };
    if !value.is_simple_reference() {
        return Err(ParseError::PositionalAfterNamed { span });
    }

    let argument = parser.parse_expression(ARGUMENT)?;
    let callee = std::mem::replace(value,
                                   Expr::Bool { value: false,
                                                span });
    *value = Expr::Call { span:      callee.span(),
                          callee:    Box::new(callee),
                          arguments: vec![Argument::Positional(argument)], };
    Ok(())
}

/// `-name`, `-name value` or `-name:member`.
fn parse_flag_argument(parser: &mut Parser<'_>) -> ParseResult<Argument> {
    let token = parser.source.advance();
    let span = token.span();
    let TokenKind::Flag(name) = token.kind else {
        return Err(parser.source.unexpected("an argument name"));
    };

    let next = parser.source.current_kind();
    if *next == TokenKind::Colon && parser.source.peek(1).kind != TokenKind::Newline {
        parser.source.advance();
        let member = parser.source.current().clone();
        let TokenKind::Identifier(value) = member.kind else {
            return Err(ParseError::EnumValueNotIdentifier { span: member.span() });
        };
        parser.source.advance();
        return Ok(Argument::Enum { name, value, span });
    }

    if next.starts_argument() && !matches!(next, TokenKind::Flag(_)) {
        let value = parser.parse_expression(ARGUMENT)?;
        return Ok(Argument::Named { name, value, span });
    }

    Ok(Argument::Flag { name, span })
}
