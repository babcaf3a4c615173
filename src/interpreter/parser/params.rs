use std::collections::HashSet;

use crate::{
    ast::{Expr, Parameter},
    error::ParseError,
    interpreter::{
        lexer::TokenKind,
        parser::{
            core::{COMMA_DELIMITED, ParseResult, Parser},
            operators::COMPARISON,
        },
    },
};

impl Parser<'_> {
    /// Parses `()` or a parenthesized, comma-separated parameter list.
    ///
    /// Each parameter is one of
    /// - `name`, `name: Type`, `name = default`: positional or named,
    /// - `-name`, `-name = default`: named only,
    /// - `-name: a | b | c [= a]`: named only, restricted to the listed enum
    ///   members.
    ///
    /// A `-name` parameter without a default is required like any other: a
    /// call must pass it, as a flag or with a value. An optional flag is
    /// written `-name = false`.
    ///
    /// # Errors
    /// [`ParseError::InvalidParameter`] for duplicate names and enum defaults
    /// that are not members; other parse errors for malformed lists.
    pub fn parse_parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        if self.source.eat(&TokenKind::EmptyParens) {
            return Ok(Vec::new());
        }
        self.source.expect(&TokenKind::LParen, "a parameter list")?;

        self.push_delimiters(COMMA_DELIMITED);
        let parameters = self.parse_parameter_list();
        self.pop_delimiters();
        let parameters = parameters?;

        if !self.source.eat(&TokenKind::RParen) {
            return Err(ParseError::ExpectedClosingParen { span: self.source.span() });
        }

        let mut seen = HashSet::new();
        for parameter in &parameters {
            if !seen.insert(parameter.name.as_str()) {
                return Err(ParseError::InvalidParameter { details: format!("duplicate parameter \
                                                                            '{}'",
                                                                           parameter.name),
                                                          span:    parameter.span, });
            }
        }
        Ok(parameters)
    }

    fn parse_parameter_list(&mut self) -> ParseResult<Vec<Parameter>> {
        let mut parameters = Vec::new();
        while !self.source.at(&TokenKind::RParen) {
            parameters.push(self.parse_parameter()?);
            if !self.source.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(parameters)
    }

    fn parse_parameter(&mut self) -> ParseResult<Parameter> {
        let token = self.source.current().clone();
        let span = token.span();
        let (name, positional) = match token.kind {
            TokenKind::Identifier(name) => (name, true),
            TokenKind::Flag(name) => (name, false),
            _ => return Err(self.source.unexpected("a parameter name")),
        };
        self.source.advance();

        let mut type_name = None;
        let mut enum_members = None;
        if self.source.eat(&TokenKind::Colon) {
            if positional {
                type_name = Some(self.expect_identifier("a type name")?.0);
            } else {
                let mut members = vec![self.expect_identifier("an enum member")?.0];
                while self.source.eat(&TokenKind::Pipe) {
                    members.push(self.expect_identifier("an enum member")?.0);
                }
                enum_members = Some(members);
            }
        }

        let mut default = None;
        if self.source.eat(&TokenKind::Equals) {
            default = Some(match &enum_members {
                Some(members) => {
                    let (member, member_span) = self.expect_identifier("an enum member")?;
                    if !members.contains(&member) {
                        return Err(ParseError::InvalidParameter {
                            details: format!("default '{member}' is not a member of '-{name}'"),
                            span:    member_span,
                        });
                    }
                    Expr::Str { value: member,
                                span:  member_span, }
                },
                None => self.parse_expression(COMPARISON)?,
            });
        }

        Ok(Parameter { name,
                       positional,
                       default,
                       enum_members,
                       type_name,
                       span })
    }
}
