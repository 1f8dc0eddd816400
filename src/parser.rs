//! Parser for Kconfig boolean conditions.
//!
//! Grammar (lowest precedence first):
//!
//! ```text
//! expr       := or
//! or         := and ( "||" and )*
//! and        := unary ( "&&" unary )*
//! unary      := "!" unary | comparison
//! comparison := primary ( ( "=" | "==" | "!=" ) primary )?
//! primary    := "(" expr ")" | IDENT | "y" | "m" | "n"
//! IDENT      := [A-Za-z0-9_]+
//! ```
//!
//! Chains of the same operator become one n-ary node, parenthesized groups
//! stay nested. Both operands of a comparison must be identifiers or
//! literals: `(A && B)=C` is rejected, and so is a chained `A=B=C`.

use crate::ast::{Expr, Operand};
use crate::error::ParseError;
use crate::types::Tristate;

/// Parses `text` as a single boolean expression.
///
/// # Examples
///
/// ```
/// use kconfig_model::parser::parse;
///
/// let e = parse("64BIT && !(A || B=m)").unwrap();
/// assert_eq!(e.to_string(), "(64BIT && !(A || B=m))");
/// ```
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let mut parser = BoolParser::new(text);
    parser.parse_expr()
}

/// Recursive-descent parser over the characters of one expression.
pub struct BoolParser {
    input: Vec<char>,
    pos: usize,
}

impl BoolParser {
    pub fn new(input: &str) -> Self {
        BoolParser {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Parses the whole input. Anything left after the expression is an error.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        if self.at_end() {
            return Err(self.error("empty expression"));
        }
        let expr = self.parse_or()?;
        self.skip_whitespace();
        if !self.at_end() {
            return Err(self.error(format!("unexpected '{}'", self.input[self.pos])));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut operands = vec![self.parse_and()?];

        loop {
            self.skip_whitespace();
            if self.try_consume("||") {
                operands.push(self.parse_and()?);
            } else {
                break;
            }
        }

        Ok(collapse(operands, Expr::Or))
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut operands = vec![self.parse_unary()?];

        loop {
            self.skip_whitespace();
            if self.try_consume("&&") {
                operands.push(self.parse_unary()?);
            } else {
                break;
            }
        }

        Ok(collapse(operands, Expr::And))
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        if self.peek() == Some('!') && self.peek_ahead(1) != Some('=') {
            self.pos += 1;
            let inner = self.parse_unary()?;
            return Ok(Expr::not(inner));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let left = self.parse_primary()?;

        let Some(negated) = self.comparison_operator() else {
            return Ok(left);
        };
        let right = self.parse_primary()?;

        let (Some(lhs), Some(rhs)) = (as_operand(&left), as_operand(&right)) else {
            return Err(ParseError::new("too complex comparison", start));
        };
        if self.comparison_operator().is_some() {
            return Err(self.error("chained comparison"));
        }

        if negated {
            Ok(Expr::NotEqual(lhs, rhs))
        } else {
            Ok(Expr::Equal(lhs, rhs))
        }
    }

    /// Consumes `=`, `==` or `!=`. Returns whether the operator was negated.
    fn comparison_operator(&mut self) -> Option<bool> {
        self.skip_whitespace();
        if self.try_consume("!=") {
            Some(true)
        } else if self.try_consume("==") || self.try_consume("=") {
            Some(false)
        } else {
            None
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.skip_whitespace();
                if !self.try_consume(")") {
                    return Err(self.error("expected ')'"));
                }
                Ok(inner)
            }
            Some(c) if is_ident_char(c) => {
                let word = self.parse_identifier();
                match Tristate::from_literal(&word) {
                    Some(value) => Ok(Expr::Lit(value)),
                    None => Ok(Expr::Ident(word)),
                }
            }
            Some(c) => Err(self.error(format!("unexpected '{}'", c))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.input[start..self.pos].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn try_consume(&mut self, token: &str) -> bool {
        let len = token.chars().count();
        if self.pos + len > self.input.len() {
            return false;
        }
        if token.chars().zip(&self.input[self.pos..]).all(|(a, b)| a == *b) {
            self.pos += len;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.pos)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn as_operand(expr: &Expr) -> Option<Operand> {
    match expr {
        Expr::Ident(name) => Some(Operand::Ident(name.clone())),
        Expr::Lit(value) => Some(Operand::Lit(*value)),
        _ => None,
    }
}

fn collapse(mut operands: Vec<Expr>, make: fn(Vec<Expr>) -> Expr) -> Expr {
    if operands.len() == 1 {
        operands.swap_remove(0)
    } else {
        make(operands)
    }
}
