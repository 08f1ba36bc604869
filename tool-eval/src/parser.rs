//! Recursive-descent parser over the token stream.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{EvalError, EvalResult};
use crate::token::{SpannedToken, Token};

/// Maximum recursion depth; bounds stack use on pathologically nested input.
const MAX_DEPTH: usize = 1000;

pub(crate) struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
    input_len: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<SpannedToken>, input_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            input_len,
        }
    }

    /// Parses the whole token stream into a single expression.
    pub(crate) fn parse(mut self) -> EvalResult<Expr> {
        if self.tokens.is_empty() {
            return Err(EvalError::invalid(0, "empty expression"));
        }

        let expr = self.expression()?;

        if let Some(spanned) = self.peek() {
            return Err(EvalError::invalid(
                spanned.position,
                format!("unexpected trailing {}", spanned.token.describe()),
            ));
        }

        Ok(expr)
    }

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn end_position(&self) -> usize {
        self.input_len
    }

    fn enter(&mut self, position: usize) -> EvalResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::invalid(position, "expression nesting too deep"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// additive := term (("+" | "-") term)*
    fn expression(&mut self) -> EvalResult<Expr> {
        let mut lhs = self.term()?;

        while let Some(spanned) = self.peek() {
            let op = match spanned.token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    /// term := unary (("*" | "/" | "%") unary)*
    fn term(&mut self) -> EvalResult<Expr> {
        let mut lhs = self.unary()?;

        while let Some(spanned) = self.peek() {
            let op = match spanned.token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    /// unary := "-" unary | power
    ///
    /// Unary minus binds looser than `^`, so `-2^2` is `-(2^2)`.
    fn unary(&mut self) -> EvalResult<Expr> {
        if let Some(spanned) = self.peek() {
            if spanned.token == Token::Minus {
                let position = spanned.position;
                self.advance();
                self.enter(position)?;
                let operand = self.unary()?;
                self.leave();
                return Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                });
            }
        }
        self.power()
    }

    /// power := primary ("^" unary)?   (right-associative)
    fn power(&mut self) -> EvalResult<Expr> {
        let base = self.primary()?;

        if let Some(spanned) = self.peek() {
            if spanned.token == Token::Caret {
                let position = spanned.position;
                self.advance();
                self.enter(position)?;
                let exponent = self.unary()?;
                self.leave();
                return Ok(Expr::Binary {
                    op: BinaryOp::Pow,
                    lhs: Box::new(base),
                    rhs: Box::new(exponent),
                });
            }
        }

        Ok(base)
    }

    /// primary := number | identifier | identifier "(" args ")" | "(" expression ")"
    fn primary(&mut self) -> EvalResult<Expr> {
        let Some(spanned) = self.advance() else {
            return Err(EvalError::invalid(
                self.end_position(),
                "unexpected end of expression",
            ));
        };

        match spanned.token {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::Ident(name) => {
                if matches!(self.peek(), Some(next) if next.token == Token::LParen) {
                    self.call(name, spanned.position)
                } else {
                    Ok(Expr::Identifier {
                        name,
                        position: spanned.position,
                    })
                }
            }
            Token::LParen => {
                self.enter(spanned.position)?;
                let inner = self.expression()?;
                self.leave();
                self.expect_rparen(spanned.position)?;
                Ok(inner)
            }
            other => Err(EvalError::invalid(
                spanned.position,
                format!("unexpected {}", other.describe()),
            )),
        }
    }

    fn call(&mut self, name: String, position: usize) -> EvalResult<Expr> {
        // Consume the opening paren the caller peeked.
        self.advance();
        self.enter(position)?;

        let mut args = Vec::new();
        if !matches!(self.peek(), Some(next) if next.token == Token::RParen) {
            loop {
                args.push(self.expression()?);
                match self.peek() {
                    Some(next) if next.token == Token::Comma => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }

        self.leave();
        self.expect_rparen(position)?;

        Ok(Expr::Call {
            name,
            position,
            args,
        })
    }

    fn expect_rparen(&mut self, open_position: usize) -> EvalResult<()> {
        match self.advance() {
            Some(spanned) if spanned.token == Token::RParen => Ok(()),
            Some(spanned) => Err(EvalError::invalid(
                spanned.position,
                format!("expected `)`, found {}", spanned.token.describe()),
            )),
            None => Err(EvalError::invalid(
                open_position,
                "unbalanced parenthesis",
            )),
        }
    }
}
