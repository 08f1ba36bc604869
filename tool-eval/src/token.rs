//! Lexer for the arithmetic grammar.

use crate::error::{EvalError, EvalResult};

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl Token {
    /// Short description used in parser diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Number(value) => format!("number `{value}`"),
            Self::Ident(name) => format!("identifier `{name}`"),
            Self::Plus => "`+`".into(),
            Self::Minus => "`-`".into(),
            Self::Star => "`*`".into(),
            Self::Slash => "`/`".into(),
            Self::Percent => "`%`".into(),
            Self::Caret => "`^`".into(),
            Self::LParen => "`(`".into(),
            Self::RParen => "`)`".into(),
            Self::Comma => "`,`".into(),
        }
    }
}

/// A token plus the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpannedToken {
    pub(crate) token: Token,
    pub(crate) position: usize,
}

/// Tokenizes the input, rejecting any character outside the grammar.
pub(crate) fn tokenize(input: &str) -> EvalResult<Vec<SpannedToken>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos] as char;

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let token = match c {
            '+' => {
                pos += 1;
                Token::Plus
            }
            '-' => {
                pos += 1;
                Token::Minus
            }
            '*' => {
                pos += 1;
                Token::Star
            }
            '/' => {
                pos += 1;
                Token::Slash
            }
            '%' => {
                pos += 1;
                Token::Percent
            }
            '^' => {
                pos += 1;
                Token::Caret
            }
            '(' => {
                pos += 1;
                Token::LParen
            }
            ')' => {
                pos += 1;
                Token::RParen
            }
            ',' => {
                pos += 1;
                Token::Comma
            }
            '0'..='9' | '.' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                    pos += 1;
                }
                let text = &input[start..pos];
                let value: f64 = text.parse().map_err(|_| {
                    EvalError::invalid(start, format!("malformed number `{text}`"))
                })?;
                Token::Number(value)
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                Token::Ident(input[start..pos].to_string())
            }
            other => {
                return Err(EvalError::invalid(
                    start,
                    format!("unexpected character `{other}`"),
                ));
            }
        };

        tokens.push(SpannedToken {
            token,
            position: start,
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_numbers_and_operators() {
        let tokens = tokenize("2 + 3.5 * (x)").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.token.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Number(2.0),
                Token::Plus,
                Token::Number(3.5),
                Token::Star,
                Token::LParen,
                Token::Ident("x".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn positions_are_byte_offsets() {
        let tokens = tokenize("10 + sqrt(4)").unwrap();
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].position, 3);
        assert_eq!(tokens[2].position, 5);
    }

    #[test]
    fn rejects_foreign_characters() {
        let err = tokenize("2 + $x").unwrap_err();
        assert!(matches!(err, EvalError::InvalidExpression { position: 4, .. }));
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = tokenize("1.2.3").unwrap_err();
        assert!(matches!(err, EvalError::InvalidExpression { position: 0, .. }));
    }
}
