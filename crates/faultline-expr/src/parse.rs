use crate::ast::{CastKind, Expr, Literal};

#[derive(Debug, thiserror::Error)]
pub enum ExprParseError {
    #[error("Expression is empty")]
    Empty,

    #[error("Unterminated string literal in expression")]
    UnterminatedString,

    #[error("Invalid number '{text}'")]
    InvalidNumber { text: String },

    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("Unexpected '{found}', expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },

    #[error("Unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("Unknown cast type '{name}'")]
    UnknownCast { name: String },

    #[error("Bare identifier '{name}' is not a valid expression")]
    BareIdentifier { name: String },

    #[error("Trailing input '{text}' after expression")]
    TrailingInput { text: String },
}

/// Parse an expression such as `42`, `'boom'`, `(int)3`,
/// `new System.InvalidOperationException("boom")`, or
/// `System.Int32.MaxValue`.
///
/// Strings accept single or double quotes (rule files embed expressions in
/// JSON, where single quotes avoid escaping); the literal runs to the first
/// matching close quote, no escape sequences. The `new` keyword is optional
/// on constructions.
pub fn parse_expression(text: &str) -> Result<Expr, ExprParseError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(ExprParseError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if let Some(token) = parser.peek() {
        return Err(ExprParseError::TrailingInput {
            text: token.describe(),
        });
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Str(String),
    LParen,
    RParen,
    Comma,
    Dot,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => s.clone(),
            Token::Number(s) => s.clone(),
            Token::Str(_) => "string literal".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Comma => ",".to_string(),
            Token::Dot => ".".to_string(),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, ExprParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '\'' | '"' => {
                let quote = ch;
                chars.next();
                let mut literal = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == quote {
                        closed = true;
                        break;
                    }
                    literal.push(c);
                }
                if !closed {
                    return Err(ExprParseError::UnterminatedString);
                }
                tokens.push(Token::Str(literal));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut number = String::new();
                number.push(c);
                chars.next();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        number.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(ExprParseError::UnexpectedCharacter { ch: other, offset });
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ExprParseError> {
        match self.next() {
            Some(found) if found == token => Ok(()),
            Some(found) => Err(ExprParseError::UnexpectedToken {
                found: found.describe(),
                expected,
            }),
            None => Err(ExprParseError::UnexpectedEnd { expected }),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ExprParseError> {
        match self.next() {
            None => Err(ExprParseError::UnexpectedEnd {
                expected: "an expression",
            }),
            Some(Token::Str(s)) => Ok(Expr::Literal(Literal::Str(s))),
            Some(Token::Number(raw)) => parse_number(&raw),
            Some(Token::LParen) => self.parse_cast(),
            Some(Token::Ident(ident)) => match ident.as_str() {
                "null" => Ok(Expr::Literal(Literal::Null)),
                "true" => Ok(Expr::Literal(Literal::Bool(true))),
                "false" => Ok(Expr::Literal(Literal::Bool(false))),
                "new" => {
                    let path = self.parse_dotted_path()?;
                    self.expect(Token::LParen, "'(' after type name")?;
                    let args = self.parse_args()?;
                    Ok(Expr::New {
                        type_name: path.join("."),
                        args,
                    })
                }
                _ => self.parse_path_expr(ident),
            },
            Some(other) => Err(ExprParseError::UnexpectedToken {
                found: other.describe(),
                expected: "an expression",
            }),
        }
    }

    /// `(int)3`-style cast; the opening paren has already been consumed.
    fn parse_cast(&mut self) -> Result<Expr, ExprParseError> {
        let name = match self.next() {
            Some(Token::Ident(name)) => name,
            Some(other) => {
                return Err(ExprParseError::UnexpectedToken {
                    found: other.describe(),
                    expected: "a cast type name",
                })
            }
            None => {
                return Err(ExprParseError::UnexpectedEnd {
                    expected: "a cast type name",
                })
            }
        };
        let target = CastKind::from_name(&name)
            .ok_or(ExprParseError::UnknownCast { name })?;
        self.expect(Token::RParen, "')' after cast type")?;
        let value = self.parse_expr()?;
        Ok(Expr::Cast {
            target,
            value: Box::new(value),
        })
    }

    /// A dotted path that is either a construction (`System.Exception(...)`,
    /// the original expression format omits `new`) or a static member access
    /// (`System.Int32.MaxValue`).
    fn parse_path_expr(&mut self, first: String) -> Result<Expr, ExprParseError> {
        let mut path = vec![first];
        path.extend(self.parse_dotted_tail()?);

        if self.peek() == Some(&Token::LParen) {
            self.next();
            let args = self.parse_args()?;
            return Ok(Expr::New {
                type_name: path.join("."),
                args,
            });
        }

        if path.len() < 2 {
            return Err(ExprParseError::BareIdentifier {
                name: path.remove(0),
            });
        }
        let member = path.pop().unwrap();
        Ok(Expr::StaticMember {
            type_name: path.join("."),
            member,
        })
    }

    fn parse_dotted_path(&mut self) -> Result<Vec<String>, ExprParseError> {
        let first = match self.next() {
            Some(Token::Ident(name)) => name,
            Some(other) => {
                return Err(ExprParseError::UnexpectedToken {
                    found: other.describe(),
                    expected: "a type name",
                })
            }
            None => {
                return Err(ExprParseError::UnexpectedEnd {
                    expected: "a type name",
                })
            }
        };
        let mut path = vec![first];
        path.extend(self.parse_dotted_tail()?);
        Ok(path)
    }

    fn parse_dotted_tail(&mut self) -> Result<Vec<String>, ExprParseError> {
        let mut segments = Vec::new();
        while self.peek() == Some(&Token::Dot) {
            self.next();
            match self.next() {
                Some(Token::Ident(name)) => segments.push(name),
                Some(other) => {
                    return Err(ExprParseError::UnexpectedToken {
                        found: other.describe(),
                        expected: "an identifier after '.'",
                    })
                }
                None => {
                    return Err(ExprParseError::UnexpectedEnd {
                        expected: "an identifier after '.'",
                    })
                }
            }
        }
        Ok(segments)
    }

    /// Comma-separated argument list; the opening paren has been consumed.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ExprParseError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.next();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                Some(other) => {
                    return Err(ExprParseError::UnexpectedToken {
                        found: other.describe(),
                        expected: "',' or ')'",
                    })
                }
                None => {
                    return Err(ExprParseError::UnexpectedEnd {
                        expected: "',' or ')'",
                    })
                }
            }
        }
    }
}

fn parse_number(raw: &str) -> Result<Expr, ExprParseError> {
    if raw.contains('.') {
        let value: f64 = raw.parse().map_err(|_| ExprParseError::InvalidNumber {
            text: raw.to_string(),
        })?;
        Ok(Expr::Literal(Literal::Float(value)))
    } else {
        let value: i64 = raw.parse().map_err(|_| ExprParseError::InvalidNumber {
            text: raw.to_string(),
        })?;
        Ok(Expr::Literal(Literal::Int(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(
            parse_expression("null").unwrap(),
            Expr::Literal(Literal::Null)
        );
        assert_eq!(
            parse_expression("true").unwrap(),
            Expr::Literal(Literal::Bool(true))
        );
        assert_eq!(
            parse_expression("42").unwrap(),
            Expr::Literal(Literal::Int(42))
        );
        assert_eq!(
            parse_expression("-7").unwrap(),
            Expr::Literal(Literal::Int(-7))
        );
        assert_eq!(
            parse_expression("6.6").unwrap(),
            Expr::Literal(Literal::Float(6.6))
        );
        assert_eq!(
            parse_expression("'Hello World'").unwrap(),
            Expr::Literal(Literal::Str("Hello World".to_string()))
        );
        assert_eq!(
            parse_expression("\"boom\"").unwrap(),
            Expr::Literal(Literal::Str("boom".to_string()))
        );
    }

    #[test]
    fn test_cast() {
        assert_eq!(
            parse_expression("(int)3").unwrap(),
            Expr::Cast {
                target: CastKind::Int,
                value: Box::new(Expr::Literal(Literal::Int(3))),
            }
        );
    }

    #[test]
    fn test_new_with_keyword() {
        let expr = parse_expression("new System.Exception('boom')").unwrap();
        assert_eq!(
            expr,
            Expr::New {
                type_name: "System.Exception".to_string(),
                args: vec![Expr::Literal(Literal::Str("boom".to_string()))],
            }
        );
    }

    #[test]
    fn test_construction_without_keyword() {
        let expr = parse_expression("System.Exception('boom')").unwrap();
        assert!(matches!(expr, Expr::New { .. }));
    }

    #[test]
    fn test_nested_construction() {
        let expr =
            parse_expression("new System.Exception('outer', new System.Exception('inner'))")
                .unwrap();
        match expr {
            Expr::New { args, .. } => {
                assert_eq!(args.len(), 2);
                assert!(matches!(args[1], Expr::New { .. }));
            }
            other => panic!("expected construction, got {other:?}"),
        }
    }

    #[test]
    fn test_static_member() {
        assert_eq!(
            parse_expression("System.Int32.MaxValue").unwrap(),
            Expr::StaticMember {
                type_name: "System.Int32".to_string(),
                member: "MaxValue".to_string(),
            }
        );
    }

    #[test]
    fn test_bare_identifier_rejected() {
        assert!(matches!(
            parse_expression("boom"),
            Err(ExprParseError::BareIdentifier { .. })
        ));
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            parse_expression("'boom"),
            Err(ExprParseError::UnterminatedString)
        ));
    }

    #[test]
    fn test_trailing_input_rejected() {
        assert!(matches!(
            parse_expression("42 43"),
            Err(ExprParseError::TrailingInput { .. })
        ));
    }

    #[test]
    fn test_unknown_cast() {
        assert!(matches!(
            parse_expression("(decimal)3"),
            Err(ExprParseError::UnknownCast { .. })
        ));
    }
}
