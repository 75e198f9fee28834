use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use thiserror::Error;

/// Deepest expression tree the parser will build, counting parentheses,
/// signs and every link of an operator chain
pub const MAX_DEPTH: usize = 256;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected {expected}, found {found} at {}..{} in `{source_text}`", .span.start, .span.end)]
    UnexpectedToken {
        source_text: String,
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unclosed parenthesis opened at {} in `{source_text}`", .open.start)]
    UnclosedParen { source_text: String, open: Span },
    #[error("Missing expression in `{source_text}`")]
    Empty { source_text: String },
    #[error("Invalid number `{text}` in `{source_text}`")]
    InvalidNumber { source_text: String, text: String },
    #[error("Expression nests deeper than {limit} levels in `{source_text}`")]
    TooDeep { source_text: String, limit: usize },
}

impl ParseError {
    /// Byte range of the offending text, when there is one
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            ParseError::UnclosedParen { open, .. } => Some(*open),
            _ => None,
        }
    }

    pub fn source_text(&self) -> &str {
        match self {
            ParseError::UnexpectedToken { source_text, .. }
            | ParseError::UnclosedParen { source_text, .. }
            | ParseError::Empty { source_text }
            | ParseError::InvalidNumber { source_text, .. }
            | ParseError::TooDeep { source_text, .. } => source_text,
        }
    }

    /// Re-anchor an error raised while parsing the slice of `outer` that
    /// starts at byte `offset`
    pub fn in_context(self, outer: &str, offset: usize) -> ParseError {
        let source_text = outer.to_string();
        let shift = |span: Span| Span::new(span.start + offset, span.end + offset);
        match self {
            ParseError::UnexpectedToken {
                expected,
                found,
                span,
                ..
            } => ParseError::UnexpectedToken {
                source_text,
                expected,
                found,
                span: shift(span),
            },
            ParseError::UnclosedParen { open, .. } => ParseError::UnclosedParen {
                source_text,
                open: shift(open),
            },
            ParseError::Empty { .. } => ParseError::Empty { source_text },
            ParseError::InvalidNumber { text, .. } => ParseError::InvalidNumber { source_text, text },
            ParseError::TooDeep { limit, .. } => ParseError::TooDeep { source_text, limit },
        }
    }
}

/// An expression together with the height of its tree
type Parsed = (Expr, usize);

/// Recursive-descent parser for arithmetic expressions.
///
/// ```text
/// additive       := multiplicative (("+" | "-") multiplicative)*
/// multiplicative := unary (("*" | "/") unary)*
/// unary          := ("-" | "+") unary | power
/// power          := primary ("**" unary)?
/// primary        := number | identifier | "(" additive ")"
/// ```
///
/// `**` is right associative and binds tighter than a unary sign on its
/// left, so `-x**2` is `-(x**2)` while `2**-1` is accepted.
///
/// Trees taller than [`MAX_DEPTH`] are rejected so that evaluating,
/// printing and dropping them stays within the stack.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

fn describe_token(token: &Token) -> String {
    match token.kind {
        TokenKind::Ident | TokenKind::Number | TokenKind::Error => format!("`{}`", token.text),
        kind => kind.describe().to_string(),
    }
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Lexer::tokenize(source),
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse(source: &str) -> Result<Expr, ParseError> {
        let mut parser = Parser::new(source);
        parser.parse_expression()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let eof = self.source.len();
        let (found, span) = match self.current() {
            Some(t) => (describe_token(t), t.span),
            None => (TokenKind::Eof.describe().to_string(), Span::new(eof, eof)),
        };
        ParseError::UnexpectedToken {
            source_text: self.source.to_string(),
            expected: expected.to_string(),
            found,
            span,
        }
    }

    fn too_deep(&self) -> ParseError {
        ParseError::TooDeep {
            source_text: self.source.to_string(),
            limit: MAX_DEPTH,
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn checked(&self, expr: Expr, height: usize) -> Result<Parsed, ParseError> {
        if height > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok((expr, height))
    }

    fn binary(&self, left: Parsed, op: BinaryOp, right: Parsed) -> Result<Parsed, ParseError> {
        let height = left.1.max(right.1) + 1;
        let expr = Expr::BinaryOp {
            left: Box::new(left.0),
            op,
            right: Box::new(right.0),
        };
        self.checked(expr, height)
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        if self.peek_kind() == TokenKind::Eof {
            return Err(ParseError::Empty {
                source_text: self.source.to_string(),
            });
        }
        let (expr, _) = self.parse_additive()?;
        if self.peek_kind() != TokenKind::Eof {
            return Err(self.unexpected("operator or end of expression"));
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Parsed, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(left, op, right)?;
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Parsed, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(left, op, right)?;
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Parsed, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.parse_power(),
        };
        self.advance();
        self.enter()?;
        let (operand, height) = self.parse_unary()?;
        self.leave();
        let expr = Expr::Unary {
            op,
            operand: Box::new(operand),
        };
        self.checked(expr, height + 1)
    }

    fn parse_power(&mut self) -> Result<Parsed, ParseError> {
        let base = self.parse_primary()?;
        if self.peek_kind() != TokenKind::StarStar {
            return Ok(base);
        }
        self.advance();
        // Right operand goes back through unary, which makes `**` right associative
        self.enter()?;
        let exponent = self.parse_unary()?;
        self.leave();
        self.binary(base, BinaryOp::Pow, exponent)
    }

    fn parse_primary(&mut self) -> Result<Parsed, ParseError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let token = self.advance().ok_or_else(|| self.unexpected("number"))?;
                let value = token
                    .text
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| ParseError::InvalidNumber {
                        source_text: self.source.to_string(),
                        text: token.text.clone(),
                    })?;
                Ok((Expr::Number(value), 1))
            }
            TokenKind::Ident => {
                let token = self.advance().ok_or_else(|| self.unexpected("identifier"))?;
                Ok((
                    Expr::Ident {
                        name: token.text,
                        span: token.span,
                    },
                    1,
                ))
            }
            TokenKind::LParen => {
                let open = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
                self.advance();
                self.enter()?;
                let (expr, height) = self.parse_additive()?;
                self.leave();
                match self.peek_kind() {
                    TokenKind::RParen => {
                        self.advance();
                        self.checked(Expr::Paren(Box::new(expr)), height + 1)
                    }
                    TokenKind::Eof => Err(ParseError::UnclosedParen {
                        source_text: self.source.to_string(),
                        open,
                    }),
                    _ => Err(self.unexpected(TokenKind::RParen.describe())),
                }
            }
            _ => Err(self.unexpected(&format!(
                "{}, {} or {}",
                TokenKind::Number.describe(),
                TokenKind::Ident.describe(),
                TokenKind::LParen.describe()
            ))),
        }
    }
}
