//! A lexical token from an expression source

use crate::spanned::{Span, Spanned};
use std::fmt::{Debug, Display, Formatter};

/// A lexical token from an expression source
#[derive(Clone)]
pub struct Token {
    span: Span,
    kind: TokenKind,
}

impl Token {
    /// Creates a new token
    pub fn new(span: Span, kind: TokenKind) -> Self {
        Self { span, kind }
    }

    /// Gets the kind for this token
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Consumes the token, returning its kind
    pub fn into_kind(self) -> TokenKind {
        self.kind
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.kind, f)
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind for this token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // keywords
    Let,
    In,
    End,

    Identifier(String),
    /// An unsigned digit run, kept as its raw lexeme. Converting it to an
    /// integer is the compiler's job so that out-of-range literals surface
    /// there, not here.
    Integer(String),

    /// =
    Assign,
    Plus,
    Minus,
    Star,
    Div,
    Caret,
    /// ++
    PlusPlus,
    /// --
    MinusMinus,
    LParen,
    RParen,

    /// EOF, will only appear at the end of a token stream
    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Let => write!(f, "let"),
            TokenKind::In => write!(f, "in"),
            TokenKind::End => write!(f, "end"),
            TokenKind::Identifier(id) => write!(f, "{id}"),
            TokenKind::Integer(digits) => write!(f, "{digits}"),
            TokenKind::Assign => write!(f, "="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Div => write!(f, "/"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::PlusPlus => write!(f, "++"),
            TokenKind::MinusMinus => write!(f, "--"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Eof => write!(f, "<eof>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_shows_its_kind() {
        let token = Token::new(Span::new(0, 2), TokenKind::PlusPlus);
        assert_eq!(format!("{token:?}"), format!("{:?}", TokenKind::PlusPlus));
        let ident = Token::new(Span::new(3, 1), TokenKind::Identifier("a".to_string()));
        assert_eq!(format!("{ident:?}"), "Identifier(\"a\")");
    }
}
