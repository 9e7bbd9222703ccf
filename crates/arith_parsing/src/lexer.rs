//! Responsible with converting source text into a token stream

use crate::lexer::token_parsing::parse_token;
use arith_ast::spanned::Span;
use arith_ast::token::{Token, TokenKind};
use nom::error::VerboseError;
use thiserror::Error;

mod token_parsing;

/// Responsible with converting source text into a token stream
#[derive(Debug)]
pub struct Lexer<'s> {
    rest: &'s str,
    offset: usize,
    done: bool,
}

impl<'s> Lexer<'s> {
    /// Creates a new lexer over the full source text
    pub fn new(src: &'s str) -> Self {
        Self {
            rest: src,
            offset: 0,
            done: false,
        }
    }

    fn next_token(&mut self) -> LexResult<Option<Token>> {
        if self.done {
            return Ok(None);
        }
        match parse_token(self.rest) {
            Ok((_, (_, _, TokenKind::Eof))) => {
                self.done = true;
                Ok(None)
            }
            Ok((rest, (skipped, len, kind))) => {
                let span = Span::new(self.offset + skipped, len);
                self.offset += self.rest.len() - rest.len();
                self.rest = rest;
                Ok(Some(Token::new(span, kind)))
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                self.done = true;
                Err(e.into())
            }
            Err(nom::Err::Incomplete(_)) => {
                // complete input, so a partial match is just a bad token
                self.done = true;
                Err(LexingError::UnexpectedEof)
            }
        }
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Result<Token, LexingError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(option) => option.map(Ok),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Lexes the whole source, failing on the first bad token
pub fn lex(src: &str) -> Result<Vec<Token>, LexingError> {
    Lexer::new(src).collect()
}

type LexResult<T> = Result<T, LexingError>;

#[derive(Debug, Error)]
pub enum LexingError {
    #[error("unexpected EOF")]
    UnexpectedEof,
    #[error(transparent)]
    NomError(#[from] VerboseError<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use arith_ast::spanned::Spanned;
    use test_log::test;

    #[test]
    fn test_lex_operators() {
        let tokens = lex("1 + 2 * (3 - 4) / 5 ^ 6").unwrap();
        let kinds = tokens.iter().map(|t| t.kind().clone()).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Integer("1".to_string()),
                TokenKind::Plus,
                TokenKind::Integer("2".to_string()),
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Integer("3".to_string()),
                TokenKind::Minus,
                TokenKind::Integer("4".to_string()),
                TokenKind::RParen,
                TokenKind::Div,
                TokenKind::Integer("5".to_string()),
                TokenKind::Caret,
                TokenKind::Integer("6".to_string()),
            ]
        );
    }

    #[test]
    fn test_lex_postfix_ops_are_single_tokens() {
        let tokens = lex("1++ 2--").unwrap();
        let kinds = tokens.iter().map(|t| t.kind().clone()).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Integer("1".to_string()),
                TokenKind::PlusPlus,
                TokenKind::Integer("2".to_string()),
                TokenKind::MinusMinus,
            ]
        );
    }

    #[test]
    fn test_lex_keywords_and_identifiers() {
        let tokens = lex("let a = 1 in a end").unwrap();
        let kinds = tokens.iter().map(|t| t.kind().clone()).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Let,
                TokenKind::Identifier("a".to_string()),
                TokenKind::Assign,
                TokenKind::Integer("1".to_string()),
                TokenKind::In,
                TokenKind::Identifier("a".to_string()),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_lex_keyword_prefixed_identifier() {
        let tokens = lex("lettuce ending input").unwrap();
        assert!(tokens
            .iter()
            .all(|t| matches!(t.kind(), TokenKind::Identifier(_))));
    }

    #[test]
    fn test_lex_spans_track_whitespace() {
        let tokens = lex("1 -2").unwrap();
        assert_eq!(tokens[0].span(), Span::new(0, 1));
        assert_eq!(tokens[1].span(), Span::new(2, 1));
        assert_eq!(tokens[2].span(), Span::new(3, 1));
        assert!(tokens[1].span().adjacent_to(&tokens[2].span()));
        assert!(!tokens[0].span().adjacent_to(&tokens[1].span()));
    }

    #[test]
    fn test_lex_rejects_unknown_char() {
        assert!(lex("1 $ 2").is_err());
    }

    #[test]
    fn test_lex_empty_is_empty() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("   \t\n").unwrap().is_empty());
    }
}
