use arith_ast::token::TokenKind;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while_m_n};
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{all_consuming, consumed, eof, map, map_parser, peek, recognize, value};
use nom::error::{context, VerboseError};
use nom::sequence::{pair, preceded, tuple};
use nom::IResult;

type Result<'a, O, E = &'a str> = IResult<&'a str, O, VerboseError<E>>;

/// Parses a single token off the front of `src`, skipping leading
/// whitespace. Returns `(skipped, len, kind)` where `skipped` is the number
/// of whitespace bytes consumed before the token and `len` the token's own
/// byte length, so callers can reconstruct exact spans.
pub fn parse_token(src: &str) -> Result<(usize, usize, TokenKind), String> {
    let mut main_parser = context(
        "token",
        map(
            tuple((consumed(parse_insignificant), consumed(_parse_token))),
            |((skipped, _), (consumed, kind))| (skipped.len(), consumed.len(), kind),
        ),
    );
    (main_parser)(src).map_err(|e| e.map(map_error))
}

fn map_error(e: VerboseError<&str>) -> VerboseError<String> {
    let VerboseError { errors } = e;
    let errors = errors
        .into_iter()
        .map(|(rest, kind)| (rest.to_string(), kind))
        .collect();
    VerboseError { errors }
}

fn _parse_token(src: &str) -> Result<TokenKind> {
    alt((parse_eof, parse_word, parse_integer, parse_operator))(src)
}

fn parse_eof(src: &str) -> Result<TokenKind> {
    context("eof", value(TokenKind::Eof, eof))(src)
}

fn parse_operator(src: &str) -> Result<TokenKind> {
    context(
        "operator",
        alt((
            value(TokenKind::PlusPlus, tag("++")),
            value(TokenKind::Plus, char('+')),
            value(TokenKind::MinusMinus, tag("--")),
            value(TokenKind::Minus, char('-')),
            value(TokenKind::Star, char('*')),
            value(TokenKind::Div, char('/')),
            value(TokenKind::Caret, char('^')),
            value(TokenKind::Assign, char('=')),
            value(TokenKind::LParen, char('(')),
            value(TokenKind::RParen, char(')')),
        )),
    )(src)
}

fn parse_word(src: &str) -> Result<TokenKind> {
    context(
        "word",
        preceded(
            peek(take_while_m_n(1, 1, |c: char| {
                c.is_ascii_alphabetic() || c == '_'
            })),
            map_parser(recognize_identifier, |word| {
                alt((parse_keyword, parse_identifier))(word)
            }),
        ),
    )(src)
}

fn recognize_identifier(src: &str) -> Result<&str> {
    recognize(pair(
        take_while_m_n(1, 1, |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(src)
}

fn all_consuming_tag(src: &str) -> impl FnMut(&str) -> Result<&str> + '_ {
    move |i| all_consuming(tag(src))(i)
}

fn parse_keyword(src: &str) -> Result<TokenKind> {
    context(
        "keyword",
        alt((
            value(TokenKind::Let, all_consuming_tag("let")),
            value(TokenKind::In, all_consuming_tag("in")),
            value(TokenKind::End, all_consuming_tag("end")),
        )),
    )(src)
}

fn parse_identifier(src: &str) -> Result<TokenKind> {
    context(
        "identifier",
        map(recognize_identifier, |id: &str| {
            TokenKind::Identifier(id.to_string())
        }),
    )(src)
}

fn parse_integer(src: &str) -> Result<TokenKind> {
    // the lexeme is kept raw; range checking happens during compilation
    context(
        "integer",
        map(digit1, |digits: &str| {
            TokenKind::Integer(digits.to_string())
        }),
    )(src)
}

fn parse_insignificant(src: &str) -> Result<()> {
    context("whitespace", value((), multispace0))(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_parse_token_skips_whitespace() {
        let (rest, (skipped, len, kind)) = parse_token("  \t42 + 1").unwrap();
        assert_eq!(skipped, 3);
        assert_eq!(len, 2);
        assert_eq!(kind, TokenKind::Integer("42".to_string()));
        assert_eq!(rest, " + 1");
    }

    #[test]
    fn test_parse_token_eof() {
        let (_, (_, _, kind)) = parse_token("   ").unwrap();
        assert_eq!(kind, TokenKind::Eof);
    }

    #[test]
    fn test_double_minus_wins_over_minus() {
        let (rest, (_, len, kind)) = parse_token("--").unwrap();
        assert_eq!(kind, TokenKind::MinusMinus);
        assert_eq!(len, 2);
        assert_eq!(rest, "");
    }

    #[test]
    fn test_keyword_requires_whole_word() {
        let (_, (_, _, kind)) = parse_token("index").unwrap();
        assert_eq!(kind, TokenKind::Identifier("index".to_string()));
        let (_, (_, _, kind)) = parse_token("in dex").unwrap();
        assert_eq!(kind, TokenKind::In);
    }
}
