//! The recursive-descent expression parser.
//!
//! Operator precedence is handled by precedence climbing inside the binary
//! expression rule, so a lone atom still comes back as a single-child
//! `BinaryExpr` rather than its own node type.

use crate::lexer::{lex, LexingError};
use arith_ast::spanned::Spanned;
use arith_ast::token::{Token, TokenKind};
use arith_ast::{Ast, AstBuilder, NodeId, NodeKind};
use log::trace;
use thiserror::Error;

/// Parses an expression source into an [Ast].
///
/// The whole input must form exactly one expression: trailing tokens, empty
/// input, and any grammar mismatch are hard errors with no recovery.
pub fn parse(text: &str) -> Result<Ast, SyntaxError> {
    trace!("parsing {text:?}");
    let tokens = lex(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut builder = AstBuilder::new();
    let root = parser.parse_expression(&mut builder)?;
    if let Some(token) = parser.peek() {
        return Err(SyntaxError::TrailingInput {
            found: token.kind().to_string(),
            offset: token.span().offset(),
        });
    }
    let ast = builder.finish(root);
    trace!("parsed into {} nodes", ast.len());
    Ok(ast)
}

/// Represents an error occurring during parsing
#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lexing(#[from] LexingError),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("expected one of {expected:?}, got {found:?} at byte {offset}")]
    ExpectedToken {
        expected: Vec<&'static str>,
        found: String,
        offset: usize,
    },
    #[error("trailing input starting with {found:?} at byte {offset}")]
    TrailingInput { found: String, offset: usize },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Assoc {
    Left,
    Right,
}

/// Precedence level and associativity for binary operator tokens
fn binop(kind: &TokenKind) -> Option<(u8, Assoc)> {
    match kind {
        TokenKind::Plus | TokenKind::Minus => Some((1, Assoc::Left)),
        TokenKind::Star | TokenKind::Div => Some((2, Assoc::Left)),
        TokenKind::Caret => Some((3, Assoc::Right)),
        _ => None,
    }
}

#[derive(Debug)]
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| t.kind())
    }

    fn peek2(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expected(&self, expected: &[&'static str]) -> SyntaxError {
        match self.peek() {
            Some(token) => SyntaxError::ExpectedToken {
                expected: expected.to_vec(),
                found: token.kind().to_string(),
                offset: token.span().offset(),
            },
            None => SyntaxError::UnexpectedEof,
        }
    }

    /// `Expression := UnaryExpr | BinaryExpr`, always wrapped in an
    /// `Expression` node
    fn parse_expression(&mut self, builder: &mut AstBuilder) -> Result<NodeId, SyntaxError> {
        let atom = self.parse_atom(builder)?;
        let inner = match self.peek_kind() {
            Some(TokenKind::PlusPlus) | Some(TokenKind::MinusMinus) => {
                let op = self.consume().expect("postfix operator was peeked");
                let op_node = builder.leaf(NodeKind::Operator, op.kind().to_string());
                builder.node(NodeKind::UnaryExpr, vec![atom, op_node])
            }
            _ => {
                let climbed = self.climb(builder, atom, 0)?;
                if builder.kind(climbed) == NodeKind::BinaryExpr {
                    climbed
                } else {
                    // single atom, collapsed into a degenerate BinaryExpr
                    builder.node(NodeKind::BinaryExpr, vec![climbed])
                }
            }
        };
        Ok(builder.node(NodeKind::Expression, vec![inner]))
    }

    /// Precedence climbing over `Atom (Operator Atom)*`
    fn climb(
        &mut self,
        builder: &mut AstBuilder,
        mut lhs: NodeId,
        min_prec: u8,
    ) -> Result<NodeId, SyntaxError> {
        while let Some((prec, _)) = self.peek_kind().and_then(binop) {
            if prec < min_prec {
                break;
            }
            let op = self.consume().expect("operator was peeked");
            let mut rhs = self.parse_atom(builder)?;
            while let Some((next_prec, next_assoc)) = self.peek_kind().and_then(binop) {
                let climbs_right =
                    next_prec > prec || (next_assoc == Assoc::Right && next_prec == prec);
                if !climbs_right {
                    break;
                }
                let next_min = if next_prec > prec { prec + 1 } else { prec };
                rhs = self.climb(builder, rhs, next_min)?;
            }
            let op_node = builder.leaf(NodeKind::Operator, op.kind().to_string());
            lhs = builder.node(NodeKind::BinaryExpr, vec![lhs, op_node, rhs]);
        }
        Ok(lhs)
    }

    /// `Atom := '(' Expression ')' | Literal | Ident | Let`
    fn parse_atom(&mut self, builder: &mut AstBuilder) -> Result<NodeId, SyntaxError> {
        let Some(token) = self.peek().cloned() else {
            return Err(SyntaxError::UnexpectedEof);
        };
        match token.kind() {
            TokenKind::LParen => {
                self.consume();
                let expr = self.parse_expression(builder)?;
                if !matches!(self.peek_kind(), Some(TokenKind::RParen)) {
                    return Err(self.expected(&[")"]));
                }
                self.consume();
                Ok(expr)
            }
            TokenKind::Integer(digits) => {
                let digits = digits.clone();
                self.consume();
                Ok(builder.leaf(NodeKind::Literal, digits))
            }
            TokenKind::Minus => {
                // a sign prefix is part of the literal token-wise: it must
                // touch the digits, so `-1` parses but `- 1` does not
                match self.peek2() {
                    Some(next)
                        if matches!(next.kind(), TokenKind::Integer(_))
                            && token.span().adjacent_to(&next.span()) =>
                    {
                        self.consume();
                        let digits_token = self.consume().expect("integer was peeked");
                        let TokenKind::Integer(digits) = digits_token.into_kind() else {
                            unreachable!("peeked token was an integer")
                        };
                        Ok(builder.leaf(NodeKind::Literal, format!("-{digits}")))
                    }
                    _ => Err(self.expected(&["literal", "identifier", "let", "("])),
                }
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.consume();
                Ok(builder.leaf(NodeKind::Ident, name))
            }
            TokenKind::Let => self.parse_let(builder),
            _ => Err(self.expected(&["literal", "identifier", "let", "("])),
        }
    }

    /// `Let := 'let' Binding+ 'in' Expression 'end'`
    fn parse_let(&mut self, builder: &mut AstBuilder) -> Result<NodeId, SyntaxError> {
        self.consume();
        let mut children = vec![self.parse_binding(builder)?];
        while !matches!(self.peek_kind(), Some(TokenKind::In)) {
            if !matches!(self.peek_kind(), Some(TokenKind::Identifier(_))) {
                return Err(self.expected(&["identifier", "in"]));
            }
            children.push(self.parse_binding(builder)?);
        }
        self.consume();
        let body = self.parse_expression(builder)?;
        if !matches!(self.peek_kind(), Some(TokenKind::End)) {
            return Err(self.expected(&["end"]));
        }
        self.consume();
        children.push(body);
        Ok(builder.node(NodeKind::Let, children))
    }

    /// `Binding := Ident '=' Expression`
    fn parse_binding(&mut self, builder: &mut AstBuilder) -> Result<NodeId, SyntaxError> {
        let name = match self.peek_kind() {
            Some(TokenKind::Identifier(name)) => name.clone(),
            _ => return Err(self.expected(&["identifier"])),
        };
        self.consume();
        if !matches!(self.peek_kind(), Some(TokenKind::Assign)) {
            return Err(self.expected(&["="]));
        }
        self.consume();
        let ident = builder.leaf(NodeKind::Ident, name);
        let value = self.parse_expression(builder)?;
        Ok(builder.node(NodeKind::Binding, vec![ident, value]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn child(ast: &Ast, id: NodeId, n: usize) -> NodeId {
        ast[id].children()[n]
    }

    /// Unwraps the `Expression` root down to the node below it
    fn top(ast: &Ast) -> NodeId {
        assert_eq!(ast[ast.root()].kind(), NodeKind::Expression);
        child(ast, ast.root(), 0)
    }

    #[test]
    fn test_parse_atom_collapses_into_binary() {
        let ast = parse("1").unwrap();
        let bin = top(&ast);
        assert_eq!(ast[bin].kind(), NodeKind::BinaryExpr);
        assert_eq!(ast[bin].children().len(), 1);
        let literal = child(&ast, bin, 0);
        assert_eq!(ast[literal].kind(), NodeKind::Literal);
        assert_eq!(ast[literal].token(), Some("1"));
    }

    #[test]
    fn test_parse_negative_literal() {
        let ast = parse("-1").unwrap();
        let literal = child(&ast, top(&ast), 0);
        assert_eq!(ast[literal].token(), Some("-1"));
    }

    #[test]
    fn test_parse_rejects_detached_sign() {
        assert!(matches!(
            parse("- 1"),
            Err(SyntaxError::ExpectedToken { .. })
        ));
    }

    #[test]
    fn test_parse_precedence_shape() {
        // multiplication binds tighter, so it ends up as the rhs subtree
        let ast = parse("1 + 2 * 2").unwrap();
        let add = top(&ast);
        assert_eq!(ast[add].children().len(), 3);
        assert_eq!(ast[child(&ast, add, 1)].token(), Some("+"));
        let rhs = child(&ast, add, 2);
        assert_eq!(ast[rhs].kind(), NodeKind::BinaryExpr);
        assert_eq!(ast[child(&ast, rhs, 1)].token(), Some("*"));
    }

    #[test]
    fn test_parse_left_associativity() {
        // (1 - 2) - 3
        let ast = parse("1 - 2 - 3").unwrap();
        let outer = top(&ast);
        let lhs = child(&ast, outer, 0);
        assert_eq!(ast[lhs].kind(), NodeKind::BinaryExpr);
        assert_eq!(ast[lhs].children().len(), 3);
        assert_eq!(ast[child(&ast, outer, 2)].kind(), NodeKind::Literal);
    }

    #[test]
    fn test_parse_power_right_associativity() {
        // 2 ^ (2 ^ 3)
        let ast = parse("2 ^ 2 ^ 3").unwrap();
        let outer = top(&ast);
        assert_eq!(ast[child(&ast, outer, 0)].kind(), NodeKind::Literal);
        let rhs = child(&ast, outer, 2);
        assert_eq!(ast[rhs].kind(), NodeKind::BinaryExpr);
        assert_eq!(ast[child(&ast, rhs, 1)].token(), Some("^"));
    }

    #[test]
    fn test_parse_unary_postfix() {
        let ast = parse("1++").unwrap();
        let unary = top(&ast);
        assert_eq!(ast[unary].kind(), NodeKind::UnaryExpr);
        assert_eq!(ast[unary].children().len(), 2);
        assert_eq!(ast[child(&ast, unary, 1)].token(), Some("++"));
    }

    #[test]
    fn test_parse_parenthesized_group() {
        let ast = parse("(1 + 2) * 2").unwrap();
        let mul = top(&ast);
        assert_eq!(ast[child(&ast, mul, 1)].token(), Some("*"));
        // the parenthesized group keeps its Expression wrapper
        assert_eq!(ast[child(&ast, mul, 0)].kind(), NodeKind::Expression);
    }

    #[test]
    fn test_parse_let_shape() {
        let ast = parse("let a = 1 b = 2 in a + b end").unwrap();
        let let_node = child(&ast, top(&ast), 0);
        assert_eq!(ast[let_node].kind(), NodeKind::Let);
        assert_eq!(ast[let_node].children().len(), 3);
        let binding = child(&ast, let_node, 0);
        assert_eq!(ast[binding].kind(), NodeKind::Binding);
        assert_eq!(ast[child(&ast, binding, 0)].token(), Some("a"));
        assert_eq!(ast[child(&ast, binding, 1)].kind(), NodeKind::Expression);
        let body = child(&ast, let_node, 2);
        assert_eq!(ast[body].kind(), NodeKind::Expression);
    }

    #[test]
    fn test_reparse_is_structurally_stable() {
        for src in [
            "1 + 2 * 2",
            "(1 + 2) * 2",
            "2 ^ 2 ^ 3",
            "1--",
            "let a = 1 in let b = a + 1 in b end end",
        ] {
            let first = parse(src).unwrap();
            let second = parse(src).unwrap();
            assert_eq!(first, second, "reparsing {src:?} changed the tree");
            assert_eq!(first.to_string(), second.to_string());
        }
    }

    #[test]
    fn test_parse_empty_input_fails() {
        assert!(matches!(parse(""), Err(SyntaxError::UnexpectedEof)));
        assert!(matches!(parse("  \n"), Err(SyntaxError::UnexpectedEof)));
    }

    #[test]
    fn test_parse_trailing_input_fails() {
        assert!(matches!(
            parse("1 2"),
            Err(SyntaxError::TrailingInput { .. })
        ));
        // a postfix expression cannot continue as a binary one
        assert!(matches!(
            parse("1++ + 2"),
            Err(SyntaxError::TrailingInput { .. })
        ));
    }

    #[test]
    fn test_parse_unbalanced_parens_fail() {
        assert!(parse("(1 + 2").is_err());
        assert!(matches!(
            parse("1 + 2)"),
            Err(SyntaxError::TrailingInput { .. })
        ));
    }

    #[test]
    fn test_parse_incomplete_operator_fails() {
        assert!(matches!(parse("1 +"), Err(SyntaxError::UnexpectedEof)));
    }

    #[test]
    fn test_parse_let_requires_in_and_end() {
        assert!(parse("let a = 1 a end").is_err());
        assert!(matches!(
            parse("let a = 1 in a"),
            Err(SyntaxError::UnexpectedEof)
        ));
        assert!(parse("let in 1 end").is_err());
    }
}
