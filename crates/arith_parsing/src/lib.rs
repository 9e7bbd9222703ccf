//! Turns arithmetic expression source text into an [arith_ast::Ast].
//!
//! The grammar, with precedence climbing handled inside the binary
//! expression rule:
//!
//! ```text
//! Expression  := UnaryExpr | BinaryExpr
//! BinaryExpr  := Atom (Operator Atom)*    level 1, left assoc:  '-' '+'
//!                                         level 2, left assoc:  '/' '*'
//!                                         level 3, right assoc: '^'
//! UnaryExpr   := Atom PostfixOp           PostfixOp := '++' | '--'
//! Atom        := '(' Expression ')' | Literal | Ident | Let
//! Let         := 'let' Binding+ 'in' Expression 'end'
//! Binding     := Ident '=' Expression
//! Literal     := '-'? [0-9]+
//! ```
//!
//! Parsing is all-or-nothing: any grammar mismatch, trailing input, or empty
//! input fails the whole parse with a [SyntaxError].

pub mod lexer;
pub mod parser;

pub use parser::{parse, SyntaxError};
