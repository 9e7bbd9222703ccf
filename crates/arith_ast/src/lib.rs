//! The arena-backed abstract syntax tree for arithmetic expressions, along
//! with the lexical tokens it is built from.

pub mod ast;
pub mod spanned;
pub mod token;

pub use ast::{Ast, AstBuilder, Node, NodeId, NodeKind};
