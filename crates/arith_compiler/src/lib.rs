//! The AST-walking compiler.
//!
//! [compile] dispatches every node of an [arith_ast::Ast] to a
//! [Backend](backend::Backend), resolving identifiers against an
//! enclosing-scope chain along the way, and returns the backend's handle for
//! the root value. The walk is a single synchronous depth-first pass; the
//! only state beyond the recursion stack is a side table mapping `let` nodes
//! to their binding environments.

pub mod backend;
pub mod error;

mod compiler;

pub use compiler::{compile, Compiler};
