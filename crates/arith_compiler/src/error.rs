//! Errors produced while walking the AST.
//!
//! All of these are terminal: compilation of an expression is all-or-nothing
//! and nothing is retried.

use arith_ast::NodeKind;
use std::num::ParseIntError;
use thiserror::Error;

/// Represents an error occurring during compilation of a parsed expression
#[derive(Debug, Error)]
pub enum CompileError {
    /// An identifier with no binding in any enclosing environment
    #[error("unbound identifier {name:?}")]
    UnboundIdentifier { name: String },
    /// A literal token that does not fit the 32-bit signed integer type
    #[error("integer literal {token:?} is out of range: {source}")]
    LiteralRange {
        token: String,
        #[source]
        source: ParseIntError,
    },
    /// A node shape or operator the grammar can never produce. Reaching this
    /// means the parser and compiler disagree, so it fails loudly instead of
    /// producing a garbage value.
    #[error("internal invariant violated compiling {kind:?} node with token {token:?}")]
    InternalInvariant { kind: NodeKind, token: String },
}

pub type CompileResult<T> = Result<T, CompileError>;
