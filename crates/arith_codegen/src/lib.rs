//! Cranelift-backed code generation for compiled expressions.
//!
//! Every expression becomes a zero-argument function returning `i32`. The
//! same translation drives two module flavors:
//!
//! - [jit::Jit] compiles into process memory and hands back a callable
//!   [jit::CompiledExpr],
//! - [object::emit_object] produces a linkable object file for the host
//!   target.
//!
//! The `^` operator is lowered through an `f32` round-trip (sint to float,
//! `powi`, float back to sint), so results lose precision once operands
//! leave `f32`'s exactly-representable integer range. That behavior is load
//! bearing for compatibility and is not going to be "fixed".

pub mod error;
pub mod jit;
pub mod object;

mod translate;

pub use error::CodegenError;
pub use jit::{CompiledExpr, Jit};
pub use object::{emit_object, ObjectCode};
