//! Errors surfaced while generating or emitting code

use arith_compiler::error::CompileError;
use cranelift_module::ModuleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("failed emitting object code: {0}")]
    Object(#[from] cranelift_object::object::write::Error),
}

pub type CodegenResult<T> = Result<T, CodegenError>;
