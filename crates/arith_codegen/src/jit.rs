//! Just-in-time compilation of expressions into the current process

use crate::error::CodegenResult;
use crate::translate::{powif, translate, POWIF_SYMBOL};
use arith_ast::Ast;
use cranelift::prelude::*;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::Module;
use log::trace;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::mem;

/// JIT compiler, turning parsed expressions into callable machine code
pub struct Jit {
    /// The function builder context, which is reused across multiple
    /// [FunctionBuilder] instances
    builder_context: FunctionBuilderContext,
    /// The main cranelift context, which holds the state of the codegen
    ctx: codegen::Context,
    /// The module, with the jit backend, which manages the JIT'd functions
    module: JITModule,
    compiled: usize,
}

impl Debug for Jit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jit").finish_non_exhaustive()
    }
}

impl Default for Jit {
    fn default() -> Self {
        Self::new()
    }
}

impl Jit {
    /// Creates a new JIT for the host machine
    pub fn new() -> Self {
        let mut flag_builder = settings::builder();
        flag_builder.set("use_colocated_libcalls", "false").unwrap();
        flag_builder.set("is_pic", "false").unwrap();
        let isa_builder = cranelift_native::builder()
            .unwrap_or_else(|msg| panic!("host machine is not supported: {msg}"));
        let isa = isa_builder
            .finish(settings::Flags::new(flag_builder))
            .unwrap();
        let mut builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
        builder.symbol(POWIF_SYMBOL, powif as *const u8);
        let module = JITModule::new(builder);
        Self {
            builder_context: FunctionBuilderContext::new(),
            ctx: module.make_context(),
            module,
            compiled: 0,
        }
    }

    /// Compiles the expression into machine code, returning a handle that
    /// can run it and inspect its generated IR
    pub fn compile(&mut self, ast: &Ast) -> CodegenResult<CompiledExpr<'_>> {
        let name = format!("expr{}", self.compiled);
        let (id, clif) = translate(
            &mut self.module,
            &mut self.ctx,
            &mut self.builder_context,
            ast,
            &name,
        )?;
        self.module.finalize_definitions()?;
        self.compiled += 1;
        let code = self.module.get_finalized_function(id);
        trace!("finalized {name:?} at {code:?}");
        Ok(CompiledExpr {
            code,
            clif,
            _jit: PhantomData,
        })
    }
}

/// A JIT-compiled expression, valid for as long as the [Jit] that produced
/// it
pub struct CompiledExpr<'jit> {
    code: *const u8,
    clif: String,
    _jit: PhantomData<&'jit JITModule>,
}

impl CompiledExpr<'_> {
    /// Runs the compiled expression, returning its value
    pub fn run(&self) -> i32 {
        // the code lives as long as the Jit this handle borrows from, and
        // was built as fn() -> i32
        let entry = unsafe { mem::transmute::<*const u8, fn() -> i32>(self.code) };
        entry()
    }

    /// The CLIF text of the generated function
    pub fn clif(&self) -> &str {
        &self.clif
    }
}

impl Debug for CompiledExpr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledExpr")
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}
