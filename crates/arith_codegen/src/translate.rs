//! Translates an AST into a cranelift function, independent of whether the
//! module JITs or writes object code.

use crate::error::CodegenResult;
use arith_ast::{Ast, NodeKind};
use arith_compiler::backend::Backend;
use cranelift::codegen::ir::FuncRef;
use cranelift::prelude::types::{F32, I32};
use cranelift::prelude::*;
use cranelift_module::{FuncId, Linkage, Module};
use log::trace;

/// The symbol the power primitive is imported under. The JIT binds it to
/// [powif]; in object code it stays an undefined reference the linker must
/// satisfy.
pub(crate) const POWIF_SYMBOL: &str = "powif";

/// The host-side power primitive registered with the JIT
pub(crate) extern "C" fn powif(base: f32, exponent: i32) -> f32 {
    base.powi(exponent)
}

/// Builds one `fn() -> i32` named `name` inside `module` that computes the
/// expression, returning its id and the CLIF text of the generated function.
pub(crate) fn translate<M: Module>(
    module: &mut M,
    ctx: &mut codegen::Context,
    builder_context: &mut FunctionBuilderContext,
    ast: &Ast,
    name: &str,
) -> CodegenResult<(FuncId, String)> {
    let result = build(module, ctx, builder_context, ast, name);
    if result.is_err() {
        // a failed build leaves a half-made function behind in both reused
        // contexts; reset them so the next expression starts clean
        module.clear_context(ctx);
        *builder_context = FunctionBuilderContext::new();
    }
    result
}

fn build<M: Module>(
    module: &mut M,
    ctx: &mut codegen::Context,
    builder_context: &mut FunctionBuilderContext,
    ast: &Ast,
    name: &str,
) -> CodegenResult<(FuncId, String)> {
    trace!("translating expression into function {name:?}");
    ctx.func.signature.returns.push(AbiParam::new(I32));
    let func_id = module.declare_function(name, Linkage::Export, &ctx.func.signature)?;

    // the import only materializes when the expression uses `^`, so
    // power-free objects carry no undefined powif reference
    let powif = if uses_power(ast) {
        let mut powif_sig = module.make_signature();
        powif_sig.params.push(AbiParam::new(F32));
        powif_sig.params.push(AbiParam::new(I32));
        powif_sig.returns.push(AbiParam::new(F32));
        let powif_id = module.declare_function(POWIF_SYMBOL, Linkage::Import, &powif_sig)?;
        Some(module.declare_func_in_func(powif_id, &mut ctx.func))
    } else {
        None
    };

    {
        let mut builder = FunctionBuilder::new(&mut ctx.func, builder_context);
        let entry_block = builder.create_block();
        builder.switch_to_block(entry_block);
        builder.seal_block(entry_block);

        let mut backend = ClifBackend { builder, powif };
        let root = arith_compiler::compile(ast, &mut backend)?;
        backend.builder.ins().return_(&[root]);
        backend.builder.finalize();
    }

    let clif = ctx.func.display().to_string();
    trace!("generated clif:\n{clif}");
    module.define_function(func_id, ctx)?;
    module.clear_context(ctx);
    Ok((func_id, clif))
}

fn uses_power(ast: &Ast) -> bool {
    ast.nodes()
        .any(|node| node.kind() == NodeKind::Operator && node.token() == Some("^"))
}

/// The [Backend] the AST walker drives: each primitive appends one or two
/// cranelift instructions to the function under construction.
struct ClifBackend<'a> {
    builder: FunctionBuilder<'a>,
    /// Present whenever the expression contains a `^` operator
    powif: Option<FuncRef>,
}

impl Backend for ClifBackend<'_> {
    type Value = Value;

    fn constant_int(&mut self, value: i32) -> Value {
        self.builder.ins().iconst(I32, i64::from(value))
    }

    fn add(&mut self, a: Value, b: Value) -> Value {
        self.builder.ins().iadd(a, b)
    }

    fn sub(&mut self, a: Value, b: Value) -> Value {
        self.builder.ins().isub(a, b)
    }

    fn mul(&mut self, a: Value, b: Value) -> Value {
        self.builder.ins().imul(a, b)
    }

    fn sdiv(&mut self, a: Value, b: Value) -> Value {
        // division by zero traps at runtime, per the target
        self.builder.ins().sdiv(a, b)
    }

    fn int_to_float(&mut self, a: Value) -> Value {
        self.builder.ins().fcvt_from_sint(F32, a)
    }

    fn float_to_int(&mut self, a: Value) -> Value {
        self.builder.ins().fcvt_to_sint(I32, a)
    }

    fn power(&mut self, base: Value, exponent: Value) -> Value {
        let powif = self
            .powif
            .expect("powif is imported whenever a `^` operator was parsed");
        let call = self.builder.ins().call(powif, &[base, exponent]);
        self.builder.inst_results(call)[0]
    }
}
