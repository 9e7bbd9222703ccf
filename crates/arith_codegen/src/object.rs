//! Object-code emission for the host target

use crate::error::CodegenResult;
use crate::translate::translate;
use arith_ast::Ast;
use cranelift::prelude::*;
use cranelift_module::Module;
use cranelift_object::{ObjectBuilder, ObjectModule};
use log::debug;

/// A compiled expression as a linkable artifact
#[derive(Debug)]
pub struct ObjectCode {
    bytes: Vec<u8>,
    clif: String,
}

impl ObjectCode {
    /// The raw object file contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The CLIF text of the generated function
    pub fn clif(&self) -> &str {
        &self.clif
    }
}

/// Compiles the expression into an object file for the host target.
///
/// The entry point is exported as `main`, a zero-argument `i32`-returning
/// function. If the expression uses `^`, the object carries an undefined
/// reference to `powif` that must be satisfied at link time.
pub fn emit_object(ast: &Ast, module_name: &str) -> CodegenResult<ObjectCode> {
    let mut flag_builder = settings::builder();
    flag_builder.set("is_pic", "true").unwrap();
    let isa_builder = cranelift_native::builder()
        .unwrap_or_else(|msg| panic!("host machine is not supported: {msg}"));
    let isa = isa_builder
        .finish(settings::Flags::new(flag_builder))
        .unwrap();
    let builder = ObjectBuilder::new(isa, module_name, cranelift_module::default_libcall_names())?;
    let mut module = ObjectModule::new(builder);
    let mut ctx = module.make_context();
    let mut builder_context = FunctionBuilderContext::new();

    let (_, clif) = translate(&mut module, &mut ctx, &mut builder_context, ast, "main")?;

    let product = module.finish();
    let bytes = product.emit()?;
    debug!("emitted {} bytes of object code", bytes.len());
    Ok(ObjectCode { bytes, clif })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arith_parsing::parse;
    use test_log::test;

    #[test]
    fn test_emit_object_produces_bytes() {
        let ast = parse("(1 + 2) * 2").unwrap();
        let object = emit_object(&ast, "arith_test").expect("could not emit");
        assert!(!object.bytes().is_empty());
        assert!(object.clif().contains("function"));
    }

    #[test]
    fn test_emit_object_with_power_import() {
        let ast = parse("2 ^ 10").unwrap();
        let object = emit_object(&ast, "arith_test").expect("could not emit");
        assert!(!object.bytes().is_empty());
        assert!(object.clif().contains("powif"));
    }

    #[test]
    fn test_emit_object_without_power_has_no_import() {
        let ast = parse("1 + 2 * 2").unwrap();
        let object = emit_object(&ast, "arith_test").expect("could not emit");
        assert!(!object.clif().contains("powif"));
        // the symbol table must not mention powif either
        assert!(!object.bytes().windows(5).any(|w| w == b"powif"));
    }

    #[test]
    fn test_emit_object_unbound_identifier_fails() {
        let ast = parse("oops").unwrap();
        assert!(emit_object(&ast, "arith_test").is_err());
    }
}
