use crate::backend::Backend;
use crate::error::{CompileError, CompileResult};
use arith_ast::{Ast, NodeId, NodeKind};
use log::trace;
use std::collections::HashMap;

/// Compiles a parsed expression against a backend, returning the backend's
/// handle for the root value.
pub fn compile<B: Backend>(ast: &Ast, backend: &mut B) -> CompileResult<B::Value> {
    Compiler::new(ast, backend).compile_node(ast.root())
}

/// A single depth-first walk over one [Ast].
///
/// Binding environments live in a side table keyed by the owning `let`
/// node's arena index, so the tree itself stays untouched. An environment is
/// inserted when its `let` is entered, filled binding by binding, and
/// removed once the body has been compiled.
pub struct Compiler<'a, B: Backend> {
    ast: &'a Ast,
    backend: &'a mut B,
    scopes: HashMap<NodeId, HashMap<String, B::Value>>,
}

impl<'a, B: Backend> Compiler<'a, B> {
    /// Creates a compiler for one walk over `ast`
    pub fn new(ast: &'a Ast, backend: &'a mut B) -> Self {
        Self {
            ast,
            backend,
            scopes: HashMap::new(),
        }
    }

    /// Compiles the subtree rooted at `id`
    pub fn compile_node(&mut self, id: NodeId) -> CompileResult<B::Value> {
        let node = &self.ast[id];
        trace!("compiling {id} {:?} (token {:?})", node.kind(), node.token());
        match node.kind() {
            // sugar wrappers carry no semantics of their own
            NodeKind::Expression => self.compile_sole_child(id),
            NodeKind::BinaryExpr if node.children().len() == 1 => self.compile_sole_child(id),
            NodeKind::BinaryExpr => self.compile_binary(id),
            NodeKind::UnaryExpr => self.compile_unary(id),
            NodeKind::Literal => self.compile_literal(id),
            NodeKind::Ident => self.compile_ident(id),
            NodeKind::Let => self.compile_let(id),
            // never compiled directly: operators are consumed by their
            // expression and bindings by their let
            NodeKind::Operator | NodeKind::Binding => Err(self.invariant(id)),
        }
    }

    fn compile_sole_child(&mut self, id: NodeId) -> CompileResult<B::Value> {
        match self.ast[id].children() {
            &[child] => self.compile_node(child),
            _ => Err(self.invariant(id)),
        }
    }

    fn compile_binary(&mut self, id: NodeId) -> CompileResult<B::Value> {
        let &[lhs, op, rhs] = self.ast[id].children() else {
            return Err(self.invariant(id));
        };
        let lhs = self.compile_node(lhs)?;
        let rhs = self.compile_node(rhs)?;
        match self.ast[op].token() {
            Some("+") => Ok(self.backend.add(lhs, rhs)),
            Some("-") => Ok(self.backend.sub(lhs, rhs)),
            Some("*") => Ok(self.backend.mul(lhs, rhs)),
            Some("/") => Ok(self.backend.sdiv(lhs, rhs)),
            Some("^") => {
                // the power primitive only works on floats, so the base
                // makes a float round-trip: sint -> float, powered, then
                // truncated back. Lossy once the operands leave the float
                // type's exact integer range; kept that way on purpose since
                // changing it would change observable results.
                let base = self.backend.int_to_float(lhs);
                let powered = self.backend.power(base, rhs);
                Ok(self.backend.float_to_int(powered))
            }
            _ => Err(self.invariant(op)),
        }
    }

    fn compile_unary(&mut self, id: NodeId) -> CompileResult<B::Value> {
        let &[operand, op] = self.ast[id].children() else {
            return Err(self.invariant(id));
        };
        let operand = self.compile_node(operand)?;
        let one = self.backend.constant_int(1);
        match self.ast[op].token() {
            Some("++") => Ok(self.backend.add(operand, one)),
            Some("--") => Ok(self.backend.sub(operand, one)),
            _ => Err(self.invariant(op)),
        }
    }

    fn compile_literal(&mut self, id: NodeId) -> CompileResult<B::Value> {
        let Some(token) = self.ast[id].token() else {
            return Err(self.invariant(id));
        };
        let value = token
            .parse::<i32>()
            .map_err(|source| CompileError::LiteralRange {
                token: token.to_string(),
                source,
            })?;
        Ok(self.backend.constant_int(value))
    }

    /// Resolves an identifier by walking parent indices upward; the nearest
    /// enclosing environment that knows the name wins.
    fn compile_ident(&mut self, id: NodeId) -> CompileResult<B::Value> {
        let Some(name) = self.ast[id].token() else {
            return Err(self.invariant(id));
        };
        for ancestor in self.ast.ancestors(id) {
            if let Some(value) = self.scopes.get(&ancestor).and_then(|env| env.get(name)) {
                trace!("resolved {name:?} in scope of {ancestor}");
                return Ok(*value);
            }
        }
        Err(CompileError::UnboundIdentifier {
            name: name.to_string(),
        })
    }

    /// Compiles `let` bindings left to right (sequential semantics: each
    /// binding sees the ones before it), then the body, then drops the
    /// environment so siblings never observe it.
    fn compile_let(&mut self, id: NodeId) -> CompileResult<B::Value> {
        let children = self.ast[id].children();
        let (&body, bindings) = children.split_last().ok_or_else(|| self.invariant(id))?;
        let bindings = bindings.to_vec();
        self.scopes.insert(id, HashMap::new());
        for binding in bindings {
            let node = &self.ast[binding];
            let (&[name_node, value_node], NodeKind::Binding) = (node.children(), node.kind())
            else {
                self.scopes.remove(&id);
                return Err(self.invariant(binding));
            };
            let Some(name) = self.ast[name_node].token() else {
                self.scopes.remove(&id);
                return Err(self.invariant(name_node));
            };
            let name = name.to_string();
            let value = match self.compile_node(value_node) {
                Ok(value) => value,
                Err(e) => {
                    self.scopes.remove(&id);
                    return Err(e);
                }
            };
            trace!("bound {name:?} in scope of {id}");
            self.scopes
                .get_mut(&id)
                .expect("environment was just inserted")
                .insert(name, value);
        }
        let result = self.compile_node(body);
        self.scopes.remove(&id);
        result
    }

    fn invariant(&self, id: NodeId) -> CompileError {
        let node = &self.ast[id];
        CompileError::InternalInvariant {
            kind: node.kind(),
            token: node.token().unwrap_or_default().to_string(),
        }
    }
}
