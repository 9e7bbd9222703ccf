//! An arena-backed expression tree.
//!
//! Nodes live in a single [Vec] and refer to each other by index, so child
//! links are the only owning edges while every node can still reach its
//! parent for upward scope lookups without any shared-ownership machinery.

use std::fmt::{Display, Formatter};
use std::ops::Index;

/// The index of a [Node] within its [Ast] arena
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    /// The raw arena index
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of node kinds produced by the parser.
///
/// The compiler matches on this exhaustively, so adding a kind without a
/// handler is a build failure rather than a runtime fallthrough.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// Sugar wrapper with a single child: the top of a parse and
    /// parenthesized groups
    Expression,
    /// Either `lhs op rhs` (3 children) or a degenerate single atom
    /// (1 child)
    BinaryExpr,
    /// An operand followed by a postfix `Operator` node (`++` or `--`)
    UnaryExpr,
    /// An operator symbol leaf; the token is the operator lexeme
    Operator,
    /// An integer literal leaf; the token is the raw (possibly
    /// sign-prefixed) digit run
    Literal,
    /// An identifier leaf
    Ident,
    /// `let Binding+ in body end`; children are the bindings followed by the
    /// body expression
    Let,
    /// `name = expression`; children are `[Ident, expression]`
    Binding,
}

/// A single node within an [Ast]
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    token: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    /// The kind tag of this node
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The raw lexeme, present only on leaf nodes
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The ordered children of this node
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The arena index of this node's parent, if it is not the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// An immutable, arena-backed abstract syntax tree.
///
/// Built once by the parser via [AstBuilder] and only ever read afterwards;
/// the compiler keeps its own side tables instead of annotating nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// The root node of the tree
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Gets a node by index
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every node in the arena, in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// Walks upwards from `id`, yielding each ancestor's index in order
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.node(id).parent();
        std::iter::from_fn(move || {
            let next = current?;
            current = self.node(next).parent();
            Some(next)
        })
    }

    fn fmt_node(&self, f: &mut Formatter<'_>, id: NodeId, depth: usize) -> std::fmt::Result {
        let node = self.node(id);
        write!(f, "{:indent$}{:?}", "", node.kind(), indent = depth * 2)?;
        if let Some(token) = node.token() {
            write!(f, " ({token})")?;
        }
        writeln!(f)?;
        for &child in node.children() {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        self.node(index)
    }
}

impl Display for Ast {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_node(f, self.root, 0)
    }
}

/// Incrementally builds an [Ast] arena
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
}

impl AstBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a leaf node carrying its raw lexeme
    pub fn leaf(&mut self, kind: NodeKind, token: impl Into<String>) -> NodeId {
        self.push(Node {
            kind,
            token: Some(token.into()),
            children: vec![],
            parent: None,
        })
    }

    /// Adds an interior node, re-parenting all of its children
    pub fn node(&mut self, kind: NodeKind, children: Vec<NodeId>) -> NodeId {
        let id = self.push(Node {
            kind,
            token: None,
            children,
            parent: None,
        });
        for child_idx in 0..self.nodes[id.0].children.len() {
            let child = self.nodes[id.0].children[child_idx];
            self.nodes[child.0].parent = Some(id);
        }
        id
    }

    /// Gets the kind of an already-built node
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    /// Finishes the arena with `root` as the tree root
    pub fn finish(self, root: NodeId) -> Ast {
        Ast {
            nodes: self.nodes,
            root,
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ast {
        // 1 + 2
        let mut builder = AstBuilder::new();
        let lhs = builder.leaf(NodeKind::Literal, "1");
        let op = builder.leaf(NodeKind::Operator, "+");
        let rhs = builder.leaf(NodeKind::Literal, "2");
        let bin = builder.node(NodeKind::BinaryExpr, vec![lhs, op, rhs]);
        let root = builder.node(NodeKind::Expression, vec![bin]);
        builder.finish(root)
    }

    #[test]
    fn test_parent_links() {
        let ast = sample();
        let root = ast.root();
        assert_eq!(ast[root].parent(), None);
        let bin = ast[root].children()[0];
        assert_eq!(ast[bin].parent(), Some(root));
        for &leaf in ast[bin].children() {
            assert_eq!(ast[leaf].parent(), Some(bin));
        }
    }

    #[test]
    fn test_ancestors_walk_to_root() {
        let ast = sample();
        let bin = ast[ast.root()].children()[0];
        let leaf = ast[bin].children()[0];
        let ancestors = ast.ancestors(leaf).collect::<Vec<_>>();
        assert_eq!(ancestors, vec![bin, ast.root()]);
    }

    #[test]
    fn test_display_shows_tokens() {
        let rendered = sample().to_string();
        assert!(rendered.contains("Literal (1)"));
        assert!(rendered.contains("Operator (+)"));
    }
}
