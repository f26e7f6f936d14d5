//! Annotated syntax tree.
//!
//! The tree is stored flat: every node lives in one arena and refers to its
//! children through [`NodeId`]. Parent links are filled in once, when the
//! arena is sealed, so passes can walk upward without owning pointers.
//!
//! Node kinds follow the `ESTree` names for the plain-script subset and add
//! the class, message and directive forms of the extended language.

mod kinds;

pub use kinds::{
    quote, Function, Literal, MethodSignature, NodeKind, PropertyAttribute, SelectorArgs, SelectorType,
    SynthesizePair,
};

use crate::Span;

/// Index of a node in an [`Ast`] arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node: what it is, where it is, and who owns it.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
}

/// A parsed compilation unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Seal an arena, linking every node to its parent.
    ///
    /// Nodes unreachable from `root` keep `parent: None`.
    pub fn new(mut nodes: Vec<Node>, root: NodeId) -> Self {
        for index in 0..nodes.len() {
            let children = nodes[index].kind.children();
            let parent = NodeId::from_raw(u32::try_from(index).unwrap_or(u32::MAX));
            for child in children {
                if let Some(node) = nodes.get_mut(child.index()) {
                    node.parent = Some(parent);
                }
            }
        }
        Ast { nodes, root }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Name of an `Identifier` node, `None` for every other kind.
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Type annotation attached to an `Identifier` node.
    pub fn identifier_annotation(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Identifier { annotation, .. } => *annotation,
            _ => None,
        }
    }

    /// Value of a `TypeAnnotation` node.
    pub fn annotation_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::TypeAnnotation { value } => Some(value),
            _ => None,
        }
    }
}
