//! Depth-first traversal with enter/exit hooks.
//!
//! A [`Visit`] implementation sees every node twice: once on the way down,
//! when it may veto descent into the subtree, and once on the way up after
//! all children are done. Hooks receive the ancestor path so that
//! context-sensitive rewrites (is this identifier a member property, am I
//! inside a method) need no parent-pointer chasing.
//!
//! # Skipping
//!
//! Returning [`Control::Skip`] from `enter` prunes the subtree: neither the
//! children nor the node's own `exit` hook run.

use crate::{Ast, NodeId};

/// Minimum stack space to keep available before recursing into a child.
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// What to do after entering a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Skip,
}

/// Enter/exit hooks driven by a [`Traverser`].
pub trait Visit {
    type Error;

    /// Called before the node's children. `path` holds the ancestors,
    /// outermost first.
    fn enter(&mut self, ast: &Ast, id: NodeId, path: &[NodeId]) -> Result<Control, Self::Error>;

    /// Called after the node's children.
    fn exit(&mut self, ast: &Ast, id: NodeId, path: &[NodeId]) -> Result<(), Self::Error> {
        let _ = (ast, id, path);
        Ok(())
    }
}

/// Walks an [`Ast`] from its root, maintaining the ancestor path.
pub struct Traverser<'ast> {
    ast: &'ast Ast,
    path: Vec<NodeId>,
}

impl<'ast> Traverser<'ast> {
    pub fn new(ast: &'ast Ast) -> Self {
        Traverser {
            ast,
            path: Vec::new(),
        }
    }

    /// Visit the whole tree. The first error aborts the walk.
    pub fn traverse<V: Visit>(&mut self, visitor: &mut V) -> Result<(), V::Error> {
        self.path.clear();
        let root = self.ast.root();
        self.walk(root, visitor)
    }

    fn walk<V: Visit>(&mut self, id: NodeId, visitor: &mut V) -> Result<(), V::Error> {
        ensure_sufficient_stack(|| {
            if visitor.enter(self.ast, id, &self.path)? == Control::Skip {
                return Ok(());
            }
            self.path.push(id);
            for child in self.ast.kind(id).children() {
                self.walk(child, visitor)?;
            }
            self.path.pop();
            visitor.exit(self.ast, id, &self.path)
        })
    }
}

#[inline]
#[cfg(not(target_arch = "wasm32"))]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
