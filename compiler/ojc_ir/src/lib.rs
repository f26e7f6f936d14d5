//! Syntax tree and traversal for the oj compiler.
//!
//! The front end hands the compiler an [`Ast`]: a flat arena of [`Node`]s,
//! each with a byte [`Span`] into the original source. Later passes never
//! rewrite the tree; they walk it with a [`Traverser`] and describe output as
//! text edits against those spans.

pub mod ast;
mod builder;
mod span;
mod traverse;

pub use ast::{Ast, Node, NodeId, NodeKind};
pub use builder::AstBuilder;
pub use span::Span;
pub use traverse::{Control, Traverser, Visit};
