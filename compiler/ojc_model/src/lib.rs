//! Semantic model for the oj compiler.
//!
//! The [`Model`] is the static picture of every class, protocol, enum, const
//! and global visible to one compile, including declarations merged in from
//! a parent compile's persisted [`ModelState`]. It is populated by the
//! [`Builder`] pass, validated and frozen by [`Model::prepare`], and then
//! consulted read-mostly by code generation. The [`SymbolTyper`] it owns
//! derives every output identifier.

mod base;
pub mod build;
mod class;
mod enums;
mod ivar;
mod method;
mod model;
mod protocol;
mod state;
pub mod symbols;

pub use base::{
    is_base_object_selector, is_reserved_selector, BASE_OBJECT_SELECTORS, RESERVED_SELECTORS,
};
pub use build::Builder;
pub use class::{Class, Property, PropertyFlags, Synthesis};
pub use enums::Enum;
pub use ivar::Ivar;
pub use method::Method;
pub use model::Model;
pub use protocol::Protocol;
pub use state::{ModelState, StateError};
pub use symbols::{Location, SymbolState, SymbolTyper};
