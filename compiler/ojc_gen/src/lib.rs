//! Output generation for the oj compiler.
//!
//! Given a parsed unit and its prepared [`ojc_model::Model`], the
//! [`Generator`] lowers every extension construct to plain script text by
//! queueing range-addressed edits on a [`Modifier`]. Source formatting
//! outside rewritten constructs is preserved byte for byte.

mod generator;
mod modifier;
mod options;
mod scope;

pub use generator::{Generation, Generator};
pub use modifier::Modifier;
pub use options::{InlineValue, Mode, Options};
pub use scope::{analyze_self_capture, Scope, ScopeKind, TEMPORARY_PREFIX};
