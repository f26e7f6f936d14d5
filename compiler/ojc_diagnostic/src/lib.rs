//! Diagnostics for the oj compiler.
//!
//! Two severities exist. A [`CompileError`] aborts the unit being compiled;
//! a [`Warning`] is collected and returned alongside the output. Both carry
//! a byte span and, once resolved against the source through a
//! [`LineOffsetTable`], a 1-based line and column. The driver tags both with
//! the originating file path.

mod error;
pub mod span_utils;
mod warning;

pub use error::{CompileError, ErrorKind};
pub use span_utils::LineOffsetTable;
pub use warning::{Warning, WarningKind};
