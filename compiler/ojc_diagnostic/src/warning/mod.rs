//! Non-fatal warnings.
//!
//! Warnings never change the rewrite already queued for the construct that
//! triggered them. Each warning class is opt-in through the compile options.

use std::fmt;

use ojc_ir::Span;

use crate::LineOffsetTable;

/// The warning class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WarningKind {
    UnknownSelector,
    UseOfThisInMethod,
    UnusedInstanceVariable,
    UndeclaredInstanceVariable,
    MissingTypeAnnotation,
    DebuggerStatement,
    EmptyArrayElement,
}

impl WarningKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            WarningKind::UnknownSelector => "unknown-selector",
            WarningKind::UseOfThisInMethod => "use-of-this-in-method",
            WarningKind::UnusedInstanceVariable => "unused-instance-variable",
            WarningKind::UndeclaredInstanceVariable => "undeclared-instance-variable",
            WarningKind::MissingTypeAnnotation => "missing-type-annotation",
            WarningKind::DebuggerStatement => "debugger-statement",
            WarningKind::EmptyArrayElement => "empty-array-element",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collected warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub span: Span,
    pub file: Option<String>,
    /// 1-based, filled in by [`Warning::locate`].
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>, span: Span) -> Self {
        Warning {
            kind,
            message: message.into(),
            span,
            file: None,
            line: None,
            column: None,
        }
    }

    pub fn unknown_selector(selector: &str, span: Span) -> Self {
        Self::new(
            WarningKind::UnknownSelector,
            format!("Use of unknown selector '{selector}'"),
            span,
        )
    }

    pub fn this_in_method(span: Span) -> Self {
        Self::new(
            WarningKind::UseOfThisInMethod,
            "Use of 'this' keyword in oj method definition",
            span,
        )
    }

    pub fn unused_ivar(name: &str, span: Span) -> Self {
        Self::new(
            WarningKind::UnusedInstanceVariable,
            format!("Unused instance variable {name}"),
            span,
        )
    }

    pub fn undeclared_ivar(name: &str, span: Span) -> Self {
        Self::new(
            WarningKind::UndeclaredInstanceVariable,
            format!("Use of undeclared instance variable {name}"),
            span,
        )
    }

    pub fn missing_type_annotation(name: &str, span: Span) -> Self {
        Self::new(
            WarningKind::MissingTypeAnnotation,
            format!("Missing type annotation on @global '{name}'"),
            span,
        )
    }

    pub fn debugger_statement(span: Span) -> Self {
        Self::new(
            WarningKind::DebuggerStatement,
            "Use of debugger statement",
            span,
        )
    }

    pub fn empty_array_element(span: Span) -> Self {
        Self::new(
            WarningKind::EmptyArrayElement,
            "Use of empty array element",
            span,
        )
    }

    #[must_use]
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn locate(&mut self, table: &LineOffsetTable, source: &str) {
        let (line, column) = table.offset_to_line_col(source, self.span.start);
        self.line = Some(line);
        self.column = Some(column);
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}:")?;
        }
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, "{line}:{column}: ")?;
        }
        write!(f, "warning[{}]: {}", self.kind, self.message)
    }
}
