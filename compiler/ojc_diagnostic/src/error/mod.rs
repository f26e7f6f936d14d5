//! Hard compile errors.
//!
//! A hard error aborts the compile of the unit that raised it. Construction
//! goes through the named helpers so message wording stays uniform; the
//! span is attached with [`CompileError::at`] where a node is known.

use std::fmt;

use ojc_ir::Span;

use crate::LineOffsetTable;

/// What went wrong. Each kind has a stable kebab-case tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParseError,
    DuplicateClass,
    DuplicateProtocol,
    DuplicateProperty,
    DuplicateMethod,
    DuplicateIvar,
    DuplicateEnum,
    UnknownProperty,
    PropertyAlreadySynthesized,
    PropertyAlreadyDynamic,
    IvarAlreadyClaimed,
    NonLiteralConst,
    NonLiteralEnum,
    NonIntegerEnum,
    NonConstantInitializer,
    ReservedNamespace,
    ReservedMethodName,
    SqueezerReachedEndIndex,
    TypeAlreadyExists,
    CircularTypeHierarchy,
    CircularClassHierarchy,
    RestrictedUsage,
    UnknownMacro,
    MacroOutOfContext,
    NoSuperclass,
    EditConflict,
}

impl ErrorKind {
    /// Stable tag for machine consumers.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ParseError => "parse-error",
            ErrorKind::DuplicateClass => "duplicate-class",
            ErrorKind::DuplicateProtocol => "duplicate-protocol",
            ErrorKind::DuplicateProperty => "duplicate-property",
            ErrorKind::DuplicateMethod => "duplicate-method",
            ErrorKind::DuplicateIvar => "duplicate-ivar",
            ErrorKind::DuplicateEnum => "duplicate-enum",
            ErrorKind::UnknownProperty => "unknown-property",
            ErrorKind::PropertyAlreadySynthesized => "property-already-synthesized",
            ErrorKind::PropertyAlreadyDynamic => "property-already-dynamic",
            ErrorKind::IvarAlreadyClaimed => "ivar-already-claimed",
            ErrorKind::NonLiteralConst => "non-literal-const",
            ErrorKind::NonLiteralEnum => "non-literal-enum",
            ErrorKind::NonIntegerEnum => "non-integer-enum",
            ErrorKind::NonConstantInitializer => "non-constant-initializer",
            ErrorKind::ReservedNamespace => "reserved-namespace",
            ErrorKind::ReservedMethodName => "reserved-method-name",
            ErrorKind::SqueezerReachedEndIndex => "squeezer-reached-end-index",
            ErrorKind::TypeAlreadyExists => "type-already-exists",
            ErrorKind::CircularTypeHierarchy => "circular-type-hierarchy",
            ErrorKind::CircularClassHierarchy => "circular-class-hierarchy",
            ErrorKind::RestrictedUsage => "restricted-usage",
            ErrorKind::UnknownMacro => "unknown-macro",
            ErrorKind::MacroOutOfContext => "macro-out-of-context",
            ErrorKind::NoSuperclass => "no-superclass",
            ErrorKind::EditConflict => "edit-conflict",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hard error, with whatever location information is known.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Option<Span>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CompileError {
            kind,
            message: message.into(),
            span: None,
            file: None,
            line: None,
            column: None,
        }
    }

    /// Attach a span unless one is already set.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// Tag with the originating file path.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Resolve the span to a 1-based line and column.
    pub fn locate(&mut self, table: &LineOffsetTable, source: &str) {
        if let Some(span) = self.span {
            let (line, column) = table.offset_to_line_col(source, span.start);
            self.line = Some(line);
            self.column = Some(column);
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    pub fn duplicate_class(name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateClass,
            format!("Duplicate declaration of class '{name}'"),
        )
    }

    pub fn duplicate_protocol(name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateProtocol,
            format!("Duplicate declaration of protocol '{name}'"),
        )
    }

    pub fn duplicate_property(class: &str, name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateProperty,
            format!("Duplicate declaration of property '{name}' in '{class}'"),
        )
    }

    pub fn duplicate_method(owner: &str, signature: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateMethod,
            format!("Duplicate declaration of method '{signature}' in '{owner}'"),
        )
    }

    pub fn duplicate_ivar(class: &str, name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateIvar,
            format!("Duplicate declaration of instance variable '{name}' in '{class}'"),
        )
    }

    pub fn duplicate_enum(name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateEnum,
            format!("Duplicate declaration of enum '{name}'"),
        )
    }

    pub fn unknown_property(class: &str, name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownProperty,
            format!("Unknown property '{name}' in '{class}'"),
        )
    }

    pub fn property_already_synthesized(name: &str) -> Self {
        Self::new(
            ErrorKind::PropertyAlreadySynthesized,
            format!("Property '{name}' already synthesized"),
        )
    }

    pub fn property_already_dynamic(name: &str) -> Self {
        Self::new(
            ErrorKind::PropertyAlreadyDynamic,
            format!("Property '{name}' already declared @dynamic"),
        )
    }

    pub fn ivar_already_claimed(ivar: &str, first: &str, second: &str) -> Self {
        Self::new(
            ErrorKind::IvarAlreadyClaimed,
            format!(
                "Properties '{first}' and '{second}' both claim instance variable '{ivar}'"
            ),
        )
    }

    pub fn non_literal_const(name: &str) -> Self {
        Self::new(
            ErrorKind::NonLiteralConst,
            format!("Use of non-literal value with @const '{name}'"),
        )
    }

    pub fn non_literal_enum(name: &str) -> Self {
        Self::new(
            ErrorKind::NonLiteralEnum,
            format!("Use of non-literal value with @enum member '{name}'"),
        )
    }

    pub fn non_integer_enum(name: &str) -> Self {
        Self::new(
            ErrorKind::NonIntegerEnum,
            format!("Use of non-integer value with @enum member '{name}'"),
        )
    }

    pub fn non_constant_initializer(name: &str) -> Self {
        Self::new(
            ErrorKind::NonConstantInitializer,
            format!("Initializer of '{name}' in class body must be a literal or function"),
        )
    }

    pub fn reserved_namespace(name: &str) -> Self {
        Self::new(
            ErrorKind::ReservedNamespace,
            format!("Identifiers may not start with \"$oj_\" or \"$oj$\": '{name}'"),
        )
    }

    pub fn reserved_method_name(selector: &str) -> Self {
        Self::new(
            ErrorKind::ReservedMethodName,
            format!("Cannot override reserved method '{selector}'"),
        )
    }

    pub fn squeezer_reached_end_index(end: u32) -> Self {
        Self::new(
            ErrorKind::SqueezerReachedEndIndex,
            format!("Squeezer reached end index {end}"),
        )
    }

    pub fn type_already_exists(name: &str) -> Self {
        Self::new(
            ErrorKind::TypeAlreadyExists,
            format!("Type '{name}' already declared with a different meaning"),
        )
    }

    pub fn circular_type_hierarchy(chain: &[String]) -> Self {
        Self::new(
            ErrorKind::CircularTypeHierarchy,
            format!("Circular typedef hierarchy detected: {}", chain.join(", ")),
        )
    }

    pub fn circular_class_hierarchy(chain: &[String]) -> Self {
        Self::new(
            ErrorKind::CircularClassHierarchy,
            format!("Circular class hierarchy detected: {}", chain.join(", ")),
        )
    }

    pub fn restricted_usage(name: &str, what: &str) -> Self {
        Self::new(
            ErrorKind::RestrictedUsage,
            format!("Cannot use {what} '{name}' here"),
        )
    }

    pub fn unknown_macro(name: &str) -> Self {
        Self::new(ErrorKind::UnknownMacro, format!("Unknown macro '{name}'"))
    }

    pub fn macro_out_of_context(name: &str, context: &str) -> Self {
        Self::new(
            ErrorKind::MacroOutOfContext,
            format!("Cannot use {name} outside of {context}"),
        )
    }

    pub fn no_superclass(class: &str) -> Self {
        Self::new(
            ErrorKind::NoSuperclass,
            format!("Cannot message super: class '{class}' has no superclass"),
        )
    }

    pub fn edit_conflict(first: Span, second: Span) -> Self {
        Self::new(
            ErrorKind::EditConflict,
            format!("Overlapping edits at {first} and {second}"),
        )
        .at(second)
    }
}

#[cfg(test)]
mod tests;
