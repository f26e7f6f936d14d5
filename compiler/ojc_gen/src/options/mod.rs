//! Compile options.
//!
//! Hosts load these from any serde format; field names are kebab-case
//! (`warn-unused-ivars`, `additional-inlines`, ...). Every field defaults
//! to off, so an empty document is a plain runtime compile.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Output dialect.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Directly executable output with runtime registration.
    #[default]
    Runtime,
    /// Annotated output for an external static checker.
    Typechecker,
    /// Extension syntax removed with minimal substitution.
    Stripped,
}

/// Value of an `additional-inlines` entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InlineValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl InlineValue {
    /// Literal source text substituted at each reference.
    pub fn to_source(&self) -> String {
        match self {
            InlineValue::Bool(value) => value.to_string(),
            InlineValue::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
                    #[allow(clippy::cast_possible_truncation)]
                    let integer = *value as i64;
                    integer.to_string()
                } else {
                    value.to_string()
                }
            }
            InlineValue::Text(value) => ojc_ir::ast::quote(value),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    pub mode: Mode,
    pub squeeze: bool,
    pub squeeze_start_index: u32,
    pub squeeze_end_index: Option<u32>,
    pub inline_enum: bool,
    pub inline_const: bool,
    pub additional_inlines: BTreeMap<String, InlineValue>,
    pub strict_functions: bool,
    pub strict_object_literals: bool,
    pub warn_this_in_methods: bool,
    pub warn_unknown_selectors: bool,
    pub warn_unused_ivars: bool,
    pub warn_unknown_ivars: bool,
    pub warn_global_no_type: bool,
    pub warn_debugger: bool,
    pub warn_empty_array_element: bool,
}

impl Options {
    pub fn new(mode: Mode) -> Self {
        Options {
            mode,
            ..Options::default()
        }
    }

    pub fn is_typechecker(&self) -> bool {
        self.mode == Mode::Typechecker
    }

    /// Enum members are inlined and declarations erased.
    pub fn inlines_enums(&self) -> bool {
        self.inline_enum || self.is_typechecker()
    }

    /// Consts are inlined and declarations erased.
    pub fn inlines_consts(&self) -> bool {
        self.inline_const || self.is_typechecker()
    }

    /// Squeezing only ever applies to runtime output.
    pub fn squeezes(&self) -> bool {
        self.squeeze && self.mode == Mode::Runtime
    }

    /// Typechecker parameter lists are relaxed unless strict functions
    /// were requested.
    pub fn rewrites_function_parameters(&self) -> bool {
        self.is_typechecker() && !self.strict_functions
    }

    /// Object literals are cast to `any` unless strict literals were
    /// requested.
    pub fn loosens_object_literals(&self) -> bool {
        self.is_typechecker() && !self.strict_object_literals
    }
}
