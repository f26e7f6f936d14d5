//! Method signatures.

use ojc_ir::ast::SelectorType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub selector_name: String,
    pub selector_type: SelectorType,
    pub return_type: String,
    pub parameter_types: Vec<String>,
    pub variable_names: Vec<String>,
    /// Protocol methods only.
    pub optional: bool,
    /// Generated accessor rather than a hand-written definition.
    pub synthesized: bool,
}

impl Method {
    pub fn new(
        selector_name: impl Into<String>,
        selector_type: SelectorType,
        return_type: impl Into<String>,
        parameter_types: Vec<String>,
        variable_names: Vec<String>,
    ) -> Self {
        Method {
            selector_name: selector_name.into(),
            selector_type,
            return_type: return_type.into(),
            parameter_types,
            variable_names,
            optional: false,
            synthesized: false,
        }
    }

    /// `-[sel]` / `+[sel]` form used in messages.
    pub fn signature(&self) -> String {
        format!("{}{}", self.selector_type.sigil(), self.selector_name)
    }
}
