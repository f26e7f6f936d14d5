//! Output symbols and typechecker types.
//!
//! Every class, ivar, selector and squeezed identifier reaches the output
//! through the [`SymbolTyper`]. Two policies exist:
//!
//! - **verbatim**: a readable symbol derived directly from the source name,
//!   with enough escaping to stay collision-free.
//! - **squeezed**: a short symbol allocated from a monotonically increasing
//!   counter. Allocations are recorded in a table keyed by kind and source
//!   name, so the same name maps to the same symbol for the rest of the
//!   compile and, once the table is persisted and reloaded, across compiles.
//!
//! The typer is an explicit session object owned by the [`Model`](crate::Model);
//! nothing about allocation is process-global.

use std::collections::BTreeMap;

use ojc_diagnostic::CompileError;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::is_base_object_selector;

/// Prefix reserved for everything the compiler emits.
pub const RESERVED_PREFIX: &str = "$oj_";

/// Prefix of squeezed symbols.
pub const SQUEEZED_PREFIX: &str = "$oj$";

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_$";

/// Where a type appears, which decides how `instancetype` resolves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    ImplementationReturn,
    ImplementationParameter,
    DeclarationReturn,
    DeclarationParameter,
}

impl Location {
    pub const fn is_return(self) -> bool {
        matches!(
            self,
            Location::ImplementationReturn | Location::DeclarationReturn
        )
    }
}

/// Persisted allocation table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolState {
    pub entries: BTreeMap<String, String>,
    pub next_index: u32,
}

#[derive(Clone, Debug, Default)]
pub struct SymbolTyper {
    squeeze: bool,
    end_index: Option<u32>,
    next_index: u32,
    table: BTreeMap<String, String>,
    types: FxHashMap<String, String>,
    classes: FxHashSet<String>,
}

impl SymbolTyper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable squeezing. Allocation resumes at `start_index` or
    /// after the last loaded allocation, whichever is later.
    pub fn configure_squeeze(&mut self, squeeze: bool, start_index: u32, end_index: Option<u32>) {
        self.squeeze = squeeze;
        self.end_index = end_index;
        self.next_index = self.next_index.max(start_index);
    }

    pub fn squeezes(&self) -> bool {
        self.squeeze
    }

    pub fn load_state(&mut self, state: SymbolState) {
        self.table.extend(state.entries);
        self.next_index = self.next_index.max(state.next_index);
    }

    pub fn save_state(&self) -> SymbolState {
        SymbolState {
            entries: self.table.clone(),
            next_index: self.next_index,
        }
    }

    /// Install the resolved type table and the set of class names.
    pub fn bind_types<'a>(
        &mut self,
        types: &BTreeMap<String, String>,
        classes: impl IntoIterator<Item = &'a String>,
    ) {
        self.types = types
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.classes = classes.into_iter().cloned().collect();
    }

    pub fn class_symbol(&mut self, class: &str) -> Result<String, CompileError> {
        if self.squeeze {
            return self.squeezed(format!("c:{class}"));
        }
        Ok(format!("{RESERVED_PREFIX}c_{class}"))
    }

    pub fn ivar_symbol(&mut self, class: &str, ivar: &str) -> Result<String, CompileError> {
        if self.squeeze {
            return self.squeezed(format!("i:{class}.{ivar}"));
        }
        Ok(format!(
            "{RESERVED_PREFIX}i_{}$_{}",
            escape_dollar(class),
            escape_dollar(ivar)
        ))
    }

    /// Base-object selectors keep their plain names; everything else is
    /// prefixed (or squeezed) so user selectors never shadow runtime fields.
    pub fn selector_symbol(&mut self, selector: &str) -> Result<String, CompileError> {
        if is_base_object_selector(selector) {
            return Ok(selector.replace(':', "_"));
        }
        if self.squeeze {
            return self.squeezed(format!("s:{selector}"));
        }
        let mut out = format!("{RESERVED_PREFIX}f_");
        for ch in selector.chars() {
            match ch {
                '$' => out.push_str("$$"),
                '_' => out.push_str("$_"),
                ':' => out.push('_'),
                c => out.push(c),
            }
        }
        Ok(out)
    }

    pub fn enum_symbol(&mut self, name: &str) -> Result<String, CompileError> {
        if self.squeeze {
            return self.squeezed(format!("e:{name}"));
        }
        Ok(format!("{RESERVED_PREFIX}e_{name}"))
    }

    /// Symbol for a global or `@squeeze` identifier, allocating if needed.
    pub fn identifier_symbol(&mut self, name: &str) -> Result<String, CompileError> {
        if self.squeeze {
            return self.squeezed(format!("g:{name}"));
        }
        Ok(name.to_string())
    }

    /// Previously allocated symbol for a plain identifier, if any.
    pub fn squeezed_identifier(&self, name: &str) -> Option<&str> {
        if !self.squeeze {
            return None;
        }
        self.table.get(&format!("g:{name}")).map(String::as_str)
    }

    /// Translate a source type name into the typechecker dialect.
    ///
    /// `class` is the enclosing class, substituted for `instancetype` in
    /// return locations. Unknown names pass through unchanged.
    pub fn to_typechecker_type(
        &mut self,
        name: &str,
        location: Location,
        class: Option<&str>,
    ) -> Result<String, CompileError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok("any".to_string());
        }
        if let Some(inner) = name.strip_suffix("[]") {
            return Ok(format!("{}[]", self.to_typechecker_type(inner, location, class)?));
        }

        match name {
            "id" | "Class" => return Ok("any".to_string()),
            "void" => return Ok("void".to_string()),
            "SEL" => return Ok(format!("{RESERVED_PREFIX}$SEL")),
            "instancetype" => {
                return match class {
                    Some(class) if location.is_return() => self.class_symbol(class),
                    _ => Ok("any".to_string()),
                };
            }
            _ => {}
        }

        let resolved = self
            .types
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string());

        Ok(match resolved.as_str() {
            "Number" => "number".to_string(),
            "Boolean" => "boolean".to_string(),
            "String" => "string".to_string(),
            "Symbol" => "symbol".to_string(),
            "Array" => "any[]".to_string(),
            "Object" => "any".to_string(),
            other if self.classes.contains(other) => self.class_symbol(other)?,
            _ => resolved,
        })
    }

    fn squeezed(&mut self, key: String) -> Result<String, CompileError> {
        if let Some(symbol) = self.table.get(&key) {
            return Ok(symbol.clone());
        }
        if let Some(end) = self.end_index {
            if self.next_index >= end {
                return Err(CompileError::squeezer_reached_end_index(end));
            }
        }
        let symbol = format!("{SQUEEZED_PREFIX}{}", encode_index(self.next_index));
        self.next_index += 1;
        tracing::trace!(%key, %symbol, "allocated squeezed symbol");
        self.table.insert(key, symbol.clone());
        Ok(symbol)
    }
}

/// Positional encoding of `index` over [`ALPHABET`].
fn encode_index(mut index: u32) -> String {
    let base = ALPHABET.len() as u32;
    let mut digits = Vec::new();
    loop {
        digits.push(ALPHABET[(index % base) as usize] as char);
        index /= base;
        if index == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

fn escape_dollar(name: &str) -> String {
    name.replace('$', "$$")
}

#[cfg(test)]
mod tests;
