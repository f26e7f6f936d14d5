//! Protocols.

use std::collections::BTreeMap;

use ojc_diagnostic::CompileError;
use ojc_ir::ast::SelectorType;
use serde::{Deserialize, Serialize};

use crate::Method;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub name: String,
    /// Declared in this compile rather than loaded from a parent.
    #[serde(skip, default)]
    pub local: bool,
    class_methods: BTreeMap<String, Method>,
    instance_methods: BTreeMap<String, Method>,
}

impl Protocol {
    pub fn new(name: impl Into<String>) -> Self {
        Protocol {
            name: name.into(),
            local: true,
            class_methods: BTreeMap::new(),
            instance_methods: BTreeMap::new(),
        }
    }

    pub fn add_method(&mut self, method: Method) -> Result<(), CompileError> {
        let map = match method.selector_type {
            SelectorType::Class => &mut self.class_methods,
            SelectorType::Instance => &mut self.instance_methods,
        };
        if map.contains_key(&method.selector_name) {
            return Err(CompileError::duplicate_method(&self.name, &method.signature()));
        }
        map.insert(method.selector_name.clone(), method);
        Ok(())
    }

    pub fn all_methods(&self) -> impl Iterator<Item = &Method> {
        self.class_methods
            .values()
            .chain(self.instance_methods.values())
    }
}
