//! The model registry.
//!
//! # Lifecycle
//!
//! 1. [`Model::new`] registers the base types and their aliases.
//! 2. [`Model::load_state`] merges a parent compile's snapshot; merged
//!    classes and protocols are marked non-local.
//! 3. `add_*`, [`Model::register_type`] and [`Model::alias_type`] record
//!    local declarations, rejecting duplicates immediately.
//! 4. [`Model::prepare`] checks the class and type hierarchies for cycles,
//!    synthesizes accessors, collects the selector set and resolves aliases.
//!    After this the type map and selector set do not change.
//! 5. [`Model::save_state`] snapshots everything for dependent compiles.

use std::collections::{BTreeMap, BTreeSet};

use ojc_diagnostic::CompileError;
use ojc_ir::ast::SelectorType;

use crate::base::{BASE_TYPES, BOOLEAN_ALIASES, NUMBER_ALIASES};
use crate::{Class, Enum, Method, ModelState, Protocol, SymbolTyper, BASE_OBJECT_SELECTORS};

#[derive(Clone, Debug)]
pub struct Model {
    classes: BTreeMap<String, Class>,
    protocols: BTreeMap<String, Protocol>,
    /// Const name → literal source text.
    consts: BTreeMap<String, String>,
    enums: Vec<Enum>,
    globals: BTreeSet<String>,
    squeezed: BTreeSet<String>,
    /// Type name → canonical type name.
    types: BTreeMap<String, String>,
    selectors: BTreeSet<String>,
    symbols: SymbolTyper,
    prepared: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        let mut types = BTreeMap::new();
        for base in BASE_TYPES {
            types.insert((*base).to_string(), (*base).to_string());
        }
        for alias in BOOLEAN_ALIASES {
            types.insert((*alias).to_string(), "Boolean".to_string());
        }
        for alias in NUMBER_ALIASES {
            types.insert((*alias).to_string(), "Number".to_string());
        }

        Model {
            classes: BTreeMap::new(),
            protocols: BTreeMap::new(),
            consts: BTreeMap::new(),
            enums: Vec::new(),
            globals: BTreeSet::new(),
            squeezed: BTreeSet::new(),
            types,
            selectors: BTreeSet::new(),
            symbols: SymbolTyper::new(),
            prepared: false,
        }
    }

    /// Merge a parent compile's snapshot.
    #[tracing::instrument(level = "debug", skip_all, fields(classes = state.classes.len()))]
    pub fn load_state(&mut self, state: ModelState) {
        self.enums.extend(state.enums);
        self.consts.extend(state.consts);
        self.types.extend(state.types);
        self.selectors.extend(state.selectors);
        self.globals.extend(state.globals);
        self.squeezed.extend(state.squeezed);

        for mut class in state.classes {
            class.local = false;
            self.classes.insert(class.name.clone(), class);
        }
        for mut protocol in state.protocols {
            protocol.local = false;
            self.protocols.insert(protocol.name.clone(), protocol);
        }

        self.symbols.load_state(state.symbols);
    }

    pub fn save_state(&self) -> ModelState {
        ModelState {
            classes: self.classes.values().cloned().collect(),
            protocols: self.protocols.values().cloned().collect(),
            consts: self.consts.clone(),
            enums: self.enums.clone(),
            types: self.types.clone(),
            selectors: self.selectors.clone(),
            globals: self.globals.clone(),
            squeezed: self.squeezed.clone(),
            symbols: self.symbols.save_state(),
        }
    }

    /// Register a class, resolving forward declarations and category
    /// placeholders.
    pub fn add_class(&mut self, class: Class) -> Result<(), CompileError> {
        let name = class.name.clone();

        let Some(existing) = self.classes.get(&name) else {
            self.register_type(&name)?;
            self.classes.insert(name, class);
            return Ok(());
        };

        if class.forward {
            return Ok(());
        }

        if existing.forward {
            self.classes.insert(name.clone(), class);
            return self.register_type(&name);
        }

        if existing.placeholder {
            tracing::debug!(class = %name, "replacing category placeholder");
            let mut class = class;
            if let Some(placeholder) = self.classes.remove(&name) {
                for method in placeholder.all_methods() {
                    class.add_method(method.clone())?;
                }
                for property in placeholder.properties() {
                    class.add_property(property.clone())?;
                }
            }
            self.classes.insert(name.clone(), class);
            return self.register_type(&name);
        }

        Err(CompileError::duplicate_class(&name))
    }

    pub fn add_protocol(&mut self, protocol: Protocol) -> Result<(), CompileError> {
        if self.protocols.contains_key(&protocol.name) {
            return Err(CompileError::duplicate_protocol(&protocol.name));
        }
        self.protocols.insert(protocol.name.clone(), protocol);
        Ok(())
    }

    pub fn add_const(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.consts.insert(name.into(), value.into());
    }

    /// Add an enum; a named enum becomes an alias of `Number`.
    pub fn add_enum(&mut self, e: Enum) -> Result<(), CompileError> {
        if let Some(name) = &e.name {
            if self.enums.iter().any(|other| other.name.as_ref() == Some(name)) {
                return Err(CompileError::duplicate_enum(name));
            }
            self.alias_type("Number", name)?;
        }
        self.enums.push(e);
        Ok(())
    }

    pub fn add_global(&mut self, name: impl Into<String>) {
        self.globals.insert(name.into());
    }

    /// Record a `@squeeze` name.
    pub fn add_squeezed(&mut self, name: impl Into<String>) {
        self.squeezed.insert(name.into());
    }

    /// Register a canonical type. Re-registering the same name is a no-op;
    /// a name already aliased elsewhere is an error.
    pub fn register_type(&mut self, name: &str) -> Result<(), CompileError> {
        if let Some(current) = self.types.get(name) {
            if current != name {
                return Err(CompileError::type_already_exists(name));
            }
        }
        self.types.insert(name.to_string(), name.to_string());
        Ok(())
    }

    /// Make `alias` resolve to `existing`.
    pub fn alias_type(&mut self, existing: &str, alias: &str) -> Result<(), CompileError> {
        if let Some(current) = self.types.get(alias) {
            if current != existing {
                return Err(CompileError::type_already_exists(alias));
            }
        }
        self.types.insert(alias.to_string(), existing.to_string());
        Ok(())
    }

    /// Validate and freeze the model.
    #[tracing::instrument(level = "debug", skip_all, fields(classes = self.classes.len()))]
    pub fn prepare(&mut self) -> Result<(), CompileError> {
        self.check_class_hierarchy()?;

        for class in self.classes.values_mut() {
            class.do_automatic_synthesis()?;
        }

        let mut selectors = BTreeSet::new();
        for method in self.classes.values().flat_map(Class::all_methods) {
            selectors.insert(method.selector_name.clone());
        }
        for method in self.protocols.values().flat_map(Protocol::all_methods) {
            selectors.insert(method.selector_name.clone());
        }
        selectors.extend(BASE_OBJECT_SELECTORS.iter().map(|s| (*s).to_string()));
        self.selectors.extend(selectors);

        self.types = self.resolve_types()?;
        self.symbols.bind_types(&self.types, self.classes.keys());
        self.prepared = true;
        Ok(())
    }

    fn check_class_hierarchy(&self) -> Result<(), CompileError> {
        for (name, class) in &self.classes {
            let mut visited = vec![name.clone()];
            let mut superclass = class
                .superclass_name
                .as_ref()
                .and_then(|s| self.classes.get(s));

            while let Some(current) = superclass {
                if visited.contains(&current.name) {
                    visited.push(current.name.clone());
                    return Err(CompileError::circular_class_hierarchy(&visited));
                }
                visited.push(current.name.clone());
                superclass = current
                    .superclass_name
                    .as_ref()
                    .and_then(|s| self.classes.get(s));
            }
        }
        Ok(())
    }

    fn resolve_types(&self) -> Result<BTreeMap<String, String>, CompileError> {
        let mut resolved = BTreeMap::new();
        for (key, value) in &self.types {
            if key == value {
                resolved.insert(key.clone(), value.clone());
                continue;
            }

            let mut visited = vec![key.clone()];
            let mut result = key.clone();
            while let Some(next) = self.types.get(&result) {
                if *next == result {
                    break;
                }
                result.clone_from(next);
                if visited.contains(&result) {
                    visited.push(result);
                    return Err(CompileError::circular_type_hierarchy(&visited));
                }
                visited.push(result.clone());
            }
            resolved.insert(key.clone(), result);
        }
        Ok(resolved)
    }

    /// A synthetic class merging every class's methods by selector.
    ///
    /// Where two classes disagree on a parameter or return type, that
    /// position widens to `any`. Parameters are renamed `a0`, `a1`, ...
    pub fn aggregate_class(&self) -> Class {
        let mut class_map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut instance_map: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for class in self.classes.values() {
            merge_method_types(class.class_methods(), &mut class_map);
            merge_method_types(class.instance_methods(), &mut instance_map);
        }

        let mut result = Class::new("", None);
        for (selector_type, map) in [
            (SelectorType::Class, class_map),
            (SelectorType::Instance, instance_map),
        ] {
            for (selector, mut types) in map {
                let return_type = types.remove(0);
                let variable_names = (0..types.len()).map(|i| format!("a{i}")).collect();
                let method = Method::new(selector, selector_type, return_type, types, variable_names);
                result.insert_method(method);
            }
        }
        result
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut Class> {
        self.classes.get_mut(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    pub fn protocol(&self, name: &str) -> Option<&Protocol> {
        self.protocols.get(name)
    }

    pub fn protocols(&self) -> impl Iterator<Item = &Protocol> {
        self.protocols.values()
    }

    pub fn consts(&self) -> &BTreeMap<String, String> {
        &self.consts
    }

    pub fn enums(&self) -> &[Enum] {
        &self.enums
    }

    pub fn globals(&self) -> &BTreeSet<String> {
        &self.globals
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    pub fn squeezed_names(&self) -> &BTreeSet<String> {
        &self.squeezed
    }

    pub fn types(&self) -> &BTreeMap<String, String> {
        &self.types
    }

    /// Canonical form of a type name; unknown names resolve to themselves.
    pub fn resolved_type<'a>(&'a self, name: &'a str) -> &'a str {
        self.types.get(name).map_or(name, String::as_str)
    }

    pub fn is_numeric_type(&self, name: &str) -> bool {
        self.resolved_type(name) == "Number"
    }

    pub fn is_boolean_type(&self, name: &str) -> bool {
        self.resolved_type(name) == "Boolean"
    }

    pub fn is_known_selector(&self, selector: &str) -> bool {
        self.selectors.contains(selector)
    }

    pub fn selectors(&self) -> &BTreeSet<String> {
        &self.selectors
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn symbols(&self) -> &SymbolTyper {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTyper {
        &mut self.symbols
    }
}

fn merge_method_types<'a>(
    methods: impl Iterator<Item = &'a Method>,
    map: &mut BTreeMap<String, Vec<String>>,
) {
    for method in methods {
        let mut types = Vec::with_capacity(method.parameter_types.len() + 1);
        types.push(method.return_type.clone());
        types.extend(method.parameter_types.iter().cloned());

        match map.get_mut(&method.selector_name) {
            None => {
                map.insert(method.selector_name.clone(), types);
            }
            Some(existing) => {
                for (slot, ty) in existing.iter_mut().zip(&types) {
                    if slot != ty {
                        *slot = "any".to_string();
                    }
                }
            }
        }
    }
}
