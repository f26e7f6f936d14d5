//! Classes and their members.
//!
//! A class owns its ivars, properties and two method tables keyed by
//! selector name. Duplicate checks happen on insertion; accessor synthesis
//! runs later, from [`Model::prepare`](crate::Model::prepare), once every
//! hand-written method is known.

mod property;

use std::collections::BTreeMap;

use ojc_diagnostic::CompileError;
use ojc_ir::ast::SelectorType;
use serde::{Deserialize, Serialize};

pub use property::{Property, PropertyFlags, Synthesis};

use crate::{Ivar, Method};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    pub superclass_name: Option<String>,
    /// Declared by `@class` only.
    pub forward: bool,
    /// Created by a category before the primary class was seen.
    pub placeholder: bool,
    /// Declared in this compile rather than loaded from a parent.
    #[serde(skip, default)]
    pub local: bool,
    ivars: BTreeMap<String, Ivar>,
    properties: BTreeMap<String, Property>,
    class_methods: BTreeMap<String, Method>,
    instance_methods: BTreeMap<String, Method>,
}

impl Class {
    pub fn new(name: impl Into<String>, superclass_name: Option<String>) -> Self {
        Class {
            name: name.into(),
            superclass_name,
            forward: false,
            placeholder: false,
            local: true,
            ivars: BTreeMap::new(),
            properties: BTreeMap::new(),
            class_methods: BTreeMap::new(),
            instance_methods: BTreeMap::new(),
        }
    }

    pub fn forward(name: impl Into<String>) -> Self {
        Class {
            forward: true,
            ..Class::new(name, None)
        }
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Class {
            placeholder: true,
            ..Class::new(name, None)
        }
    }

    pub fn add_ivar(&mut self, ivar: Ivar) -> Result<(), CompileError> {
        if self.ivars.contains_key(&ivar.name) {
            return Err(CompileError::duplicate_ivar(&self.name, &ivar.name));
        }
        self.ivars.insert(ivar.name.clone(), ivar);
        Ok(())
    }

    pub fn add_property(&mut self, property: Property) -> Result<(), CompileError> {
        if self.properties.contains_key(&property.name) {
            return Err(CompileError::duplicate_property(&self.name, &property.name));
        }
        self.properties.insert(property.name.clone(), property);
        Ok(())
    }

    /// Add a method. A hand-written method replaces a synthesized one of the
    /// same selector; a synthesized method never replaces a hand-written one.
    pub fn add_method(&mut self, method: Method) -> Result<(), CompileError> {
        if let Some(existing) = self.method(&method.selector_name, method.selector_type) {
            if method.synthesized {
                return Ok(());
            }
            if !existing.synthesized {
                return Err(CompileError::duplicate_method(&self.name, &method.signature()));
            }
        }
        self.insert_method(method);
        Ok(())
    }

    /// Store `method`, replacing any entry with the same selector and kind.
    pub(crate) fn insert_method(&mut self, method: Method) {
        let map = match method.selector_type {
            SelectorType::Class => &mut self.class_methods,
            SelectorType::Instance => &mut self.instance_methods,
        };
        map.insert(method.selector_name.clone(), method);
    }

    /// `@synthesize name` / `@synthesize name = ivar`.
    pub fn make_property_synthesized(
        &mut self,
        name: &str,
        ivar: Option<&str>,
    ) -> Result<(), CompileError> {
        let Some(property) = self.properties.get_mut(name) else {
            return Err(CompileError::unknown_property(&self.name, name));
        };
        match property.synthesis {
            Synthesis::Dynamic => return Err(CompileError::property_already_dynamic(name)),
            Synthesis::Explicit => return Err(CompileError::property_already_synthesized(name)),
            Synthesis::Automatic => {}
        }
        property.synthesis = Synthesis::Explicit;
        property.ivar = Some(ivar.unwrap_or(name).to_string());
        Ok(())
    }

    /// `@dynamic name`.
    pub fn make_property_dynamic(&mut self, name: &str) -> Result<(), CompileError> {
        let Some(property) = self.properties.get_mut(name) else {
            return Err(CompileError::unknown_property(&self.name, name));
        };
        match property.synthesis {
            Synthesis::Dynamic => return Err(CompileError::property_already_dynamic(name)),
            Synthesis::Explicit => return Err(CompileError::property_already_synthesized(name)),
            Synthesis::Automatic => {}
        }
        property.synthesis = Synthesis::Dynamic;
        property.ivar = None;
        Ok(())
    }

    /// Decide backing ivars and accessors for every property.
    ///
    /// Accessors are generated only where no hand-written method with the
    /// same selector exists. Running this twice is harmless.
    pub fn do_automatic_synthesis(&mut self) -> Result<(), CompileError> {
        let mut claimed: BTreeMap<String, String> = BTreeMap::new();
        let names: Vec<String> = self.properties.keys().cloned().collect();

        for name in names {
            let Some(property) = self.properties.get_mut(&name) else {
                continue;
            };

            if property.synthesis == Synthesis::Dynamic {
                property.generates_getter = false;
                property.generates_setter = false;
                continue;
            }

            let ivar_name = property
                .ivar
                .get_or_insert_with(|| format!("_{name}"))
                .clone();
            if let Some(first) = claimed.insert(ivar_name.clone(), name.clone()) {
                return Err(CompileError::ivar_already_claimed(&ivar_name, &first, &name));
            }

            let type_name = property.type_name.clone();
            let getter = property.getter.clone();
            let setter = property.setter.clone();

            let generates_getter = !self.has_handwritten(&getter);
            let generates_setter = setter.as_ref().is_some_and(|s| !self.has_handwritten(s));

            if !self.ivars.contains_key(&ivar_name) {
                let mut ivar = Ivar::new(ivar_name.clone(), self.name.clone(), type_name.clone());
                ivar.synthesized = true;
                self.ivars.insert(ivar_name, ivar);
            }

            if generates_getter {
                let mut method =
                    Method::new(getter, SelectorType::Instance, type_name.clone(), vec![], vec![]);
                method.synthesized = true;
                self.add_method(method)?;
            }
            if let (true, Some(setter)) = (generates_setter, setter) {
                let mut method = Method::new(
                    setter,
                    SelectorType::Instance,
                    "void",
                    vec![type_name],
                    vec!["arg".to_string()],
                );
                method.synthesized = true;
                self.add_method(method)?;
            }

            if let Some(property) = self.properties.get_mut(&name) {
                property.generates_getter = generates_getter;
                property.generates_setter = generates_setter;
            }
        }
        Ok(())
    }

    fn has_handwritten(&self, selector: &str) -> bool {
        self.instance_methods
            .get(selector)
            .is_some_and(|m| !m.synthesized)
    }

    pub fn ivar(&self, name: &str) -> Option<&Ivar> {
        self.ivars.get(name)
    }

    pub fn is_ivar(&self, name: &str) -> bool {
        self.ivars.contains_key(name)
    }

    /// Ivars in name order.
    pub fn ivars(&self) -> impl Iterator<Item = &Ivar> {
        self.ivars.values()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Properties in name order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn method(&self, selector: &str, selector_type: SelectorType) -> Option<&Method> {
        match selector_type {
            SelectorType::Class => self.class_methods.get(selector),
            SelectorType::Instance => self.instance_methods.get(selector),
        }
    }

    pub fn class_methods(&self) -> impl Iterator<Item = &Method> {
        self.class_methods.values()
    }

    pub fn instance_methods(&self) -> impl Iterator<Item = &Method> {
        self.instance_methods.values()
    }

    pub fn all_methods(&self) -> impl Iterator<Item = &Method> {
        self.class_methods
            .values()
            .chain(self.instance_methods.values())
    }

    /// Ivars not backing any property, in name order.
    pub fn ivar_names_without_properties(&self) -> Vec<String> {
        self.ivars
            .keys()
            .filter(|ivar| {
                !self
                    .properties
                    .values()
                    .any(|p| p.ivar.as_deref() == Some(ivar.as_str()))
            })
            .cloned()
            .collect()
    }
}
