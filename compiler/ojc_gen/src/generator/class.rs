//! Class implementations, method definitions and property accessors.

use std::collections::BTreeSet;

use ojc_diagnostic::{CompileError, Warning};
use ojc_ir::ast::SelectorType;
use ojc_ir::{NodeId, NodeKind};
use ojc_model::{is_reserved_selector, Location};

use super::{
    member, ClassContext, Generator, MethodContext, CLASS_METHODS, INSTANCE_METHODS, ROOT,
};
use crate::options::Mode;
use crate::scope::{Scope, ScopeKind};

/// Rest parameter appended to relaxed typechecker signatures.
pub(super) const REST_PARAMETER: &str = "...$oj_rest";

impl Generator<'_> {
    pub(super) fn enter_class(&mut self, id: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let NodeKind::ClassImplementation {
            id: name_id,
            superclass,
            category,
            ivar_block,
            body,
        } = ast.kind(id)
        else {
            return Ok(());
        };

        let name = ast.identifier_name(*name_id).unwrap_or_default().to_string();
        let superclass_name = superclass
            .and_then(|superclass| ast.identifier_name(superclass))
            .map(str::to_string);
        self.skip.insert(*name_id);
        self.skip.extend(*superclass);

        self.unused_ivars = if category.is_none() && self.options.warn_unused_ivars {
            self.model
                .class(&name)
                .map(|class| class.ivar_names_without_properties().into_iter().collect())
        } else {
            None
        };

        let (opener, closer) = match self.options.mode {
            Mode::Typechecker => (
                format!("var $oj_unused = function({CLASS_METHODS} : any, {INSTANCE_METHODS} : any) {{ "),
                "}".to_string(),
            ),
            Mode::Runtime | Mode::Stripped if category.is_some() => {
                let symbol = self.model.symbols_mut().class_symbol(&name)?;
                (
                    format!(
                        "{ROOT}._registerCategory({{ {symbol}:1 }}, function({CLASS_METHODS}, {INSTANCE_METHODS}) {{ "
                    ),
                    "});".to_string(),
                )
            }
            Mode::Runtime | Mode::Stripped => {
                let symbol = self.model.symbols_mut().class_symbol(&name)?;
                let super_descriptor = match &superclass_name {
                    Some(superclass) => format!(
                        "{{ {}:1 }}",
                        self.model.symbols_mut().class_symbol(superclass)?
                    ),
                    None => "null".to_string(),
                };
                let call_super = match &superclass_name {
                    Some(superclass) => format!("{}.call(this);", self.class_reference(superclass)?),
                    None => String::new(),
                };
                let ivars = self.ivar_initializers(&name)?;
                (
                    format!(
                        "var {name} = {ROOT}._registerClass({{ {symbol}:1 }}, {super_descriptor}, \
                         function({CLASS_METHODS}, {INSTANCE_METHODS}) {{ \
                         function {name}() {{ {call_super}{ivars}\
                         this.constructor = {name};this.$oj_id = ++{ROOT}._id;}}"
                    ),
                    format!("return {name};}});"),
                )
            }
        };

        let span = ast.span(id);
        let body_span = ast.span(*body);
        let first = ivar_block.map_or(body_span, |block| ast.span(block));
        self.modifier.replace_between(span, first, opener);
        self.modifier.replace_between(body_span, span, closer);

        self.class = Some(ClassContext { node: id, name });
        Ok(())
    }

    pub(super) fn exit_class(&mut self, id: NodeId) {
        if self.class.as_ref().map(|class| class.node) != Some(id) {
            return;
        }
        if let Some(unused) = self.unused_ivars.take() {
            let span = self.ast.span(id);
            for name in unused {
                self.warnings.push(Warning::unused_ivar(&name, span));
            }
        }
        self.class = None;
    }

    /// Constructor statements zeroing every ivar, bucketed by type.
    fn ivar_initializers(&mut self, class: &str) -> Result<String, CompileError> {
        let mut objects = BTreeSet::new();
        let mut numbers = BTreeSet::new();
        let mut booleans = BTreeSet::new();
        if let Some(model_class) = self.model.class(class) {
            for ivar in model_class.ivars() {
                let bucket = if self.model.is_numeric_type(&ivar.type_name) {
                    &mut numbers
                } else if self.model.is_boolean_type(&ivar.type_name) {
                    &mut booleans
                } else {
                    &mut objects
                };
                bucket.insert(ivar.name.clone());
            }
        }

        let mut out = String::new();
        for (names, zero) in [(objects, "null"), (numbers, "0"), (booleans, "false")] {
            if names.is_empty() {
                continue;
            }
            for name in &names {
                let symbol = self.model.symbols_mut().ivar_symbol(class, name)?;
                out.push_str("this.");
                out.push_str(&symbol);
                out.push('=');
            }
            out.push_str(zero);
            out.push(';');
        }
        Ok(out)
    }

    pub(super) fn enter_method(&mut self, id: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let NodeKind::MethodDefinition { signature, body } = ast.kind(id) else {
            return Ok(());
        };
        let span = ast.span(id);
        if is_reserved_selector(&signature.selector_name) {
            return Err(CompileError::reserved_method_name(&signature.selector_name).at(span));
        }

        let needs_capture = self.capturing.contains(&id);
        self.scopes
            .push(Scope::new(id, ScopeKind::Method, needs_capture));
        self.method = Some(MethodContext {
            selector_name: signature.selector_name.clone(),
            selector_type: signature.selector_type,
            uses_self: needs_capture,
        });

        self.skip.extend(signature.return_type);
        self.skip.extend(signature.selectors.iter().copied());

        let mut parameters = Vec::new();
        for selector in &signature.selectors {
            let NodeKind::MethodSelector {
                variable: Some(variable),
                param_type,
                ..
            } = ast.kind(*selector)
            else {
                continue;
            };
            self.check_restricted(*variable)?;
            let name = ast.identifier_name(*variable).unwrap_or_default();
            let type_name = param_type.and_then(|annotation| ast.annotation_value(annotation));
            parameters.push((name, type_name));
        }

        let table = match signature.selector_type {
            SelectorType::Class => CLASS_METHODS,
            SelectorType::Instance => INSTANCE_METHODS,
        };
        let symbol = self
            .model
            .symbols_mut()
            .selector_symbol(&signature.selector_name)?;

        let header = if self.is_typechecker() {
            let class = self.class_name().unwrap_or_default().to_string();
            let class_symbol = self.model.symbols_mut().class_symbol(&class)?;
            let self_type = match signature.selector_type {
                SelectorType::Class => format!("typeof {class_symbol}"),
                SelectorType::Instance => class_symbol,
            };
            let relaxed = self.options.rewrites_function_parameters();

            let mut arguments = vec![format!("self : {self_type}")];
            for (name, type_name) in parameters {
                let output = self.model.symbols_mut().to_typechecker_type(
                    type_name.unwrap_or("id"),
                    Location::ImplementationParameter,
                    Some(&class),
                )?;
                let optional = if relaxed { "?" } else { "" };
                arguments.push(format!("{name}{optional} : {output}"));
            }
            if relaxed {
                arguments.push(REST_PARAMETER.to_string());
            }

            let return_type = self
                .model
                .class(&class)
                .and_then(|model_class| {
                    model_class.method(&signature.selector_name, signature.selector_type)
                })
                .map_or_else(|| "id".to_string(), |method| method.return_type.clone());
            let output = self.model.symbols_mut().to_typechecker_type(
                &return_type,
                Location::ImplementationReturn,
                Some(&class),
            )?;
            format!(
                "{table}{} = function({}) : {output} ",
                member(&symbol),
                arguments.join(", ")
            )
        } else {
            let names: Vec<&str> = parameters.iter().map(|(name, _)| *name).collect();
            format!("{table}{} = function({}) ", member(&symbol), names.join(", "))
        };

        let body_span = ast.span(*body);
        self.modifier.replace_between(span, body_span, header);
        self.modifier.remove_between(body_span, span);
        Ok(())
    }

    /// Emit synthesized accessors for a `@property`, or drop it.
    pub(super) fn property(&mut self, id: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let span = ast.span(id);
        let NodeKind::PropertyDirective { id: name_id, .. } = ast.kind(id) else {
            return Ok(());
        };
        if self.is_typechecker() {
            self.modifier.remove(span);
            return Ok(());
        }

        let class = self.class_name().unwrap_or_default().to_string();
        let property = ast
            .identifier_name(*name_id)
            .and_then(|name| self.model.class(&class)?.property(name))
            .cloned();

        let mut out = String::new();
        if let Some(property) = property {
            if let Some(ivar) = &property.ivar {
                let ivar_symbol = self.model.symbols_mut().ivar_symbol(&class, ivar)?;
                if let (true, Some(setter)) = (property.generates_setter, &property.setter) {
                    let symbol = self.model.symbols_mut().selector_symbol(setter)?;
                    out.push_str(&format!(
                        "{INSTANCE_METHODS}{} = function(arg) {{ this.{ivar_symbol} = arg; }} ; ",
                        member(&symbol)
                    ));
                }
                if property.generates_getter {
                    let symbol = self.model.symbols_mut().selector_symbol(&property.getter)?;
                    out.push_str(&format!(
                        "{INSTANCE_METHODS}{} = function() {{ return this.{ivar_symbol}; }} ; ",
                        member(&symbol)
                    ));
                }
            }
        }

        self.modifier.replace(span, out);
        Ok(())
    }
}
