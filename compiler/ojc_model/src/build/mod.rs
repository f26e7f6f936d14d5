//! Populate a [`Model`] from a parsed unit.
//!
//! The builder records declarations only; it never touches output text.
//! Class bodies are checked here: only methods, property directives and
//! plain declarations with literal or function initializers may appear.

use ojc_diagnostic::CompileError;
use ojc_ir::ast::{Literal, MethodSignature};
use ojc_ir::{Ast, Control, NodeId, NodeKind, Traverser, Visit};

use crate::{is_reserved_selector, Class, Enum, Ivar, Method, Model, Property, Protocol};

pub struct Builder<'a> {
    ast: &'a Ast,
    model: &'a mut Model,
}

impl<'a> Builder<'a> {
    pub fn new(ast: &'a Ast, model: &'a mut Model) -> Self {
        Builder { ast, model }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(nodes = self.ast.len()))]
    pub fn build(&mut self) -> Result<(), CompileError> {
        let ast = self.ast;
        Traverser::new(ast).traverse(self)
    }

    fn add_class_implementation(&mut self, node: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let NodeKind::ClassImplementation {
            id,
            superclass,
            category,
            ivar_block,
            body,
        } = ast.kind(node)
        else {
            return Ok(());
        };

        let name = identifier(ast, *id)?;
        let superclass_name = superclass
            .map(|s| identifier(ast, s).map(str::to_string))
            .transpose()?;

        if category.is_some() {
            if let Some(block) = ivar_block {
                return Err(CompileError::parse(format!(
                    "Category of '{name}' may not declare instance variables"
                ))
                .at(ast.span(*block)));
            }

            let mut scratch = Class::placeholder(name);
            self.populate_body(&mut scratch, *body)?;

            match self.model.class_mut(name) {
                Some(existing) => {
                    for method in scratch.all_methods() {
                        existing.add_method(method.clone())?;
                    }
                    for property in scratch.properties() {
                        existing.add_property(property.clone())?;
                    }
                }
                None => {
                    tracing::debug!(class = %name, "category precedes class; adding placeholder");
                    self.model.add_class(scratch)?;
                }
            }
            return Ok(());
        }

        let mut class = Class::new(name, superclass_name);
        if let Some(block) = ivar_block {
            if let NodeKind::IvarBlock { declarations } = ast.kind(*block) {
                for declaration in declarations {
                    let NodeKind::IvarDeclaration { type_name, names } = ast.kind(*declaration)
                    else {
                        continue;
                    };
                    for ivar in names {
                        let ivar_name = identifier(ast, *ivar)?;
                        class
                            .add_ivar(Ivar::new(ivar_name, name, type_name.clone()))
                            .map_err(|e| e.at(ast.span(*ivar)))?;
                    }
                }
            }
        }
        self.populate_body(&mut class, *body)?;
        self.model.add_class(class).map_err(|e| e.at(ast.span(node)))
    }

    fn populate_body(&mut self, class: &mut Class, body: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let NodeKind::ClassBody { body: items } = ast.kind(body) else {
            return Ok(());
        };

        for item in items {
            let span = ast.span(*item);
            match ast.kind(*item) {
                NodeKind::MethodDefinition { signature, .. } => {
                    if is_reserved_selector(&signature.selector_name) {
                        return Err(
                            CompileError::reserved_method_name(&signature.selector_name).at(span)
                        );
                    }
                    class
                        .add_method(method_from_signature(ast, signature)?)
                        .map_err(|e| e.at(span))?;
                }
                NodeKind::PropertyDirective {
                    attributes,
                    type_name,
                    id,
                } => {
                    let name = identifier(ast, *id)?;
                    class
                        .add_property(Property::new(name, type_name.clone(), attributes))
                        .map_err(|e| e.at(span))?;
                }
                NodeKind::VariableDeclaration { declarations } => {
                    for declaration in declarations {
                        check_class_level_initializer(ast, *declaration)?;
                    }
                }
                NodeKind::SynthesizeDirective { .. }
                | NodeKind::DynamicDirective { .. }
                | NodeKind::FunctionDeclaration(_)
                | NodeKind::EmptyStatement => {}
                other => {
                    return Err(CompileError::parse(format!(
                        "Unexpected {} in class implementation",
                        other.name()
                    ))
                    .at(span));
                }
            }
        }

        // Directives may precede the properties they name.
        for item in items {
            let span = ast.span(*item);
            match ast.kind(*item) {
                NodeKind::SynthesizeDirective { pairs } => {
                    for pair in pairs {
                        class
                            .make_property_synthesized(&pair.property, pair.ivar.as_deref())
                            .map_err(|e| e.at(span))?;
                    }
                }
                NodeKind::DynamicDirective { names } => {
                    for name in names {
                        class.make_property_dynamic(name).map_err(|e| e.at(span))?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn add_protocol(&mut self, node: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let NodeKind::ProtocolDefinition { id, body } = ast.kind(node) else {
            return Ok(());
        };
        let mut protocol = Protocol::new(identifier(ast, *id)?);
        for item in body {
            if let NodeKind::MethodDeclaration {
                signature,
                optional,
            } = ast.kind(*item)
            {
                let mut method = method_from_signature(ast, signature)?;
                method.optional = *optional;
                protocol
                    .add_method(method)
                    .map_err(|e| e.at(ast.span(*item)))?;
            }
        }
        self.model
            .add_protocol(protocol)
            .map_err(|e| e.at(ast.span(node)))
    }

    fn add_enum(&mut self, node: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let NodeKind::EnumDeclaration {
            id,
            unsigned,
            declarations,
        } = ast.kind(node)
        else {
            return Ok(());
        };
        let name = id
            .map(|id| identifier(ast, id).map(str::to_string))
            .transpose()?;
        let members = enum_members(ast, declarations)?;
        self.model
            .add_enum(Enum::new(name, *unsigned, members))
            .map_err(|e| e.at(ast.span(node)))
    }

    fn add_consts(&mut self, declarations: &[NodeId]) -> Result<(), CompileError> {
        let ast = self.ast;
        for declaration in declarations {
            let NodeKind::VariableDeclarator { id, init } = ast.kind(*declaration) else {
                continue;
            };
            let name = identifier(ast, *id)?;
            let value = init
                .and_then(|init| literal_source(ast, init))
                .ok_or_else(|| {
                    CompileError::non_literal_const(name).at(ast.span(*declaration))
                })?;
            self.model.add_const(name, value);
        }
        Ok(())
    }

    fn add_globals(&mut self, declaration: Option<NodeId>, declarators: &[NodeId]) {
        let ast = self.ast;
        if let Some(function) = declaration.and_then(|d| ast.kind(d).as_function()) {
            if let Some(name) = function.id.and_then(|id| ast.identifier_name(id)) {
                self.model.add_global(name);
            }
        }
        for declarator in declarators {
            if let NodeKind::VariableDeclarator { id, .. } = ast.kind(*declarator) {
                if let Some(name) = ast.identifier_name(*id) {
                    self.model.add_global(name);
                }
            }
        }
    }
}

impl Visit for Builder<'_> {
    type Error = CompileError;

    fn enter(&mut self, ast: &Ast, id: NodeId, _path: &[NodeId]) -> Result<Control, CompileError> {
        match ast.kind(id) {
            NodeKind::ClassImplementation { .. } => {
                self.add_class_implementation(id)?;
                Ok(Control::Skip)
            }
            NodeKind::ProtocolDefinition { .. } => {
                self.add_protocol(id)?;
                Ok(Control::Skip)
            }
            NodeKind::ClassDirective { names } => {
                for name in names {
                    self.model
                        .add_class(Class::forward(name.clone()))
                        .map_err(|e| e.at(ast.span(id)))?;
                }
                Ok(Control::Skip)
            }
            NodeKind::EnumDeclaration { .. } => {
                self.add_enum(id)?;
                Ok(Control::Skip)
            }
            NodeKind::ConstDeclaration { declarations } => {
                self.add_consts(declarations)?;
                Ok(Control::Skip)
            }
            NodeKind::GlobalDeclaration {
                declaration,
                declarators,
            } => {
                self.add_globals(*declaration, declarators);
                Ok(Control::Continue)
            }
            NodeKind::TypedefDeclaration { from, to } => {
                self.model
                    .alias_type(from, to)
                    .map_err(|e| e.at(ast.span(id)))?;
                Ok(Control::Skip)
            }
            NodeKind::SqueezeDirective { names } => {
                for name in names {
                    self.model.add_squeezed(name.clone());
                }
                Ok(Control::Skip)
            }
            _ => Ok(Control::Continue),
        }
    }
}

/// Member values of an enum in declaration order.
///
/// Members without an initializer take the previous value plus one,
/// starting at zero.
pub fn enum_members(ast: &Ast, declarations: &[NodeId]) -> Result<Vec<(String, i64)>, CompileError> {
    let mut members = Vec::with_capacity(declarations.len());
    let mut next = 0i64;
    for declaration in declarations {
        let NodeKind::VariableDeclarator { id, init } = ast.kind(*declaration) else {
            continue;
        };
        let name = identifier(ast, *id)?;
        let value = match init {
            Some(init) => enum_value(ast, *init, name)?,
            None => next,
        };
        next = value.saturating_add(1);
        members.push((name.to_string(), value));
    }
    Ok(members)
}

fn enum_value(ast: &Ast, init: NodeId, member: &str) -> Result<i64, CompileError> {
    let span = ast.span(init);
    match ast.kind(init) {
        NodeKind::Literal(Literal::Number(raw)) => {
            parse_integer(raw).ok_or_else(|| CompileError::non_integer_enum(member).at(span))
        }
        NodeKind::UnaryExpression { operator, argument } if operator == "-" => {
            match ast.kind(*argument) {
                NodeKind::Literal(Literal::Number(raw)) => parse_integer(raw)
                    .map(|v| -v)
                    .ok_or_else(|| CompileError::non_integer_enum(member).at(span)),
                _ => Err(CompileError::non_literal_enum(member).at(span)),
            }
        }
        NodeKind::Literal(_) => Err(CompileError::non_integer_enum(member).at(span)),
        _ => Err(CompileError::non_literal_enum(member).at(span)),
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    raw.parse().ok()
}

/// Source text of a literal initializer, `None` when it is not a literal.
pub fn literal_source(ast: &Ast, init: NodeId) -> Option<String> {
    match ast.kind(init) {
        NodeKind::Literal(literal) => Some(literal.to_source()),
        NodeKind::UnaryExpression { operator, argument } if operator == "-" => {
            match ast.kind(*argument) {
                NodeKind::Literal(Literal::Number(raw)) => Some(format!("-{raw}")),
                _ => None,
            }
        }
        _ => None,
    }
}

fn check_class_level_initializer(ast: &Ast, declaration: NodeId) -> Result<(), CompileError> {
    let NodeKind::VariableDeclarator { id, init } = ast.kind(declaration) else {
        return Ok(());
    };
    let Some(init) = init else {
        return Ok(());
    };
    match ast.kind(*init) {
        NodeKind::FunctionExpression(_) => Ok(()),
        _ if literal_source(ast, *init).is_some() => Ok(()),
        _ => Err(
            CompileError::non_constant_initializer(ast.identifier_name(*id).unwrap_or_default())
                .at(ast.span(declaration)),
        ),
    }
}

/// Model method for a definition or declaration header.
pub fn method_from_signature(
    ast: &Ast,
    signature: &MethodSignature,
) -> Result<Method, CompileError> {
    let return_type = signature
        .return_type
        .and_then(|t| ast.annotation_value(t))
        .unwrap_or("id");

    let mut parameter_types = Vec::new();
    let mut variable_names = Vec::new();
    for selector in &signature.selectors {
        let NodeKind::MethodSelector {
            variable,
            param_type,
            ..
        } = ast.kind(*selector)
        else {
            continue;
        };
        if let Some(variable) = variable {
            variable_names.push(identifier(ast, *variable)?.to_string());
            parameter_types.push(
                param_type
                    .and_then(|t| ast.annotation_value(t))
                    .unwrap_or("id")
                    .to_string(),
            );
        }
    }

    Ok(Method::new(
        signature.selector_name.clone(),
        signature.selector_type,
        return_type,
        parameter_types,
        variable_names,
    ))
}

fn identifier(ast: &Ast, id: NodeId) -> Result<&str, CompileError> {
    ast.identifier_name(id).ok_or_else(|| {
        CompileError::parse(format!("Expected identifier, found {}", ast.kind(id).name()))
            .at(ast.span(id))
    })
}

#[cfg(test)]
mod tests;
