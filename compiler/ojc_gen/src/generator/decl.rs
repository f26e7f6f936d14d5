//! Declarations, statements and typed expressions.

use ojc_diagnostic::{CompileError, Warning};
use ojc_ir::{Ast, Control, NodeId, NodeKind, Span};
use ojc_model::build::enum_members;
use ojc_model::Location;

use super::class::REST_PARAMETER;
use super::{Generator, GLOBAL_PREFIX};
use crate::scope::{Scope, ScopeKind};

/// Return annotations belong to their function; everything else is a
/// parameter or variable annotation.
pub(super) fn annotation_location(ast: &Ast, id: NodeId, parent: Option<NodeId>) -> Location {
    match parent.and_then(|parent| ast.kind(parent).as_function()) {
        Some(function) if function.annotation == Some(id) => Location::ImplementationReturn,
        _ => Location::ImplementationParameter,
    }
}

impl Generator<'_> {
    /// Lower an enum that is not inlined to a `var` list.
    pub(super) fn enum_declaration(&mut self, id: NodeId) -> Result<Control, CompileError> {
        let ast = self.ast;
        let span = ast.span(id);
        let NodeKind::EnumDeclaration {
            id: name,
            declarations,
            ..
        } = ast.kind(id)
        else {
            return Ok(Control::Continue);
        };
        let (Some(first), Some(last)) = (declarations.first(), declarations.last()) else {
            self.modifier.remove(span);
            return Ok(Control::Skip);
        };

        let values = enum_members(ast, declarations)?;
        self.skip.extend(*name);
        self.modifier
            .replace(Span::new(span.start, ast.span(*first).start), "var ");

        for (declaration, (_, value)) in declarations.iter().zip(values) {
            let NodeKind::VariableDeclarator { id: member, init } = ast.kind(*declaration) else {
                continue;
            };
            self.skip.insert(*member);
            if init.is_none() {
                self.modifier
                    .insert_after(ast.span(*member), format!(" = {value}"));
            }
        }

        self.modifier
            .replace(Span::new(ast.span(*last).end, span.end), ";");
        Ok(Control::Continue)
    }

    pub(super) fn const_declaration(&mut self, id: NodeId, declarations: &[NodeId]) {
        let span = self.ast.span(id);
        match declarations.first() {
            Some(first) => self
                .modifier
                .replace(Span::new(span.start, self.ast.span(*first).start), "var "),
            None => self.modifier.remove(span),
        }
    }

    /// `@cast(Type, expr)` and `@any(expr)`; `type_name` is `None` for the
    /// latter.
    pub(super) fn cast(
        &mut self,
        id: NodeId,
        type_name: Option<&str>,
        argument: NodeId,
    ) -> Result<(), CompileError> {
        let span = self.ast.span(id);
        let argument = self.ast.span(argument);

        let open = if self.is_typechecker() {
            let output = match type_name {
                Some(type_name) => {
                    let class = self.class_name().map(str::to_string);
                    self.model.symbols_mut().to_typechecker_type(
                        type_name,
                        Location::ImplementationParameter,
                        class.as_deref(),
                    )?
                }
                None => "any".to_string(),
            };
            format!("<{output}>(")
        } else {
            "(".to_string()
        };

        self.modifier
            .replace(Span::new(span.start, argument.start), open);
        self.modifier.replace(Span::new(argument.end, span.end), ")");
        Ok(())
    }

    pub(super) fn type_annotation(
        &mut self,
        id: NodeId,
        location: Location,
    ) -> Result<(), CompileError> {
        let span = self.ast.span(id);
        if !self.is_typechecker() {
            self.modifier.remove(span);
            return Ok(());
        }
        let value = self.ast.annotation_value(id).unwrap_or_default();
        let class = self.class_name().map(str::to_string);
        let output = self
            .model
            .symbols_mut()
            .to_typechecker_type(value, location, class.as_deref())?;
        if output != value {
            self.modifier.replace(span, format!(": {output}"));
        }
        Ok(())
    }

    /// `@each (var x in list) body` becomes a counted `for` loop.
    pub(super) fn each(&mut self, id: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let span = ast.span(id);
        let NodeKind::EachStatement { left, right, body } = ast.kind(id) else {
            return Ok(());
        };

        let (object, mut init) = match ast.kind(*left) {
            NodeKind::VariableDeclaration { declarations } => {
                let binding = declarations.first().and_then(|declaration| {
                    match ast.kind(*declaration) {
                        NodeKind::VariableDeclarator { id, .. } => Some(*id),
                        _ => None,
                    }
                });
                let Some(binding) = binding else {
                    return Err(CompileError::parse("Expected a declaration in @each")
                        .at(ast.span(*left)));
                };
                self.check_restricted(binding)?;
                let object = self.each_binding(binding)?;
                let init = format!("var {object}, ");
                (object, init)
            }
            NodeKind::Identifier { name, .. } => {
                if self.is_ivar(name) {
                    return Err(CompileError::restricted_usage(name, "instance variable")
                        .at(ast.span(*left)));
                }
                (self.each_binding(*left)?, "var ".to_string())
            }
            other => {
                return Err(CompileError::parse(format!(
                    "Unexpected {} on left-hand side of @each",
                    other.name()
                ))
                .at(ast.span(*left)));
            }
        };
        self.skip.insert(*left);

        let Some(scope) = self.scope_mut() else {
            return Ok(());
        };
        let index = scope.temporary(false);
        let length = scope.temporary(false);

        let simple = match ast.identifier_name(*right) {
            Some(name) if !self.is_typechecker() => self.is_plain_identifier(name),
            _ => false,
        };
        let array = if simple {
            ast.identifier_name(*right).unwrap_or_default().to_string()
        } else {
            let array = self
                .scope_mut()
                .map(|scope| scope.temporary(false))
                .unwrap_or_default();
            init.push_str(&format!("{array} = ("));
            array
        };

        let counters =
            format!("{index} = 0, {length} = ({array} ? {array}.length : 0)");
        let test = format!("({index} < {length}) && ({object} = {array}[{index}])");
        let increment = if self.is_typechecker() {
            format!("{index}++, $oj_$EnsureArray({array})")
        } else {
            format!("{index}++")
        };

        let right_span = ast.span(*right);
        let body_span = ast.span(*body);
        if simple {
            self.skip.insert(*right);
            self.modifier.replace(
                Span::new(span.start, body_span.start),
                format!("for ({init}{counters}; {test}; {increment}) "),
            );
        } else {
            self.modifier
                .replace(Span::new(span.start, right_span.start), format!("for ({init}"));
            self.modifier.replace(
                Span::new(right_span.end, body_span.start),
                format!("), {counters}; {test}; {increment}) "),
            );
        }
        Ok(())
    }

    fn each_binding(&mut self, binding: NodeId) -> Result<String, CompileError> {
        let name = self.ast.identifier_name(binding).unwrap_or_default();
        Ok(self
            .resolve_identifier(name, self.ast.span(binding))?
            .unwrap_or_else(|| name.to_string()))
    }

    /// `@global` functions and variables.
    pub(super) fn global(&mut self, id: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let span = ast.span(id);
        let NodeKind::GlobalDeclaration {
            declaration,
            declarators,
        } = ast.kind(id)
        else {
            return Ok(());
        };

        if self.options.warn_global_no_type {
            self.check_global_types(span, *declaration, declarators);
        }

        if let Some(declaration) = declaration {
            let Some(function) = ast.kind(*declaration).as_function() else {
                return Ok(());
            };
            let declaration_span = ast.span(*declaration);
            let Some(function_id) = function.id else {
                return Ok(());
            };
            let name = ast.identifier_name(function_id).unwrap_or_default();
            self.skip.insert(function_id);

            if self.is_typechecker() {
                self.modifier
                    .replace(Span::new(span.start, declaration_span.start), "(");
                self.modifier.insert_after(span, ");");
                if self.options.rewrites_function_parameters() {
                    self.anonymous.insert(*declaration);
                } else {
                    self.modifier.remove(ast.span(function_id));
                }
            } else {
                let symbol = self.global_symbol(name)?;
                self.modifier.replace(
                    Span::new(span.start, declaration_span.start),
                    format!("{GLOBAL_PREFIX}{symbol}="),
                );
                self.modifier.remove(ast.span(function_id));
            }
            return Ok(());
        }

        let Some(first) = declarators.first() else {
            self.modifier.remove(span);
            return Ok(());
        };
        let first_span = ast.span(*first);

        if self.is_typechecker() {
            self.modifier.replace(
                Span::new(span.start, first_span.start),
                "(function() { var ",
            );
            self.modifier.insert_after(span, "});");
        } else {
            self.modifier
                .remove(Span::new(span.start, first_span.start));
        }

        for (index, declarator) in declarators.iter().enumerate() {
            let NodeKind::VariableDeclarator { id: binding, .. } = ast.kind(*declarator) else {
                continue;
            };
            self.skip.insert(*binding);
            let name = ast.identifier_name(*binding).unwrap_or_default();
            let annotation = ast.identifier_annotation(*binding);

            if self.is_typechecker() {
                self.modifier
                    .replace(ast.span(*binding), format!("a{index}"));
                if let Some(annotation) = annotation {
                    self.type_annotation(annotation, Location::ImplementationParameter)?;
                }
            } else {
                let symbol = self.global_symbol(name)?;
                self.modifier
                    .replace(ast.span(*binding), format!("{GLOBAL_PREFIX}{symbol}"));
                if let Some(annotation) = annotation {
                    self.modifier.remove(ast.span(annotation));
                }
            }
        }
        Ok(())
    }

    fn check_global_types(&mut self, span: Span, declaration: Option<NodeId>, declarators: &[NodeId]) {
        let ast = self.ast;
        let (typed, name) = match declaration.and_then(|d| ast.kind(d).as_function()) {
            Some(function) => (
                function.annotation.is_some()
                    && function
                        .params
                        .iter()
                        .all(|param| ast.identifier_annotation(*param).is_some()),
                function.id.and_then(|id| ast.identifier_name(id)),
            ),
            None => {
                let bindings: Vec<NodeId> = declarators
                    .iter()
                    .filter_map(|declarator| match ast.kind(*declarator) {
                        NodeKind::VariableDeclarator { id, .. } => Some(*id),
                        _ => None,
                    })
                    .collect();
                (
                    bindings
                        .iter()
                        .all(|binding| ast.identifier_annotation(*binding).is_some()),
                    bindings.first().and_then(|binding| ast.identifier_name(*binding)),
                )
            }
        };
        if !typed {
            self.warnings.push(Warning::missing_type_annotation(
                name.unwrap_or("@global"),
                span,
            ));
        }
    }

    /// Open a function scope; relaxed typechecker output rewrites the
    /// parameter list so every parameter is optional.
    pub(super) fn enter_function(&mut self, id: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let Some(function) = ast.kind(id).as_function() else {
            return Ok(());
        };
        self.scopes
            .push(Scope::new(id, ScopeKind::Function, false));
        for param in &function.params {
            self.check_restricted(*param)?;
        }

        if !self.options.rewrites_function_parameters() {
            return Ok(());
        }

        let class = self.class_name().map(str::to_string);
        let mut parameters = Vec::with_capacity(function.params.len() + 1);
        for param in &function.params {
            let name = ast.identifier_name(*param).unwrap_or_default();
            let output = match ast
                .identifier_annotation(*param)
                .and_then(|annotation| ast.annotation_value(annotation))
            {
                Some(value) => self.model.symbols_mut().to_typechecker_type(
                    value,
                    Location::ImplementationParameter,
                    class.as_deref(),
                )?,
                None => "any".to_string(),
            };
            parameters.push(format!("{name}? : {output}"));
        }
        parameters.push(REST_PARAMETER.to_string());

        let return_type = match function
            .annotation
            .and_then(|annotation| ast.annotation_value(annotation))
        {
            Some(value) => format!(
                " : {}",
                self.model.symbols_mut().to_typechecker_type(
                    value,
                    Location::ImplementationReturn,
                    class.as_deref(),
                )?
            ),
            None => String::new(),
        };

        let name = match function.id {
            Some(function_id) if !self.anonymous.contains(&id) => {
                ast.identifier_name(function_id).unwrap_or_default()
            }
            _ => "",
        };

        self.skip.extend(function.id);
        self.skip.extend(function.params.iter().copied());
        self.skip.extend(function.annotation);

        let span = ast.span(id);
        self.modifier.replace(
            Span::new(span.start, ast.span(function.body).start),
            format!("function {name}({}){return_type} ", parameters.join(", ")),
        );
        Ok(())
    }
}
