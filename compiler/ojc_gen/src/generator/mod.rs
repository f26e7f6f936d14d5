//! Output generation.
//!
//! The [`Generator`] walks a unit once and queues text edits on a
//! [`Modifier`]; nothing is re-serialized. Rules are dispatched by node kind
//! on the way down. Class, method and function scopes are closed on the way
//! up, which is where temporaries and the captured receiver are hoisted.
//!
//! Rules live in submodules by concern:
//!
//! - `class`: class registration, method headers, property accessors
//! - `message`: message sends and `@selector`
//! - `decl`: enums, consts, globals, `@each`, casts, type annotations and
//!   plain functions

mod class;
mod decl;
mod message;

use std::collections::BTreeSet;

use ojc_diagnostic::{CompileError, Warning};
use ojc_ir::ast::{quote, Literal, SelectorType};
use ojc_ir::{Ast, Control, NodeId, NodeKind, Span, Traverser, Visit};
use ojc_model::symbols::RESERVED_PREFIX;
use ojc_model::symbols::SQUEEZED_PREFIX;
use ojc_model::Model;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::modifier::Modifier;
use crate::options::{Mode, Options};
use crate::scope::{analyze_self_capture, Scope, ScopeKind};

/// Runtime root object.
const ROOT: &str = "$oj_oj";
/// Class-side dispatch table inside a registration closure.
const CLASS_METHODS: &str = "$oj_s";
/// Instance-side dispatch table inside a registration closure.
const INSTANCE_METHODS: &str = "$oj_m";
/// Namespace of `@global` names.
const GLOBAL_PREFIX: &str = "$oj_oj._g.";

/// Words that cannot follow a `.` in the oldest supported engines.
const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "new", "null", "package", "private",
    "protected", "public", "return", "static", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield",
];

/// Result of a generation pass.
#[derive(Clone, Debug)]
pub struct Generation {
    pub code: String,
    pub warnings: Vec<Warning>,
}

struct ClassContext {
    node: NodeId,
    name: String,
}

struct MethodContext {
    selector_name: String,
    selector_type: SelectorType,
    uses_self: bool,
}

pub struct Generator<'a> {
    ast: &'a Ast,
    source: &'a str,
    model: &'a mut Model,
    modifier: Modifier,
    options: &'a Options,
    inlines: FxHashMap<String, String>,
    capturing: FxHashSet<NodeId>,
    /// Nodes already consumed by an enclosing rule.
    skip: FxHashSet<NodeId>,
    /// Functions whose name is dropped when their header is rewritten.
    anonymous: FxHashSet<NodeId>,
    scopes: Vec<Scope>,
    class: Option<ClassContext>,
    method: Option<MethodContext>,
    unused_ivars: Option<BTreeSet<String>>,
    /// Method, class or message nodes already warned about `this`.
    this_warned: FxHashSet<NodeId>,
    warnings: Vec<Warning>,
}

impl<'a> Generator<'a> {
    /// Prepare a generator over a prepared model.
    ///
    /// Builds the inline table and allocates symbols for `@squeeze` names,
    /// so this can fail when the squeezer runs out of indices.
    pub fn new(
        ast: &'a Ast,
        source: &'a str,
        model: &'a mut Model,
        options: &'a Options,
    ) -> Result<Self, CompileError> {
        let mut inlines = FxHashMap::default();

        if options.inlines_enums() {
            let enums = model.enums().to_vec();
            for e in &enums {
                for (member, value) in &e.members {
                    let text = match &e.name {
                        Some(name) if options.is_typechecker() => {
                            format!("{}.{member}", model.symbols_mut().enum_symbol(name)?)
                        }
                        _ => value.to_string(),
                    };
                    inlines.insert(member.clone(), text);
                }
            }
        }

        if options.inlines_consts() {
            for (name, value) in model.consts() {
                inlines
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        for (name, value) in &options.additional_inlines {
            inlines.insert(name.clone(), value.to_source());
        }

        if options.squeezes() {
            let names: Vec<String> = model.squeezed_names().iter().cloned().collect();
            for name in names {
                model.symbols_mut().identifier_symbol(&name)?;
            }
        }

        Ok(Generator {
            ast,
            source,
            model,
            modifier: Modifier::new(),
            options,
            inlines,
            capturing: analyze_self_capture(ast),
            skip: FxHashSet::default(),
            anonymous: FxHashSet::default(),
            scopes: Vec::new(),
            class: None,
            method: None,
            unused_ivars: None,
            this_warned: FxHashSet::default(),
            warnings: Vec::new(),
        })
    }

    /// Queue every rewrite for the unit.
    #[tracing::instrument(level = "debug", skip_all, fields(mode = ?self.options.mode))]
    pub fn generate(&mut self) -> Result<(), CompileError> {
        let ast = self.ast;
        self.scopes = vec![Scope::new(ast.root(), ScopeKind::Program, false)];
        Traverser::new(ast).traverse(self)
    }

    /// Warnings collected so far, including those preceding a hard error.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Apply the queued edits.
    pub fn finish(self) -> Result<Generation, CompileError> {
        tracing::debug!(edits = self.modifier.len(), "applying edits");
        let code = self.modifier.finish(self.source)?;
        Ok(Generation {
            code,
            warnings: self.warnings,
        })
    }

    fn is_typechecker(&self) -> bool {
        self.options.mode == Mode::Typechecker
    }

    fn class_name(&self) -> Option<&str> {
        self.class.as_ref().map(|c| c.name.as_str())
    }

    /// Inside a method of a known class.
    fn in_method(&self) -> bool {
        self.method.is_some() && self.class.is_some()
    }

    /// Inside a method or plain function body.
    fn in_scope(&self) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.kind != ScopeKind::Program)
    }

    fn scope_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    /// How the current method refers to its receiver.
    fn self_or_this(&self) -> &'static str {
        let captured = self.method.as_ref().is_some_and(|m| m.uses_self);
        if captured || self.is_typechecker() {
            "self"
        } else {
            "this"
        }
    }

    fn is_ivar(&self, name: &str) -> bool {
        self.in_method()
            && self
                .class_name()
                .and_then(|class| self.model.class(class))
                .is_some_and(|class| class.is_ivar(name))
    }

    fn mark_ivar_used(&mut self, name: &str) {
        if let Some(unused) = &mut self.unused_ivars {
            unused.remove(name);
        }
    }

    /// `self.<ivar symbol>` or `this.<ivar symbol>`.
    fn ivar_access(&mut self, ivar: &str) -> Result<String, CompileError> {
        let class = self.class_name().unwrap_or_default().to_string();
        let symbol = self.model.symbols_mut().ivar_symbol(&class, ivar)?;
        Ok(format!("{}.{symbol}", self.self_or_this()))
    }

    /// Expression evaluating to a class's constructor.
    fn class_reference(&mut self, class: &str) -> Result<String, CompileError> {
        match self.options.mode {
            Mode::Runtime => Ok(format!(
                "{ROOT}._cls.{}",
                self.model.symbols_mut().class_symbol(class)?
            )),
            Mode::Typechecker => self.model.symbols_mut().class_symbol(class),
            Mode::Stripped => Ok(class.to_string()),
        }
    }

    fn global_symbol(&mut self, name: &str) -> Result<String, CompileError> {
        if self.options.squeezes() {
            return self.model.symbols_mut().identifier_symbol(name);
        }
        Ok(name.to_string())
    }

    /// Replacement text for an identifier reference, `None` when it stays.
    ///
    /// Resolution order: globals, then `self` and ivars inside a method,
    /// then inlines, then squeezed names.
    fn resolve_identifier(
        &mut self,
        name: &str,
        span: Span,
    ) -> Result<Option<String>, CompileError> {
        if self.model.is_global(name) {
            let symbol = self.global_symbol(name)?;
            return Ok(Some(format!("{GLOBAL_PREFIX}{symbol}")));
        }

        if self.in_method() {
            if name == "self" {
                return Ok(Some(self.self_or_this().to_string()));
            }
            if self.is_ivar(name) {
                self.mark_ivar_used(name);
                return self.ivar_access(name).map(Some);
            }
            if self.options.warn_unknown_ivars && name.len() > 1 && name.starts_with('_') {
                self.warnings.push(Warning::undeclared_ivar(name, span));
            }
        }

        if let Some(text) = self.inlines.get(name) {
            return Ok(Some(text.clone()));
        }

        if self.options.squeezes() {
            if let Some(symbol) = self.model.symbols().squeezed_identifier(name) {
                return Ok(Some(symbol.to_string()));
            }
        }
        Ok(None)
    }

    /// An identifier that resolves to itself.
    fn is_plain_identifier(&self, name: &str) -> bool {
        !(self.model.is_global(name)
            || (self.in_method() && (name == "self" || self.is_ivar(name)))
            || self.inlines.contains_key(name)
            || (self.options.squeezes() && self.model.symbols().squeezed_identifier(name).is_some()))
    }

    /// Reject binding an ivar, global or inlined name.
    fn check_restricted(&self, id: NodeId) -> Result<(), CompileError> {
        let Some(name) = self.ast.identifier_name(id) else {
            return Ok(());
        };
        let span = self.ast.span(id);
        if self.is_ivar(name) {
            return Err(CompileError::restricted_usage(name, "instance variable").at(span));
        }
        if self.inlines.contains_key(name) || self.model.is_global(name) {
            return Err(CompileError::restricted_usage(name, "compiler-inlined name").at(span));
        }
        Ok(())
    }

    fn identifier(&mut self, id: NodeId, name: &str, parent: Option<NodeId>) -> Result<(), CompileError> {
        let span = self.ast.span(id);
        if name.starts_with(RESERVED_PREFIX) || name.starts_with(SQUEEZED_PREFIX) {
            return Err(CompileError::reserved_namespace(name).at(span));
        }
        if !is_transformable(self.ast, id, parent) {
            return Ok(());
        }
        if let Some(text) = self.resolve_identifier(name, span)? {
            if text != name {
                self.modifier.replace(span, text);
            }
        }
        Ok(())
    }

    fn predefined_macro(&mut self, id: NodeId, name: &str) -> Result<(), CompileError> {
        let span = self.ast.span(id);
        let text = match name {
            "@CLASS" => {
                let class = self.class_name().ok_or_else(|| {
                    CompileError::macro_out_of_context(name, "a class implementation").at(span)
                })?;
                quote(class)
            }
            "@SEL" | "@FUNCTION" => {
                let (Some(class), Some(method)) = (self.class_name(), self.method.as_ref()) else {
                    return Err(
                        CompileError::macro_out_of_context(name, "a method definition").at(span)
                    );
                };
                if name == "@SEL" {
                    quote(&method.selector_name)
                } else {
                    quote(&format!(
                        "{}[{class} {}]",
                        method.selector_type.sigil(),
                        method.selector_name
                    ))
                }
            }
            _ => return Err(CompileError::unknown_macro(name).at(span)),
        };
        self.modifier.replace(span, text);
        Ok(())
    }

    fn literal(&mut self, id: NodeId, literal: &Literal) {
        if !matches!(literal, Literal::Null | Literal::Bool(_)) {
            return;
        }
        let span = self.ast.span(id);
        let normalized = literal.to_source();
        if self.text(span) != Some(normalized.as_str()) {
            self.modifier.replace(span, normalized);
        }
    }

    fn text(&self, span: Span) -> Option<&'a str> {
        self.source.get(span.to_range())
    }

    fn this_expression(&mut self, id: NodeId, path: &[NodeId]) {
        if !self.options.warn_this_in_methods {
            return;
        }
        for ancestor in path.iter().rev() {
            match self.ast.kind(*ancestor) {
                NodeKind::MethodDefinition { .. }
                | NodeKind::ClassImplementation { .. }
                | NodeKind::MessageExpression { .. } => {
                    if self.this_warned.insert(*ancestor) {
                        self.warnings.push(Warning::this_in_method(self.ast.span(id)));
                    }
                    return;
                }
                NodeKind::FunctionDeclaration(_) | NodeKind::FunctionExpression(_) => return,
                _ => {}
            }
        }
    }

    fn object_expression(&mut self, id: NodeId, properties: &[NodeId]) {
        if !self.options.loosens_object_literals() {
            return;
        }
        let span = self.ast.span(id);
        match properties.first() {
            None => self.modifier.replace(span, "<any>{}"),
            Some(first) => self
                .modifier
                .replace_between(span, self.ast.span(*first), "<any>{"),
        }
    }

    fn array_expression(&mut self, id: NodeId, elements: &[Option<NodeId>]) {
        if self.options.warn_empty_array_element && elements.iter().any(Option::is_none) {
            self.warnings
                .push(Warning::empty_array_element(self.ast.span(id)));
        }
    }

    /// Close the innermost scope if it belongs to `node`, hoisting its
    /// declaration ahead of the first statement of `body`.
    fn close_scope(&mut self, node: NodeId, body: NodeId) {
        if self.scopes.last().map(|scope| scope.node) != Some(node) {
            return;
        }
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        let capture_self =
            scope.kind == ScopeKind::Method && scope.needs_self_capture && !self.is_typechecker();
        let Some(declaration) = scope.hoisted_declaration(capture_self) else {
            return;
        };
        if let NodeKind::BlockStatement { body: statements } = self.ast.kind(body) {
            if let Some(first) = statements.first() {
                self.modifier
                    .insert_before(self.ast.span(*first), declaration);
            }
        }
    }
}

impl Visit for Generator<'_> {
    type Error = CompileError;

    fn enter(&mut self, ast: &Ast, id: NodeId, path: &[NodeId]) -> Result<Control, CompileError> {
        if self.skip.contains(&id) {
            return Ok(Control::Skip);
        }
        let span = ast.span(id);

        match ast.kind(id) {
            NodeKind::ProtocolDefinition { .. }
            | NodeKind::ClassDirective { .. }
            | NodeKind::SqueezeDirective { .. }
            | NodeKind::IvarBlock { .. }
            | NodeKind::SynthesizeDirective { .. }
            | NodeKind::DynamicDirective { .. }
            | NodeKind::TypedefDeclaration { .. } => {
                self.modifier.remove(span);
                return Ok(Control::Skip);
            }
            NodeKind::EnumDeclaration { .. } if self.options.inlines_enums() => {
                self.modifier.remove(span);
                return Ok(Control::Skip);
            }
            NodeKind::ConstDeclaration { .. } if self.options.inlines_consts() => {
                self.modifier.remove(span);
                return Ok(Control::Skip);
            }

            NodeKind::ClassImplementation { .. } => self.enter_class(id)?,
            NodeKind::MethodDefinition { .. } => self.enter_method(id)?,
            NodeKind::MessageExpression { .. } => self.message(id)?,
            NodeKind::PropertyDirective { .. } => {
                self.property(id)?;
                return Ok(Control::Skip);
            }
            NodeKind::SelectorDirective { name } => self.selector_directive(id, name)?,
            NodeKind::EnumDeclaration { .. } => return self.enum_declaration(id),
            NodeKind::ConstDeclaration { declarations } => self.const_declaration(id, declarations),
            NodeKind::CastExpression {
                type_name,
                argument,
            } => self.cast(id, Some(type_name.as_str()), *argument)?,
            NodeKind::AnyExpression { argument } => self.cast(id, None, *argument)?,
            NodeKind::TypeAnnotation { .. } => {
                let location = decl::annotation_location(ast, id, path.last().copied());
                self.type_annotation(id, location)?;
            }
            NodeKind::EachStatement { .. } => self.each(id)?,
            NodeKind::GlobalDeclaration { .. } => self.global(id)?,
            NodeKind::PredefinedMacro { name } => self.predefined_macro(id, name)?,
            NodeKind::Literal(literal) => self.literal(id, literal),
            NodeKind::Identifier { name, .. } => self.identifier(id, name, path.last().copied())?,
            NodeKind::VariableDeclaration { declarations } => {
                for declaration in declarations {
                    if let NodeKind::VariableDeclarator { id: binding, .. } = ast.kind(*declaration) {
                        self.check_restricted(*binding)?;
                    }
                }
            }
            NodeKind::ThisExpression => self.this_expression(id, path),
            NodeKind::ObjectExpression { properties } => self.object_expression(id, properties),
            NodeKind::ArrayExpression { elements } => self.array_expression(id, elements),
            NodeKind::FunctionDeclaration(_) | NodeKind::FunctionExpression(_) => {
                self.enter_function(id)?;
            }
            NodeKind::DebuggerStatement => {
                if self.options.warn_debugger {
                    self.warnings.push(Warning::debugger_statement(span));
                }
            }
            _ => {}
        }
        Ok(Control::Continue)
    }

    fn exit(&mut self, ast: &Ast, id: NodeId, _path: &[NodeId]) -> Result<(), CompileError> {
        match ast.kind(id) {
            NodeKind::ClassImplementation { .. } => self.exit_class(id),
            NodeKind::MethodDefinition { body, .. } => {
                self.close_scope(id, *body);
                self.method = None;
            }
            NodeKind::FunctionDeclaration(function) | NodeKind::FunctionExpression(function) => {
                self.close_scope(id, function.body);
            }
            _ => {}
        }
        Ok(())
    }
}

/// Whether an identifier is a reference rather than a property name.
fn is_transformable(ast: &Ast, id: NodeId, parent: Option<NodeId>) -> bool {
    match parent.map(|parent| ast.kind(parent)) {
        Some(NodeKind::MemberExpression {
            object, computed, ..
        }) => *object == id || *computed,
        Some(NodeKind::Property {
            value, computed, ..
        }) => *value == id || *computed,
        _ => true,
    }
}

/// `.name`, or `["name"]` for reserved words.
fn member(symbol: &str) -> String {
    if RESERVED_WORDS.contains(&symbol) {
        format!("[{}]", quote(symbol))
    } else {
        format!(".{symbol}")
    }
}

/// Selector descriptor object, `{ sym: 1 }`.
fn selector_descriptor(symbol: &str) -> String {
    if RESERVED_WORDS.contains(&symbol) {
        format!("{{ {}: 1 }}", quote(symbol))
    } else {
        format!("{{ {symbol}: 1 }}")
    }
}
