//! Message sends.
//!
//! A send is lowered by the first strategy that applies:
//!
//! 1. `super` inside a method: call through the compile-time superclass
//! 2. `class` (not in typechecker output): the class object itself
//! 3. a known class: direct class-side call, `alloc` becomes `new`
//! 4. `self`: direct call on the receiver
//! 5. an ivar: guarded call
//! 6. any identifier inside a function: guarded call
//! 7. any expression inside a function: evaluated once into a temporary,
//!    then a guarded call
//! 8. otherwise the generic `$oj_oj.msgSend`

use ojc_diagnostic::{CompileError, Warning};
use ojc_ir::ast::{SelectorArgs, SelectorType};
use ojc_ir::{NodeId, NodeKind, Span};

use super::{member, selector_descriptor, Generator, ROOT};
use crate::options::Mode;

impl Generator<'_> {
    pub(super) fn message(&mut self, id: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let NodeKind::MessageExpression {
            receiver,
            selector_name,
            selectors,
        } = ast.kind(id)
        else {
            return Ok(());
        };
        let receiver = *receiver;
        let span = ast.span(id);

        if self.options.warn_unknown_selectors && !self.model.is_known_selector(selector_name) {
            self.warnings
                .push(Warning::unknown_selector(selector_name, span));
        }

        let symbol = self.model.symbols_mut().selector_symbol(selector_name)?;
        let method = member(&symbol);
        let comma = if has_arguments(self, selectors) { "," } else { "" };
        let receiver_name = ast.identifier_name(receiver);

        if receiver_name == Some("super") && self.in_method() {
            let (start, end) = self.super_call(&method, comma, span)?;
            return self.common_replacement(id, receiver, selectors, &start, &end);
        }

        if selector_name == "class" && !self.is_typechecker() {
            if let Some(text) = self.class_of(receiver_name)? {
                self.skip.insert(receiver);
                self.skip.extend(selectors.iter().copied());
                self.modifier.replace(span, text);
                return Ok(());
            }
        }

        if let Some(name) = receiver_name {
            if self.model.class(name).is_some() {
                let reference = self.class_reference(name)?;
                if selector_name == "alloc" {
                    self.skip.insert(receiver);
                    self.skip.extend(selectors.iter().copied());
                    self.modifier.replace(span, format!("new {reference}()"));
                    return Ok(());
                }
                let start = format!("{reference}{method}(");
                return self.common_replacement(id, receiver, selectors, &start, ")");
            }

            if name == "self" && self.in_method() {
                let start = format!("{}{method}(", self.self_or_this());
                return self.common_replacement(id, receiver, selectors, &start, ")");
            }

            if self.is_ivar(name) {
                self.mark_ivar_used(name);
                let ivar = self.ivar_access(name)?;
                let start = self.guarded_call(&ivar, &method);
                return self.common_replacement(id, receiver, selectors, &start, "))");
            }

            if self.in_scope() {
                let resolved = self
                    .resolve_identifier(name, ast.span(receiver))?
                    .unwrap_or_else(|| name.to_string());
                let start = self.guarded_call(&resolved, &method);
                return self.common_replacement(id, receiver, selectors, &start, "))");
            }
        }

        let receiver_span = ast.span(receiver);
        let (first, last) = self.rewrite_selectors(selectors);

        if self.in_scope() {
            let (open, dispatch) = if self.is_typechecker() {
                ("((".to_string(), format!("){method}("))
            } else {
                let temporary = self
                    .scope_mut()
                    .map(|scope| scope.temporary(true))
                    .unwrap_or_default();
                (
                    format!("(({temporary} = ("),
                    format!(")) && {temporary}{method}("),
                )
            };
            self.modifier.replace_between(span, receiver_span, open);
            self.modifier
                .replace(Span::new(receiver_span.end, first.start), dispatch);
            self.modifier.replace(Span::new(last.end, span.end), "))");
            return Ok(());
        }

        tracing::trace!(selector = %selector_name, "generic message send");
        self.modifier
            .replace_between(span, receiver_span, format!("{ROOT}.msgSend("));
        self.modifier.replace(
            Span::new(receiver_span.end, first.start),
            format!(",{}{comma}", selector_descriptor(&symbol)),
        );
        self.modifier.replace(Span::new(last.end, span.end), ")");
        Ok(())
    }

    /// `@selector(name)` becomes a selector descriptor.
    pub(super) fn selector_directive(&mut self, id: NodeId, name: &str) -> Result<(), CompileError> {
        let span = self.ast.span(id);
        if self.options.warn_unknown_selectors && !self.model.is_known_selector(name) {
            self.warnings.push(Warning::unknown_selector(name, span));
        }
        let symbol = self.model.symbols_mut().selector_symbol(name)?;
        self.modifier.replace(span, selector_descriptor(&symbol));
        Ok(())
    }

    /// Call prefix and suffix for a send to `super`.
    fn super_call(
        &mut self,
        method: &str,
        comma: &str,
        span: Span,
    ) -> Result<(String, String), CompileError> {
        let class = self.class_name().unwrap_or_default().to_string();
        let superclass = self
            .model
            .class(&class)
            .and_then(|model_class| model_class.superclass_name.clone())
            .ok_or_else(|| CompileError::no_superclass(&class).at(span))?;
        let (selector_name, selector_type) = match &self.method {
            Some(context) => (context.selector_name.clone(), context.selector_type),
            None => return Err(CompileError::no_superclass(&class).at(span)),
        };

        if self.is_typechecker() {
            let returns_instance = self
                .model
                .class(&class)
                .and_then(|model_class| model_class.method(&selector_name, selector_type))
                .is_some_and(|model_method| model_method.return_type == "instancetype");
            let cast = if returns_instance {
                format!("<{}>", self.model.symbols_mut().class_symbol(&class)?)
            } else {
                String::new()
            };
            return Ok((format!("{cast}self.$oj_super(){method}("), ")".to_string()));
        }

        let prototype = match selector_type {
            SelectorType::Instance => ".prototype",
            SelectorType::Class => "",
        };
        Ok((
            format!(
                "{}{prototype}{method}.call({}{comma}",
                self.class_reference(&superclass)?,
                self.self_or_this()
            ),
            ")".to_string(),
        ))
    }

    /// The class object for `[X class]`, when the receiver allows it.
    fn class_of(&mut self, receiver: Option<&str>) -> Result<Option<String>, CompileError> {
        let Some(name) = receiver else {
            return Ok(None);
        };
        if self.model.class(name).is_some() {
            return self.class_reference(name).map(Some);
        }
        if name == "self" && self.in_method() {
            let receiver = self.self_or_this();
            let is_class_method = self
                .method
                .as_ref()
                .is_some_and(|context| context.selector_type == SelectorType::Class);
            return Ok(Some(if is_class_method {
                receiver.to_string()
            } else {
                format!("{receiver}.constructor")
            }));
        }
        Ok(None)
    }

    /// `(r && r.m(` at runtime, `(r.m(` for the typechecker.
    fn guarded_call(&self, receiver: &str, method: &str) -> String {
        match self.options.mode {
            Mode::Typechecker => format!("({receiver}{method}("),
            Mode::Runtime | Mode::Stripped => format!("({receiver} && {receiver}{method}("),
        }
    }

    /// Replace everything around the selector pieces, dropping the receiver.
    fn common_replacement(
        &mut self,
        id: NodeId,
        receiver: NodeId,
        selectors: &[NodeId],
        start: &str,
        end: &str,
    ) -> Result<(), CompileError> {
        let span = self.ast.span(id);
        self.skip.insert(receiver);
        let (first, last) = self.rewrite_selectors(selectors);
        self.modifier.replace(Span::new(span.start, first.start), start);
        self.modifier.replace(Span::new(last.end, span.end), end);
        Ok(())
    }

    /// Collapse keyword pieces into a flat argument list.
    ///
    /// Returns the span of the first piece and of the last emitted token.
    fn rewrite_selectors(&mut self, selectors: &[NodeId]) -> (Span, Span) {
        let ast = self.ast;
        let mut first = None;
        let mut last = Span::DUMMY;

        for (index, selector) in selectors.iter().enumerate() {
            let span = ast.span(*selector);
            first.get_or_insert(span);
            let NodeKind::MessageSelector { arguments, .. } = ast.kind(*selector) else {
                continue;
            };
            match arguments {
                SelectorArgs::Variadic(arguments) if !arguments.is_empty() => {
                    let first_argument = ast.span(arguments[0]);
                    let last_argument = ast.span(arguments[arguments.len() - 1]);
                    self.modifier
                        .replace(Span::new(span.start, first_argument.start), "[");
                    self.modifier.insert_after(last_argument, "]");
                    last = last_argument;
                }
                SelectorArgs::Single(argument) => {
                    let argument = ast.span(*argument);
                    self.modifier.remove(Span::new(span.start, argument.start));
                    if let Some(next) = selectors.get(index + 1) {
                        self.modifier
                            .replace(Span::new(argument.end, ast.span(*next).start), ",");
                    }
                    last = argument;
                }
                SelectorArgs::Variadic(_) | SelectorArgs::None => {
                    self.modifier.remove(span);
                    self.skip.insert(*selector);
                    last = span;
                }
            }
        }
        (first.unwrap_or(last), last)
    }
}

fn has_arguments(generator: &Generator<'_>, selectors: &[NodeId]) -> bool {
    selectors.iter().any(|selector| {
        matches!(
            generator.ast.kind(*selector),
            NodeKind::MessageSelector {
                arguments: SelectorArgs::Single(_),
                ..
            }
        ) || matches!(
            generator.ast.kind(*selector),
            NodeKind::MessageSelector {
                arguments: SelectorArgs::Variadic(arguments),
                ..
            } if !arguments.is_empty()
        )
    })
}
