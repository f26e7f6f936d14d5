//! Arena construction helpers.
//!
//! The parser front end is external; this builder is what it, and the test
//! suites, use to lay nodes into an arena. Spans are located by searching the
//! source text so hand-built trees stay aligned with the text they describe.

use crate::ast::{
    Function, Literal, MethodSignature, Node, NodeKind, SelectorArgs, SelectorType,
};
use crate::{Ast, NodeId, Span};

/// Incremental arena builder bound to one source text.
pub struct AstBuilder<'src> {
    source: &'src str,
    nodes: Vec<Node>,
}

impl<'src> AstBuilder<'src> {
    pub fn new(source: &'src str) -> Self {
        AstBuilder {
            source,
            nodes: Vec::new(),
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Span of the first occurrence of `needle`.
    ///
    /// # Panics
    /// Panics if `needle` does not occur in the source.
    pub fn find(&self, needle: &str) -> Span {
        self.find_nth(needle, 0)
    }

    /// Span of the `n`th (zero-based) occurrence of `needle`.
    ///
    /// # Panics
    /// Panics if there are fewer than `n + 1` occurrences.
    pub fn find_nth(&self, needle: &str, n: usize) -> Span {
        let Some((offset, _)) = self.source.match_indices(needle).nth(n) else {
            panic!("`{needle}` occurrence {n} not found in source");
        };
        to_span(offset, offset + needle.len())
    }

    /// Span of the first occurrence of `needle` at or after `from`.
    ///
    /// # Panics
    /// Panics if `needle` does not occur after `from`.
    pub fn find_after(&self, needle: &str, from: Span) -> Span {
        let start = from.start as usize;
        let Some(offset) = self.source[start..].find(needle) else {
            panic!("`{needle}` not found after {from}");
        };
        to_span(start + offset, start + offset + needle.len())
    }

    /// Span running from the start of `first` to the end of the first
    /// `last` that follows it.
    pub fn range(&self, first: &str, last: &str) -> Span {
        let start = self.find(first);
        let end = self.find_after(last, Span::point(start.end));
        start.merge(end)
    }

    pub fn text(&self, span: Span) -> &'src str {
        &self.source[span.to_range()]
    }

    /// Span of a node pushed earlier.
    pub fn span_of(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    /// Append a node.
    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_raw(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        });
        id
    }

    /// Identifier named by the text under `span`.
    pub fn ident(&mut self, span: Span) -> NodeId {
        let name = self.text(span).to_string();
        self.push(
            NodeKind::Identifier {
                name,
                annotation: None,
            },
            span,
        )
    }

    /// Identifier followed by a `: Type` annotation.
    pub fn typed_ident(&mut self, span: Span, annotation: Span) -> NodeId {
        let annotation = self.annotation(annotation);
        let name = self.text(span).to_string();
        self.push(
            NodeKind::Identifier {
                name,
                annotation: Some(annotation),
            },
            span,
        )
    }

    /// Type annotation; the value is the text after any leading colon.
    pub fn annotation(&mut self, span: Span) -> NodeId {
        let value = self
            .text(span)
            .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim()
            .to_string();
        self.push(NodeKind::TypeAnnotation { value }, span)
    }

    /// Numeric literal as written.
    pub fn number(&mut self, span: Span) -> NodeId {
        let raw = self.text(span).to_string();
        self.push(NodeKind::Literal(Literal::Number(raw)), span)
    }

    /// String literal; the span includes the quotes.
    pub fn string(&mut self, span: Span) -> NodeId {
        let text = self.text(span);
        let value = text
            .get(1..text.len().saturating_sub(1))
            .unwrap_or_default()
            .to_string();
        self.push(NodeKind::Literal(Literal::String(value)), span)
    }

    pub fn literal(&mut self, span: Span, literal: Literal) -> NodeId {
        self.push(NodeKind::Literal(literal), span)
    }

    pub fn this(&mut self, span: Span) -> NodeId {
        self.push(NodeKind::ThisExpression, span)
    }

    pub fn expr_stmt(&mut self, span: Span, expression: NodeId) -> NodeId {
        self.push(NodeKind::ExpressionStatement { expression }, span)
    }

    pub fn block(&mut self, span: Span, body: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::BlockStatement { body }, span)
    }

    pub fn ret(&mut self, span: Span, argument: Option<NodeId>) -> NodeId {
        self.push(NodeKind::ReturnStatement { argument }, span)
    }

    pub fn var(&mut self, span: Span, declarations: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::VariableDeclaration { declarations }, span)
    }

    pub fn declarator(&mut self, span: Span, id: NodeId, init: Option<NodeId>) -> NodeId {
        self.push(NodeKind::VariableDeclarator { id, init }, span)
    }

    pub fn assign(&mut self, span: Span, left: NodeId, right: NodeId) -> NodeId {
        self.push(
            NodeKind::AssignmentExpression {
                operator: "=".to_string(),
                left,
                right,
            },
            span,
        )
    }

    pub fn binary(&mut self, span: Span, operator: &str, left: NodeId, right: NodeId) -> NodeId {
        self.push(
            NodeKind::BinaryExpression {
                operator: operator.to_string(),
                left,
                right,
            },
            span,
        )
    }

    pub fn call(&mut self, span: Span, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::CallExpression { callee, arguments }, span)
    }

    pub fn member(&mut self, span: Span, object: NodeId, property: NodeId) -> NodeId {
        self.push(
            NodeKind::MemberExpression {
                object,
                property,
                computed: false,
            },
            span,
        )
    }

    pub fn function_expr(&mut self, span: Span, params: Vec<NodeId>, body: NodeId) -> NodeId {
        self.push(
            NodeKind::FunctionExpression(Function {
                id: None,
                params,
                annotation: None,
                body,
            }),
            span,
        )
    }

    pub fn function_decl(
        &mut self,
        span: Span,
        id: NodeId,
        params: Vec<NodeId>,
        annotation: Option<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.push(
            NodeKind::FunctionDeclaration(Function {
                id: Some(id),
                params,
                annotation,
                body,
            }),
            span,
        )
    }

    /// `@implementation Name : Super { ivars } body @end`.
    pub fn class(
        &mut self,
        span: Span,
        id: NodeId,
        superclass: Option<NodeId>,
        ivar_block: Option<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.push(
            NodeKind::ClassImplementation {
                id,
                superclass,
                category: None,
                ivar_block,
                body,
            },
            span,
        )
    }

    pub fn category(&mut self, span: Span, id: NodeId, category: &str, body: NodeId) -> NodeId {
        self.push(
            NodeKind::ClassImplementation {
                id,
                superclass: None,
                category: Some(category.to_string()),
                ivar_block: None,
                body,
            },
            span,
        )
    }

    pub fn class_body(&mut self, span: Span, body: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::ClassBody { body }, span)
    }

    pub fn ivar_block(&mut self, span: Span, declarations: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::IvarBlock { declarations }, span)
    }

    pub fn ivar_decl(&mut self, span: Span, type_name: &str, names: Vec<NodeId>) -> NodeId {
        self.push(
            NodeKind::IvarDeclaration {
                type_name: type_name.to_string(),
                names,
            },
            span,
        )
    }

    pub fn property(&mut self, span: Span, type_name: &str, id: NodeId) -> NodeId {
        self.push(
            NodeKind::PropertyDirective {
                attributes: Vec::new(),
                type_name: type_name.to_string(),
                id,
            },
            span,
        )
    }

    /// Method definition; the selector name is joined from the pieces.
    pub fn method(
        &mut self,
        span: Span,
        selector_type: SelectorType,
        return_type: Option<NodeId>,
        selectors: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        let selector_name = self.selector_name_of(&selectors);
        self.push(
            NodeKind::MethodDefinition {
                signature: MethodSignature {
                    selector_type,
                    selector_name,
                    return_type,
                    selectors,
                },
                body,
            },
            span,
        )
    }

    /// Method selector piece; `name` includes the trailing colon when the
    /// piece takes an argument.
    pub fn method_selector(
        &mut self,
        span: Span,
        name: &str,
        param_type: Option<NodeId>,
        variable: Option<NodeId>,
    ) -> NodeId {
        self.push(
            NodeKind::MethodSelector {
                name: name.to_string(),
                variable,
                param_type,
            },
            span,
        )
    }

    /// Message send; the selector name is joined from the pieces.
    pub fn message(&mut self, span: Span, receiver: NodeId, selectors: Vec<NodeId>) -> NodeId {
        let selector_name = self.selector_name_of(&selectors);
        self.push(
            NodeKind::MessageExpression {
                receiver,
                selector_name,
                selectors,
            },
            span,
        )
    }

    pub fn message_selector(&mut self, span: Span, name: &str, arguments: SelectorArgs) -> NodeId {
        self.push(
            NodeKind::MessageSelector {
                name: name.to_string(),
                arguments,
            },
            span,
        )
    }

    fn selector_name_of(&self, selectors: &[NodeId]) -> String {
        selectors
            .iter()
            .filter_map(|id| match &self.nodes[id.index()].kind {
                NodeKind::MethodSelector { name, .. } | NodeKind::MessageSelector { name, .. } => {
                    Some(name.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Seal the arena under a `Program` spanning the whole source.
    pub fn finish(mut self, body: Vec<NodeId>) -> Ast {
        let span = to_span(0, self.source.len());
        let root = self.push(NodeKind::Program { body }, span);
        Ast::new(self.nodes, root)
    }
}

fn to_span(start: usize, end: usize) -> Span {
    Span::new(
        u32::try_from(start).unwrap_or(u32::MAX),
        u32::try_from(end).unwrap_or(u32::MAX),
    )
}
