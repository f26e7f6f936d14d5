//! Per-scope bookkeeping.
//!
//! Whether a method must capture its receiver as `self` is decided up
//! front by [`analyze_self_capture`], so every rewrite inside the method
//! agrees on `self` versus `this` no matter where the triggering construct
//! appears. Temporaries are allocated during generation and hoisted into a
//! single declaration when the scope closes.

use ojc_ir::{Ast, Control, NodeId, NodeKind, Traverser, Visit};
use rustc_hash::FxHashSet;

/// Prefix of compiler temporaries.
pub const TEMPORARY_PREFIX: &str = "$oj_t_";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Method,
    Function,
}

/// One open scope.
#[derive(Clone, Debug)]
pub struct Scope {
    pub node: NodeId,
    pub kind: ScopeKind,
    pub needs_self_capture: bool,
    /// Temporaries needing a hoisted declaration.
    pub temporaries: Vec<String>,
    counter: u32,
}

impl Scope {
    pub fn new(node: NodeId, kind: ScopeKind, needs_self_capture: bool) -> Self {
        Scope {
            node,
            kind,
            needs_self_capture,
            temporaries: Vec::new(),
            counter: 0,
        }
    }

    /// Allocate the next temporary name; `declare` records it for hoisting.
    pub fn temporary(&mut self, declare: bool) -> String {
        let name = format!("{TEMPORARY_PREFIX}{}", self.counter);
        self.counter += 1;
        if declare {
            self.temporaries.push(name.clone());
        }
        name
    }

    /// Declaration hoisted to the top of the scope body, if one is needed.
    ///
    /// `capture_self` adds the `self = this` binding.
    pub fn hoisted_declaration(&self, capture_self: bool) -> Option<String> {
        let mut parts = Vec::with_capacity(self.temporaries.len() + 1);
        if capture_self {
            parts.push("self = this".to_string());
        }
        parts.extend(self.temporaries.iter().cloned());
        if parts.is_empty() {
            return None;
        }
        Some(format!("var {};", parts.join(", ")))
    }
}

/// Method definitions whose receiver must be captured as `self`: those
/// containing a nested function or an assignment to `self`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn analyze_self_capture(ast: &Ast) -> FxHashSet<NodeId> {
    let mut analysis = SelfCapture::default();
    // The visitor never fails.
    let _ = Traverser::new(ast).traverse(&mut analysis);
    analysis.capturing
}

#[derive(Default)]
struct SelfCapture {
    methods: Vec<NodeId>,
    capturing: FxHashSet<NodeId>,
}

impl Visit for SelfCapture {
    type Error = std::convert::Infallible;

    fn enter(&mut self, ast: &Ast, id: NodeId, _path: &[NodeId]) -> Result<Control, Self::Error> {
        match ast.kind(id) {
            NodeKind::MethodDefinition { .. } => self.methods.push(id),
            NodeKind::FunctionDeclaration(_) | NodeKind::FunctionExpression(_) => {
                if let Some(method) = self.methods.last() {
                    self.capturing.insert(*method);
                }
            }
            NodeKind::AssignmentExpression { left, .. } => {
                if ast.identifier_name(*left) == Some("self") {
                    if let Some(method) = self.methods.last() {
                        self.capturing.insert(*method);
                    }
                }
            }
            _ => {}
        }
        Ok(Control::Continue)
    }

    fn exit(&mut self, ast: &Ast, id: NodeId, _path: &[NodeId]) -> Result<(), Self::Error> {
        if matches!(ast.kind(id), NodeKind::MethodDefinition { .. }) {
            self.methods.pop();
        }
        Ok(())
    }
}
