//! Range-addressed edit queue.
//!
//! The generator never rewrites the tree. Every rule queues text operations
//! against byte spans of the original source, and [`Modifier::finish`]
//! resolves the whole queue in one forward pass.
//!
//! # Ordering
//!
//! Operations are applied in source order. Several insertions may share an
//! offset; they are ordered so enclosing nodes wrap their children:
//!
//! - text inserted *after* a node is emitted before text inserted *before*
//!   a node at the same offset;
//! - among insertions *before* nodes, the larger node opens first;
//! - among insertions *after* nodes, the smaller node closes first;
//! - remaining ties keep queue order.
//!
//! An insertion at the start of a replaced range lands ahead of the
//! replacement. Replaced ranges may touch but never overlap, and nothing may
//! be inserted strictly inside a replaced range.

use ojc_diagnostic::CompileError;
use ojc_ir::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Anchor {
    After,
    Before,
}

#[derive(Clone, Debug)]
enum Operation {
    Replace {
        span: Span,
        text: String,
    },
    Insert {
        at: u32,
        anchor: Anchor,
        /// Length of the node the text is anchored to.
        extent: u32,
        text: String,
    },
}

impl Operation {
    fn start(&self) -> u32 {
        match self {
            Operation::Replace { span, .. } => span.start,
            Operation::Insert { at, .. } => *at,
        }
    }

    fn sort_key(&self, seq: usize) -> (u32, u8, u8, i64, usize) {
        match self {
            Operation::Insert {
                at, anchor, extent, ..
            } => {
                let extent = i64::from(*extent);
                let nesting = match anchor {
                    Anchor::After => extent,
                    Anchor::Before => -extent,
                };
                (*at, 0, *anchor as u8, nesting, seq)
            }
            Operation::Replace { span, .. } => (span.start, 1, 0, 0, seq),
        }
    }

    fn span(&self) -> Span {
        match self {
            Operation::Replace { span, .. } => *span,
            Operation::Insert { at, .. } => Span::point(*at),
        }
    }
}

/// Queue of text operations against one source.
#[derive(Clone, Debug, Default)]
pub struct Modifier {
    operations: Vec<Operation>,
}

impl Modifier {
    pub fn new() -> Self {
        Modifier {
            operations: Vec::new(),
        }
    }

    /// Replace the text of `span`.
    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        let text = text.into();
        if span.is_empty() {
            if !text.is_empty() {
                self.insert(span.start, Anchor::Before, 0, text);
            }
            return;
        }
        self.operations.push(Operation::Replace { span, text });
    }

    /// Replace the text between two spans; see [`Span::between`].
    pub fn replace_between(&mut self, from: Span, to: Span, text: impl Into<String>) {
        self.replace(from.between(to), text);
    }

    /// Insert `text` immediately before the node at `span`.
    pub fn insert_before(&mut self, span: Span, text: impl Into<String>) {
        self.insert(span.start, Anchor::Before, span.len(), text.into());
    }

    /// Insert `text` immediately after the node at `span`.
    pub fn insert_after(&mut self, span: Span, text: impl Into<String>) {
        self.insert(span.end, Anchor::After, span.len(), text.into());
    }

    pub fn remove(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    pub fn remove_between(&mut self, from: Span, to: Span) {
        self.replace_between(from, to, String::new());
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn insert(&mut self, at: u32, anchor: Anchor, extent: u32, text: String) {
        if text.is_empty() {
            return;
        }
        self.operations.push(Operation::Insert {
            at,
            anchor,
            extent,
            text,
        });
    }

    /// Resolve every queued operation against `source`.
    ///
    /// Fails with an edit-conflict error when two replaced ranges overlap or
    /// an insertion falls inside a replaced range.
    #[tracing::instrument(level = "debug", skip_all, fields(operations = self.operations.len()))]
    pub fn finish(self, source: &str) -> Result<String, CompileError> {
        let mut ordered: Vec<(usize, Operation)> = self.operations.into_iter().enumerate().collect();
        ordered.sort_by_key(|(seq, op)| op.sort_key(*seq));

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0usize;
        let mut last_replaced: Option<Span> = None;

        for (_, op) in ordered {
            let start = op.start() as usize;
            if start < cursor {
                let previous = last_replaced.unwrap_or(Span::point(0));
                return Err(CompileError::edit_conflict(previous, op.span()));
            }
            let Some(gap) = source.get(cursor..start) else {
                return Err(CompileError::edit_conflict(Span::point(0), op.span()));
            };
            out.push_str(gap);
            cursor = start;

            match op {
                Operation::Insert { text, .. } => out.push_str(&text),
                Operation::Replace { span, text } => {
                    out.push_str(&text);
                    cursor = (span.end as usize).min(source.len());
                    last_replaced = Some(span);
                }
            }
        }

        out.push_str(source.get(cursor..).unwrap_or_default());
        Ok(out)
    }
}

#[cfg(test)]
mod tests;
