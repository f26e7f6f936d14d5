//! Byte ranges into a unit's source text.
//!
//! Nodes carry a [`Span`] and the generator addresses every edit through
//! one, so spans always refer to the unmodified input.

use std::fmt;

/// Half-open byte range `start..end`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Placeholder for nodes with no source text.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Empty span at `offset`; used as an insertion anchor.
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span::new(offset, offset)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `other` lies entirely inside `self`.
    #[inline]
    pub fn encloses(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The gap separating two spans.
    ///
    /// For a node and one of its children the gap runs along the edge they
    /// share: `node.between(first_child)` is the node's prefix and
    /// `last_child.between(node)` its suffix. Siblings yield the text
    /// between them in either order.
    #[must_use]
    pub fn between(self, other: Span) -> Span {
        if self.encloses(other) {
            Span::new(self.start, other.start)
        } else if other.encloses(self) {
            Span::new(self.end, other.end)
        } else if self.end <= other.start {
            Span::new(self.end, other.start)
        } else {
            Span::new(other.end, self.start)
        }
    }

    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
