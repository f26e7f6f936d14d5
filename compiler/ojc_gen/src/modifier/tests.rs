#![allow(clippy::unwrap_used, clippy::expect_used)]

use ojc_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

use super::*;

fn span_of(source: &str, needle: &str) -> Span {
    let start = source.find(needle).unwrap();
    Span::new(start as u32, (start + needle.len()) as u32)
}

#[test]
fn no_operations_returns_source() {
    let modifier = Modifier::new();
    assert_eq!(modifier.finish("var x = 1;").unwrap(), "var x = 1;");
}

#[test]
fn replace_and_remove() {
    let source = "var answer = YES; debugger;";
    let mut modifier = Modifier::new();
    modifier.replace(span_of(source, "YES"), "true");
    modifier.remove(span_of(source, " debugger;"));
    assert_eq!(modifier.finish(source).unwrap(), "var answer = true;");
}

#[test]
fn replace_between_brackets_of_message() {
    let source = "[obj count]";
    let node = span_of(source, "[obj count]");
    let receiver = span_of(source, "obj");
    let selector = span_of(source, "count");

    let mut modifier = Modifier::new();
    modifier.replace_between(node, receiver, "(");
    modifier.replace_between(receiver, selector, ".count(");
    modifier.remove(selector);
    modifier.replace_between(selector, node, "))");
    assert_eq!(modifier.finish(source).unwrap(), "(obj.count())");
}

#[test]
fn enclosing_inserts_wrap_inner_inserts() {
    let source = "a + b";
    let outer = span_of(source, "a + b");
    let inner = span_of(source, "a");

    let mut modifier = Modifier::new();
    // queue order deliberately inner first
    modifier.insert_before(inner, "[");
    modifier.insert_after(inner, "]");
    modifier.insert_before(outer, "(");
    modifier.insert_after(outer, ")");
    assert_eq!(modifier.finish(source).unwrap(), "([a] + b)");
}

#[test]
fn insert_after_left_precedes_insert_before_right() {
    let source = "ab";
    let mut modifier = Modifier::new();
    modifier.insert_before(Span::new(1, 2), "<");
    modifier.insert_after(Span::new(0, 1), ">");
    assert_eq!(modifier.finish(source).unwrap(), "a><b");
}

#[test]
fn insert_at_replacement_start_comes_first() {
    let source = "x = 1;";
    let statement = span_of(source, "x = 1;");
    let mut modifier = Modifier::new();
    modifier.replace(span_of(source, "x"), "this.x");
    modifier.insert_before(statement, "var self = this;");
    assert_eq!(modifier.finish(source).unwrap(), "var self = this;this.x = 1;");
}

#[test]
fn same_offset_inserts_keep_queue_order() {
    let mut modifier = Modifier::new();
    modifier.insert_before(Span::new(0, 1), "1");
    modifier.insert_before(Span::new(0, 1), "2");
    assert_eq!(modifier.finish("x").unwrap(), "12x");
}

#[test]
fn empty_replacement_of_empty_span_is_dropped() {
    let mut modifier = Modifier::new();
    modifier.replace(Span::point(1), "");
    modifier.remove_between(Span::new(0, 1), Span::new(1, 2));
    assert!(modifier.is_empty());
    assert_eq!(modifier.finish("ab").unwrap(), "ab");
}

#[test]
fn overlapping_replacements_conflict() {
    let mut modifier = Modifier::new();
    modifier.replace(Span::new(0, 4), "a");
    modifier.replace(Span::new(2, 6), "b");
    let err = modifier.finish("0123456789").unwrap_err();
    assert_eq!(err.kind, ErrorKind::EditConflict);
    assert_eq!(err.span, Some(Span::new(2, 6)));
}

#[test]
fn insert_inside_replacement_conflicts() {
    let mut modifier = Modifier::new();
    modifier.replace(Span::new(0, 4), "a");
    modifier.insert_before(Span::new(2, 3), "b");
    let err = modifier.finish("0123456789").unwrap_err();
    assert_eq!(err.kind, ErrorKind::EditConflict);
}

#[test]
fn touching_replacements_are_fine() {
    let mut modifier = Modifier::new();
    modifier.replace(Span::new(0, 2), "A");
    modifier.replace(Span::new(2, 4), "B");
    assert_eq!(modifier.len(), 2);
    assert_eq!(modifier.finish("0123").unwrap(), "AB");
}
