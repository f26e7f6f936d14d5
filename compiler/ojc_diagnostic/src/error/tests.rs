#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn display_is_the_message() {
    let err = CompileError::duplicate_class("Foo");
    assert_eq!(err.to_string(), "Duplicate declaration of class 'Foo'");
    assert_eq!(err.kind, ErrorKind::DuplicateClass);
}

#[test]
fn first_span_wins() {
    let err = CompileError::parse("bad")
        .at(Span::new(3, 4))
        .at(Span::new(9, 10));
    assert_eq!(err.span, Some(Span::new(3, 4)));
}

#[test]
fn locate_resolves_line_and_column() {
    let source = "var a;\n  @CLASS";
    let table = LineOffsetTable::build(source);
    let mut err = CompileError::unknown_macro("@CLAS")
        .at(Span::new(9, 15))
        .in_file("a.oj");
    err.locate(&table, source);

    assert_eq!(err.line, Some(2));
    assert_eq!(err.column, Some(3));
    assert_eq!(err.file.as_deref(), Some("a.oj"));
}

#[test]
fn locate_without_span_is_a_no_op() {
    let mut err = CompileError::parse("x");
    err.locate(&LineOffsetTable::build("abc"), "abc");
    assert_eq!(err.line, None);
}

#[test]
fn circular_chain_is_listed() {
    let chain = vec!["A".to_string(), "B".to_string(), "A".to_string()];
    let err = CompileError::circular_class_hierarchy(&chain);
    assert_eq!(
        err.message,
        "Circular class hierarchy detected: A, B, A"
    );
}

#[test]
fn tags_are_kebab_case() {
    assert_eq!(ErrorKind::SqueezerReachedEndIndex.as_str(), "squeezer-reached-end-index");
    assert_eq!(ErrorKind::ReservedNamespace.to_string(), "reserved-namespace");
}
