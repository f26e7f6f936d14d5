use pretty_assertions::assert_eq;

use super::*;

#[test]
fn single_line_source() {
    let table = LineOffsetTable::build("hello");
    assert_eq!(table.line_count(), 1);
    assert_eq!(table.line_from_offset(3), 1);
}

#[test]
fn newline_ends_its_line() {
    let source = "ab\ncd";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.offset_to_line_col(source, 2), (1, 3));
    assert_eq!(table.offset_to_line_col(source, 3), (2, 1));
}

#[test]
fn columns_count_characters() {
    let source = "é = 1;";
    let table = LineOffsetTable::build(source);
    // 'é' is two bytes, '=' is the third character
    assert_eq!(table.offset_to_line_col(source, 3), (1, 3));
}

#[test]
fn offset_past_end_clamps() {
    let source = "a\nb";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.offset_to_line_col(source, 99), (2, 2));
}
