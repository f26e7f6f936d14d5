#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeMap, BTreeSet};

use ojc_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn squeezing() -> SymbolTyper {
    let mut typer = SymbolTyper::new();
    typer.configure_squeeze(true, 0, None);
    typer
}

#[test]
fn verbatim_symbols() {
    let mut typer = SymbolTyper::new();
    assert_eq!(typer.class_symbol("Point").unwrap(), "$oj_c_Point");
    assert_eq!(typer.ivar_symbol("Point", "_x").unwrap(), "$oj_i_Point$__x");
    assert_eq!(typer.selector_symbol("moveTo:y:").unwrap(), "$oj_f_moveTo_y_");
    assert_eq!(typer.selector_symbol("set_value:").unwrap(), "$oj_f_set$_value_");
    assert_eq!(typer.enum_symbol("Color").unwrap(), "$oj_e_Color");
    assert_eq!(typer.identifier_symbol("gCount").unwrap(), "gCount");
    assert_eq!(typer.squeezed_identifier("gCount"), None);
}

#[test]
fn verbatim_ivar_symbols_do_not_collide() {
    let mut typer = SymbolTyper::new();
    let a = typer.ivar_symbol("A", "$$b").unwrap();
    let b = typer.ivar_symbol("A$", "$b").unwrap();
    let c = typer.ivar_symbol("A$$", "b").unwrap();
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_ne!(a, c);
}

#[test]
fn base_selectors_stay_plain() {
    let mut typer = squeezing();
    assert_eq!(typer.selector_symbol("init").unwrap(), "init");
    assert_eq!(typer.selector_symbol("isEqual:").unwrap(), "isEqual_");
    // nothing was allocated
    assert!(typer.save_state().entries.is_empty());
}

#[test]
fn squeezed_symbols_are_dense_and_stable() {
    let mut typer = squeezing();
    assert_eq!(typer.class_symbol("Point").unwrap(), "$oj$a");
    assert_eq!(typer.selector_symbol("moveBy:").unwrap(), "$oj$b");
    assert_eq!(typer.class_symbol("Point").unwrap(), "$oj$a");
    assert_eq!(typer.ivar_symbol("Point", "_x").unwrap(), "$oj$c");
    // the same ivar name in another class is a different symbol
    assert_eq!(typer.ivar_symbol("Rect", "_x").unwrap(), "$oj$d");
}

#[test]
fn squeeze_respects_start_and_end_index() {
    let mut typer = SymbolTyper::new();
    typer.configure_squeeze(true, 64, Some(66));
    assert_eq!(typer.class_symbol("A").unwrap(), "$oj$ba");
    assert_eq!(typer.class_symbol("B").unwrap(), "$oj$bb");
    let err = typer.class_symbol("C").unwrap_err();
    assert_eq!(err.kind, ErrorKind::SqueezerReachedEndIndex);
    // existing allocations still resolve
    assert_eq!(typer.class_symbol("A").unwrap(), "$oj$ba");
}

#[test]
fn state_reload_continues_allocation() {
    let mut first = squeezing();
    first.class_symbol("A").unwrap();
    first.identifier_symbol("gShared").unwrap();

    let mut second = SymbolTyper::new();
    second.load_state(first.save_state());
    second.configure_squeeze(true, 0, None);
    assert_eq!(second.class_symbol("A").unwrap(), "$oj$a");
    assert_eq!(second.squeezed_identifier("gShared"), Some("$oj$b"));
    assert_eq!(second.class_symbol("B").unwrap(), "$oj$c");
}

#[test]
fn typechecker_types() {
    let mut typer = SymbolTyper::new();
    let mut types = BTreeMap::new();
    for (k, v) in [
        ("Number", "Number"),
        ("int", "Number"),
        ("BOOL", "Boolean"),
        ("String", "String"),
        ("Array", "Array"),
        ("Object", "Object"),
        ("Point", "Point"),
        ("Coord", "Point"),
    ] {
        types.insert(k.to_string(), v.to_string());
    }
    let classes: BTreeSet<String> = ["Point".to_string()].into_iter().collect();
    typer.bind_types(&types, &classes);

    let param = Location::ImplementationParameter;
    let ret = Location::ImplementationReturn;
    let mut ty = |name: &str, location: Location| {
        typer
            .to_typechecker_type(name, location, Some("Point"))
            .unwrap()
    };

    assert_eq!(ty("int", param), "number");
    assert_eq!(ty("BOOL", param), "boolean");
    assert_eq!(ty("String", param), "string");
    assert_eq!(ty("Array", param), "any[]");
    assert_eq!(ty("Object", param), "any");
    assert_eq!(ty("id", param), "any");
    assert_eq!(ty("void", ret), "void");
    assert_eq!(ty("Coord", param), "$oj_c_Point");
    assert_eq!(ty("int[]", param), "number[]");
    assert_eq!(ty("instancetype", ret), "$oj_c_Point");
    assert_eq!(ty("instancetype", param), "any");
    assert_eq!(ty("Promise<any>", param), "Promise<any>");
    assert_eq!(ty("", param), "any");
}

proptest! {
    #[test]
    fn squeezed_symbols_are_unique(names in prop::collection::btree_set("[A-Za-z][A-Za-z0-9]{0,8}", 1..40)) {
        let mut typer = squeezing();
        let symbols: BTreeSet<String> = names
            .iter()
            .map(|n| typer.class_symbol(n).unwrap())
            .collect();
        prop_assert_eq!(symbols.len(), names.len());
    }

    #[test]
    fn squeezed_symbols_survive_persistence(names in prop::collection::vec("[a-z]{1,6}:?", 1..30)) {
        let mut first = squeezing();
        let before: Vec<String> = names.iter().map(|n| first.selector_symbol(n).unwrap()).collect();

        let mut second = SymbolTyper::new();
        second.load_state(first.save_state());
        second.configure_squeeze(true, 0, None);
        let after: Vec<String> = names.iter().map(|n| second.selector_symbol(n).unwrap()).collect();

        prop_assert_eq!(before, after);
    }
}
