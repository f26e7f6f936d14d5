#![allow(clippy::unwrap_used, clippy::expect_used)]

use ojc_diagnostic::ErrorKind;
use ojc_ir::ast::{SelectorType, SynthesizePair};
use ojc_ir::AstBuilder;
use pretty_assertions::assert_eq;

use super::*;

fn build(ast: &Ast) -> Result<Model, CompileError> {
    let mut model = Model::new();
    Builder::new(ast, &mut model).build()?;
    Ok(model)
}

#[test]
fn class_with_ivars_properties_and_methods() {
    let source = "@implementation Point : Shape { Number _x; } \
                  @property Number x; \
                  - (void) moveBy:(Number)dx { } \
                  @end";
    let mut b = AstBuilder::new(source);
    let name = b.ident(b.find("Point"));
    let superclass = b.ident(b.find("Shape"));
    let ivar = b.ident(b.find("_x"));
    let ivar_decl = b.ivar_decl(b.find("Number _x;"), "Number", vec![ivar]);
    let block = b.ivar_block(b.range("{ Number", "}"), vec![ivar_decl]);
    let prop_id = b.ident(b.find_nth("x", 1));
    let property = b.property(b.find("@property Number x;"), "Number", prop_id);
    let ret = b.annotation(b.find("(void)"));
    let param_type = b.annotation(b.find("(Number)"));
    let dx = b.ident(b.find("dx"));
    let selector = b.method_selector(b.find("moveBy:(Number)dx"), "moveBy:", Some(param_type), Some(dx));
    let method_body = b.block(b.find("{ }"), vec![]);
    let method = b.method(
        b.range("- (void)", "{ }"),
        SelectorType::Instance,
        Some(ret),
        vec![selector],
        method_body,
    );
    let body = b.class_body(b.range("@property", "{ }"), vec![property, method]);
    let class = b.class(b.find(source), name, Some(superclass), Some(block), body);
    let ast = b.finish(vec![class]);

    let model = build(&ast).unwrap();
    let point = model.class("Point").expect("should find");
    assert_eq!(point.superclass_name.as_deref(), Some("Shape"));
    assert_eq!(point.ivar("_x").expect("should find").type_name, "Number");
    assert!(point.property("x").is_some());

    let move_by = point
        .method("moveBy:", SelectorType::Instance)
        .expect("should find");
    assert_eq!(move_by.return_type, "void");
    assert_eq!(move_by.parameter_types, vec!["Number"]);
    assert_eq!(move_by.variable_names, vec!["dx"]);
}

#[test]
fn synthesize_before_property_is_accepted() {
    let source = "@implementation Box @synthesize value = storage; @property id value; @end";
    let mut b = AstBuilder::new(source);
    let name = b.ident(b.find("Box"));
    let synth = b.push(
        NodeKind::SynthesizeDirective {
            pairs: vec![SynthesizePair {
                property: "value".to_string(),
                ivar: Some("storage".to_string()),
            }],
        },
        b.find("@synthesize value = storage;"),
    );
    let prop_id = b.ident(b.find_nth("value", 1));
    let property = b.property(b.find("@property id value;"), "id", prop_id);
    let body = b.class_body(b.range("@synthesize", "value;"), vec![synth, property]);
    let class = b.class(b.find(source), name, None, None, body);
    let ast = b.finish(vec![class]);

    let model = build(&ast).unwrap();
    let property = model
        .class("Box")
        .and_then(|c| c.property("value"))
        .expect("should find");
    assert_eq!(property.ivar.as_deref(), Some("storage"));
}

#[test]
fn reserved_selector_cannot_be_defined() {
    let source = "@implementation A + (id) alloc { } @end";
    let mut b = AstBuilder::new(source);
    let name = b.ident(b.find("A"));
    let selector = b.method_selector(b.find("alloc"), "alloc", None, None);
    let body = b.block(b.find("{ }"), vec![]);
    let method = b.method(b.range("+", "}"), SelectorType::Class, None, vec![selector], body);
    let class_body = b.class_body(b.range("+", "}"), vec![method]);
    let class = b.class(b.find(source), name, None, None, class_body);
    let ast = b.finish(vec![class]);

    let err = build(&ast).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReservedMethodName);
    assert_eq!(err.span, Some(b_span(source, "+ (id) alloc { }")));
}

fn b_span(source: &str, needle: &str) -> ojc_ir::Span {
    AstBuilder::new(source).find(needle)
}

#[test]
fn unexpected_class_body_child() {
    let source = "@implementation A foo(); @end";
    let mut b = AstBuilder::new(source);
    let name = b.ident(b.find("A"));
    let callee = b.ident(b.find("foo"));
    let call = b.call(b.find("foo()"), callee, vec![]);
    let stmt = b.expr_stmt(b.find("foo();"), call);
    let body = b.class_body(b.find("foo();"), vec![stmt]);
    let class = b.class(b.find(source), name, None, None, body);
    let ast = b.finish(vec![class]);

    let err = build(&ast).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ParseError);
    assert!(err.message.contains("ExpressionStatement"));
}

#[test]
fn class_level_initializers_must_be_constant() {
    let source = "@implementation A var ok = 1, bad = make(); @end";
    let mut b = AstBuilder::new(source);
    let name = b.ident(b.find("A"));
    let ok = b.ident(b.find("ok"));
    let one = b.number(b.find("1"));
    let ok_decl = b.declarator(b.find("ok = 1"), ok, Some(one));
    let bad = b.ident(b.find("bad"));
    let make = b.ident(b.find("make"));
    let call = b.call(b.find("make()"), make, vec![]);
    let bad_decl = b.declarator(b.find("bad = make()"), bad, Some(call));
    let var = b.var(b.range("var", ";"), vec![ok_decl, bad_decl]);
    let body = b.class_body(b.range("var", ";"), vec![var]);
    let class = b.class(b.find(source), name, None, None, body);
    let ast = b.finish(vec![class]);

    let err = build(&ast).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NonConstantInitializer);
    assert!(err.message.contains("'bad'"));
}

#[test]
fn category_before_class_creates_placeholder() {
    let source = "@implementation View (Extras) - (void) flash { } @end";
    let mut b = AstBuilder::new(source);
    let name = b.ident(b.find("View"));
    let selector = b.method_selector(b.find("flash"), "flash", None, None);
    let method_body = b.block(b.find("{ }"), vec![]);
    let ret = b.annotation(b.find("(void)"));
    let method = b.method(b.range("- (void)", "}"), SelectorType::Instance, Some(ret), vec![selector], method_body);
    let body = b.class_body(b.range("- (void)", "}"), vec![method]);
    let category = b.category(b.find(source), name, "Extras", body);
    let ast = b.finish(vec![category]);

    let model = build(&ast).unwrap();
    let view = model.class("View").expect("should find");
    assert!(view.placeholder);
    assert!(view.method("flash", SelectorType::Instance).is_some());
}

#[test]
fn enums_consts_globals_and_typedefs() {
    let source = "@enum Color { Red, Green = 5, Blue } @const LIMIT = -3; \
                  @global var gCount = 0; @typedef Number Meters; @squeeze secret;";
    let mut b = AstBuilder::new(source);

    let color = b.ident(b.find("Color"));
    let red = b.ident(b.find("Red"));
    let red_decl = b.declarator(b.find("Red"), red, None);
    let green = b.ident(b.find("Green"));
    let five = b.number(b.find("5"));
    let green_decl = b.declarator(b.find("Green = 5"), green, Some(five));
    let blue = b.ident(b.find("Blue"));
    let blue_decl = b.declarator(b.find("Blue"), blue, None);
    let e = b.push(
        NodeKind::EnumDeclaration {
            id: Some(color),
            unsigned: false,
            declarations: vec![red_decl, green_decl, blue_decl],
        },
        b.range("@enum", "}"),
    );

    let limit = b.ident(b.find("LIMIT"));
    let three = b.number(b.find("3"));
    let minus = b.push(
        NodeKind::UnaryExpression {
            operator: "-".to_string(),
            argument: three,
        },
        b.find("-3"),
    );
    let limit_decl = b.declarator(b.find("LIMIT = -3"), limit, Some(minus));
    let c = b.push(
        NodeKind::ConstDeclaration {
            declarations: vec![limit_decl],
        },
        b.find("@const LIMIT = -3;"),
    );

    let g = b.ident(b.find("gCount"));
    let zero = b.number(b.find("0"));
    let g_decl = b.declarator(b.find("gCount = 0"), g, Some(zero));
    let global = b.push(
        NodeKind::GlobalDeclaration {
            declaration: None,
            declarators: vec![g_decl],
        },
        b.find("@global var gCount = 0;"),
    );

    let typedef = b.push(
        NodeKind::TypedefDeclaration {
            from: "Number".to_string(),
            to: "Meters".to_string(),
        },
        b.find("@typedef Number Meters;"),
    );
    let squeeze = b.push(
        NodeKind::SqueezeDirective {
            names: vec!["secret".to_string()],
        },
        b.find("@squeeze secret;"),
    );
    let ast = b.finish(vec![e, c, global, typedef, squeeze]);

    let model = build(&ast).unwrap();
    let color = &model.enums()[0];
    assert_eq!(
        color.members,
        vec![
            ("Red".to_string(), 0),
            ("Green".to_string(), 5),
            ("Blue".to_string(), 6)
        ]
    );
    assert_eq!(model.consts().get("LIMIT").map(String::as_str), Some("-3"));
    assert!(model.is_global("gCount"));
    assert!(model.is_numeric_type("Meters"));
    assert!(model.is_numeric_type("Color"));
    assert!(model.squeezed_names().contains("secret"));
}

#[test]
fn enum_values_must_be_integer_literals() {
    let source = "@enum { A = 1.5 } @enum { B = x }";
    let mut b = AstBuilder::new(source);
    let a = b.ident(b.find("A"));
    let value = b.number(b.find("1.5"));
    let a_decl = b.declarator(b.find("A = 1.5"), a, Some(value));
    let ast_a = {
        let e = b.push(
            NodeKind::EnumDeclaration {
                id: None,
                unsigned: false,
                declarations: vec![a_decl],
            },
            b.find("@enum { A = 1.5 }"),
        );
        b.finish(vec![e])
    };
    assert_eq!(build(&ast_a).unwrap_err().kind, ErrorKind::NonIntegerEnum);

    let mut b = AstBuilder::new(source);
    let bn = b.ident(b.find("B"));
    let x = b.ident(b.find("x"));
    let b_decl = b.declarator(b.find("B = x"), bn, Some(x));
    let e = b.push(
        NodeKind::EnumDeclaration {
            id: None,
            unsigned: false,
            declarations: vec![b_decl],
        },
        b.find("@enum { B = x }"),
    );
    let ast_b = b.finish(vec![e]);
    assert_eq!(build(&ast_b).unwrap_err().kind, ErrorKind::NonLiteralEnum);
}

#[test]
fn const_must_be_literal() {
    let source = "@const X = y;";
    let mut b = AstBuilder::new(source);
    let x = b.ident(b.find("X"));
    let y = b.ident(b.find("y"));
    let decl = b.declarator(b.find("X = y"), x, Some(y));
    let c = b.push(
        NodeKind::ConstDeclaration {
            declarations: vec![decl],
        },
        b.find(source),
    );
    let ast = b.finish(vec![c]);
    assert_eq!(build(&ast).unwrap_err().kind, ErrorKind::NonLiteralConst);
}

#[test]
fn protocol_with_optional_method() {
    let source = "@protocol Drawable - (void) draw; @optional - (void) erase; @end";
    let mut b = AstBuilder::new(source);
    let name = b.ident(b.find("Drawable"));
    let draw = b.method_selector(b.find("draw"), "draw", None, None);
    let erase = b.method_selector(b.find("erase"), "erase", None, None);
    let draw_decl = b.push(
        NodeKind::MethodDeclaration {
            signature: MethodSignature {
                selector_type: SelectorType::Instance,
                selector_name: "draw".to_string(),
                return_type: None,
                selectors: vec![draw],
            },
            optional: false,
        },
        b.find("- (void) draw;"),
    );
    let erase_decl = b.push(
        NodeKind::MethodDeclaration {
            signature: MethodSignature {
                selector_type: SelectorType::Instance,
                selector_name: "erase".to_string(),
                return_type: None,
                selectors: vec![erase],
            },
            optional: true,
        },
        b.find("- (void) erase;"),
    );
    let protocol = b.push(
        NodeKind::ProtocolDefinition {
            id: name,
            body: vec![draw_decl, erase_decl],
        },
        b.find(source),
    );
    let ast = b.finish(vec![protocol]);

    let model = build(&ast).unwrap();
    let protocol = model.protocol("Drawable").expect("should find");
    let optional: Vec<bool> = protocol.all_methods().map(|m| m.optional).collect();
    assert_eq!(optional, vec![false, true]);
}
