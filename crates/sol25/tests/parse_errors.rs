//! Structural validation of the XML AST input and entry-point checks.

use sol25::{ErrorKind, Exception, Runner};

fn parse_err(source: &str) -> Exception {
    Runner::new(source).expect_err("expected a parse error")
}

fn program(classes: &str) -> String {
    format!(r#"<program language="SOL25">{classes}</program>"#)
}

fn main_run(statements: &str) -> String {
    program(&format!(
        r#"<class name="Main" parent="Object"><method selector="run"><block arity="0">{statements}</block></method></class>"#
    ))
}

#[test]
fn well_formed_program_parses() {
    assert!(Runner::new(&main_run("")).is_ok());
}

#[test]
fn language_attribute_is_case_insensitive() {
    let source = r#"<program language="sol25"><class name="Main" parent="Object"><method selector="run"><block arity="0"/></method></class></program>"#;
    assert!(Runner::new(source).is_ok());
}

#[test]
fn missing_main_class() {
    let err = parse_err(&program(r#"<class name="C" parent="Object"></class>"#));
    assert_eq!(err.kind(), ErrorKind::MissingMain);
    assert_eq!(err.exit_code(), 31);
}

#[test]
fn main_without_run() {
    let err = parse_err(&program(
        r#"<class name="Main" parent="Object"><method selector="step"><block arity="0"/></method></class>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::MissingMain);
}

#[test]
fn run_with_parameters_is_missing_main() {
    let err = parse_err(&program(
        r#"<class name="Main" parent="Object"><method selector="run"><block arity="1"><parameter name="x" order="1"/></block></method></class>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::MissingMain);
}

#[test]
fn run_may_be_inherited() {
    let source = program(
        r#"<class name="Base" parent="Object"><method selector="run"><block arity="0"/></method></class><class name="Main" parent="Base"></class>"#,
    );
    assert!(Runner::new(&source).is_ok());
}

#[test]
fn unsupported_language_value() {
    let err = parse_err(r#"<program language="PY"></program>"#);
    assert_eq!(err.kind(), ErrorKind::TypeError);
    assert_eq!(err.exit_code(), 52);
}

#[test]
fn unexpected_root_element() {
    let err = parse_err(r#"<prog language="SOL25"></prog>"#);
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn malformed_xml_is_a_type_error() {
    let err = parse_err("this is not xml");
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn expr_must_contain_exactly_one_child() {
    let err = parse_err(&main_run(
        r#"<assign order="1"><var name="t"/><expr><literal class="Integer" value="1"/><literal class="Integer" value="2"/></expr></assign>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn unknown_literal_class() {
    let err = parse_err(&main_run(
        r#"<assign order="1"><var name="t"/><expr><literal class="Float" value="1.5"/></expr></assign>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn integer_literal_must_fit_64_bits() {
    let err = parse_err(&main_run(
        r#"<assign order="1"><var name="t"/><expr><literal class="Integer" value="99999999999999999999999"/></expr></assign>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn duplicate_selector_in_one_class() {
    let err = parse_err(&program(
        r#"<class name="Main" parent="Object"><method selector="run"><block arity="0"/></method><method selector="run"><block arity="0"/></method></class>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn unknown_parent_class() {
    let err = parse_err(&program(r#"<class name="Foo" parent="Baz"></class>"#));
    assert_eq!(err.kind(), ErrorKind::UndefinedName);
    assert_eq!(err.exit_code(), 32);
}

#[test]
fn parent_must_be_declared_first() {
    // Bar extends Foo, but Foo is declared later in the document.
    let err = parse_err(&program(
        r#"<class name="Bar" parent="Foo"></class><class name="Foo" parent="Object"></class>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::UndefinedName);
}

#[test]
fn invalid_class_name() {
    let err = parse_err(&program(r#"<class name="foo" parent="Object"></class>"#));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn redefining_a_builtin_class() {
    let err = parse_err(&program(r#"<class name="Integer" parent="Object"></class>"#));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn block_arity_attribute_must_match_parameters() {
    let err = parse_err(&program(
        r#"<class name="Main" parent="Object"><method selector="go"><block arity="1"></block></method></class>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn parameter_orders_must_be_sequential() {
    let err = parse_err(&program(
        r#"<class name="Main" parent="Object"><method selector="go:"><block arity="1"><parameter name="x" order="2"/></block></method></class>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn duplicate_assign_order() {
    let statements = r#"<assign order="1"><var name="a"/><expr><literal class="Integer" value="1"/></expr></assign><assign order="1"><var name="b"/><expr><literal class="Integer" value="2"/></expr></assign>"#;
    let err = parse_err(&main_run(statements));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn assign_requires_var_and_expr() {
    let err = parse_err(&main_run(r#"<assign order="1"><var name="t"/></assign>"#));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn var_requires_a_name() {
    let err = parse_err(&main_run(
        r#"<assign order="1"><var name="t"/><expr><var/></expr></assign>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn send_requires_a_receiver() {
    let err = parse_err(&main_run(
        r#"<assign order="1"><var name="t"/><expr><send selector="new"/></expr></assign>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn stray_elements_are_rejected() {
    let err = parse_err(&program(
        r#"<class name="Main" parent="Object"><method selector="run"><block arity="0"/></method><banner/></class>"#,
    ));
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn assigns_execute_sorted_by_order() {
    // Orders 3 and 1 appear out of document order; the result must be the
    // statement with the highest order, and gaps are allowed.
    let statements = r#"<assign order="3"><var name="b"/><expr><literal class="String" value="last"/></expr></assign><assign order="1"><var name="a"/><expr><literal class="String" value="first"/></expr></assign>"#;
    let runner = Runner::new(&main_run(statements)).expect("program should parse");
    let result = runner
        .run(&mut sol25::NoPrint, &mut sol25::EmptyInput)
        .expect("program should run");
    assert_eq!(result, sol25::Object::String("last".to_owned()));
}
