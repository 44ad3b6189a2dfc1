//! Built-in methods on Integer, String, the booleans, and the base methods
//! every value understands.

use pretty_assertions::assert_eq;
use sol25::{CollectStringPrint, EmptyInput, ErrorKind, Exception, NoPrint, Object, Runner};

fn main_run(statements: &str) -> String {
    format!(
        r#"<program language="SOL25"><class name="Main" parent="Object"><method selector="run"><block arity="0">{statements}</block></method></class></program>"#
    )
}

fn assign(order: usize, expr: &str) -> String {
    format!(r#"<assign order="{order}"><var name="t{order}"/><expr>{expr}</expr></assign>"#)
}

fn int(value: i64) -> String {
    format!(r#"<literal class="Integer" value="{value}"/>"#)
}

fn string(value: &str) -> String {
    format!(r#"<literal class="String" value="{value}"/>"#)
}

fn var(name: &str) -> String {
    format!(r#"<var name="{name}"/>"#)
}

fn send(receiver: &str, selector: &str, args: &[&str]) -> String {
    let args: String = args
        .iter()
        .enumerate()
        .map(|(i, arg)| format!(r#"<arg order="{}"><expr>{arg}</expr></arg>"#, i + 1))
        .collect();
    format!(r#"<send selector="{selector}"><expr>{receiver}</expr>{args}</send>"#)
}

fn block0(statements: &str) -> String {
    format!(r#"<block arity="0">{statements}</block>"#)
}

/// Evaluates a single expression as the whole `run` body.
fn eval(expr: &str) -> Object {
    let runner = Runner::new(&main_run(&assign(1, expr))).expect("program should parse");
    let mut print = CollectStringPrint::new();
    runner.run(&mut print, &mut EmptyInput).expect("program should run")
}

fn eval_err(expr: &str) -> Exception {
    let runner = Runner::new(&main_run(&assign(1, expr))).expect("program should parse");
    runner
        .run(&mut NoPrint, &mut EmptyInput)
        .expect_err("expected a runtime error")
}

// ----- Integer -----

#[test]
fn integer_arithmetic() {
    assert_eq!(eval(&send(&int(2), "plus:", &[&int(3)])), Object::Int(5));
    assert_eq!(eval(&send(&int(2), "minus:", &[&int(3)])), Object::Int(-1));
    assert_eq!(eval(&send(&int(6), "multiplyBy:", &[&int(7)])), Object::Int(42));
    assert_eq!(eval(&send(&int(7), "divBy:", &[&int(2)])), Object::Int(3));
    assert_eq!(eval(&send(&int(-7), "divBy:", &[&int(2)])), Object::Int(-3));
}

#[test]
fn integer_comparisons() {
    assert_eq!(eval(&send(&int(5), "greaterThan:", &[&int(2)])), Object::Bool(true));
    assert_eq!(eval(&send(&int(2), "greaterThan:", &[&int(5)])), Object::Bool(false));
    assert_eq!(eval(&send(&int(5), "equalTo:", &[&int(5)])), Object::Bool(true));
    assert_eq!(eval(&send(&int(5), "equalTo:", &[&int(6)])), Object::Bool(false));
    // equalTo: against a non-Integer is false, not an error
    assert_eq!(eval(&send(&int(5), "equalTo:", &[&string("5")])), Object::Bool(false));
}

#[test]
fn division_by_zero_is_a_value_error() {
    let err = eval_err(&send(&int(1), "divBy:", &[&int(0)]));
    assert_eq!(err.kind(), ErrorKind::ValueError);
    assert_eq!(err.exit_code(), 53);
}

#[test]
fn division_overflow_is_a_value_error() {
    let err = eval_err(&send(&int(i64::MIN), "divBy:", &[&int(-1)]));
    assert_eq!(err.kind(), ErrorKind::ValueError);
}

#[test]
fn addition_overflow_is_a_value_error() {
    let err = eval_err(&send(&int(i64::MAX), "plus:", &[&int(1)]));
    assert_eq!(err.kind(), ErrorKind::ValueError);
}

#[test]
fn arithmetic_requires_integer_operands() {
    let err = eval_err(&send(&int(1), "plus:", &[&string("x")]));
    assert_eq!(err.kind(), ErrorKind::ValueError);
}

#[test]
fn integer_conversions() {
    assert_eq!(eval(&send(&int(42), "asString", &[])), Object::String("42".to_owned()));
    assert_eq!(eval(&send(&int(-3), "asString", &[])), Object::String("-3".to_owned()));
    assert_eq!(eval(&send(&int(42), "asInteger", &[])), Object::Int(42));
    // decimal round trip
    assert_eq!(
        eval(&send(&send(&int(12345), "asString", &[]), "asInteger", &[])),
        Object::Int(12345)
    );
}

// ----- String -----

#[test]
fn string_as_integer_parses_signed_decimal() {
    assert_eq!(eval(&send(&string("42"), "asInteger", &[])), Object::Int(42));
    assert_eq!(eval(&send(&string("-7"), "asInteger", &[])), Object::Int(-7));
    assert_eq!(eval(&send(&string("abc"), "asInteger", &[])), Object::Nil);
    assert_eq!(eval(&send(&string("4x"), "asInteger", &[])), Object::Nil);
    assert_eq!(eval(&send(&string(""), "asInteger", &[])), Object::Nil);
}

#[test]
fn string_equality_is_by_content() {
    assert_eq!(eval(&send(&string("a"), "equalTo:", &[&string("a")])), Object::Bool(true));
    assert_eq!(eval(&send(&string("a"), "equalTo:", &[&string("b")])), Object::Bool(false));
    assert_eq!(eval(&send(&string("a"), "equalTo:", &[&int(1)])), Object::Bool(false));
    // identity is per allocation
    assert_eq!(
        eval(&send(&string("a"), "identicalTo:", &[&string("a")])),
        Object::Bool(false)
    );
}

#[test]
fn concatenation_returns_a_new_string_or_nil() {
    assert_eq!(
        eval(&send(&string("foo"), "concatenateWith:", &[&string("bar")])),
        Object::String("foobar".to_owned())
    );
    assert_eq!(
        eval(&send(&string("foo"), "concatenateWith:", &[&int(1)])),
        Object::Nil
    );
}

#[test]
fn substring_slices_code_points() {
    let text = string("žluťoučký");
    assert_eq!(
        eval(&send(&text, "startsWith:endsBefore:", &[&int(2), &int(5)])),
        Object::String("luť".to_owned())
    );
    assert_eq!(
        eval(&send(&text, "startsWith:endsBefore:", &[&int(1), &int(10)])),
        Object::String("žluťoučký".to_owned())
    );
}

#[test]
fn substring_empty_and_nil_cases() {
    let text = string("abc");
    // end <= start yields the empty string
    assert_eq!(
        eval(&send(&text, "startsWith:endsBefore:", &[&int(2), &int(2)])),
        Object::String(String::new())
    );
    assert_eq!(
        eval(&send(&text, "startsWith:endsBefore:", &[&int(3), &int(1)])),
        Object::String(String::new())
    );
    // non-positive or non-Integer bounds yield nil
    assert_eq!(
        eval(&send(&text, "startsWith:endsBefore:", &[&int(0), &int(2)])),
        Object::Nil
    );
    assert_eq!(
        eval(&send(&text, "startsWith:endsBefore:", &[&string("1"), &int(2)])),
        Object::Nil
    );
    // an end past the text is clamped
    assert_eq!(
        eval(&send(&text, "startsWith:endsBefore:", &[&int(1), &int(99)])),
        Object::String("abc".to_owned())
    );
}

#[test]
fn string_as_string_is_itself() {
    assert_eq!(eval(&send(&string("x"), "asString", &[])), Object::String("x".to_owned()));
}

// ----- booleans and nil -----

#[test]
fn boolean_negation() {
    assert_eq!(eval(&send(&var("true"), "not", &[])), Object::Bool(false));
    assert_eq!(eval(&send(&var("false"), "not", &[])), Object::Bool(true));
}

#[test]
fn constant_as_string() {
    assert_eq!(eval(&send(&var("nil"), "asString", &[])), Object::String("nil".to_owned()));
    assert_eq!(eval(&send(&var("true"), "asString", &[])), Object::String("true".to_owned()));
    assert_eq!(
        eval(&send(&var("false"), "asString", &[])),
        Object::String("false".to_owned())
    );
}

#[test]
fn kind_predicates() {
    assert_eq!(eval(&send(&var("nil"), "isNil", &[])), Object::Bool(true));
    assert_eq!(eval(&send(&int(5), "isNil", &[])), Object::Bool(false));
    assert_eq!(eval(&send(&int(5), "isNumber", &[])), Object::Bool(true));
    assert_eq!(eval(&send(&string("s"), "isString", &[])), Object::Bool(true));
    assert_eq!(eval(&send(&string("s"), "isNumber", &[])), Object::Bool(false));
    assert_eq!(eval(&send(&block0(""), "isBlock", &[])), Object::Bool(true));
    assert_eq!(eval(&send(&var("true"), "isBlock", &[])), Object::Bool(false));
}

#[test]
fn blocks_and_instances_stringify_to_nothing() {
    assert_eq!(eval(&send(&block0(""), "asString", &[])), Object::String(String::new()));
    let instance = send(r#"<literal class="class" value="Object"/>"#, "new", &[]);
    assert_eq!(eval(&send(&instance, "asString", &[])), Object::String(String::new()));
}

#[test]
fn identical_integers_are_identical() {
    assert_eq!(eval(&send(&int(5), "identicalTo:", &[&int(5)])), Object::Bool(true));
    assert_eq!(eval(&send(&int(5), "identicalTo:", &[&int(6)])), Object::Bool(false));
}
