//! Built-in methods for each value kind, plus the base methods every value
//! understands.
//!
//! Dispatch here is the next-to-last ladder phase: kind-specific methods are
//! tried first, then the shared base methods. `Ok(None)` means "not
//! handled" and lets the ladder continue to dynamic attributes.

pub(crate) mod boolean;
pub(crate) mod integer;
pub(crate) mod string;

use crate::{
    error::RunResult,
    interp::Interp,
    io::{LineReader, PrintWriter},
    tracer::Tracer,
    value::{Kind, Value},
};

/// Base selectors every value understands.
const BASE_SELECTORS: &[&str] = &[
    "identicalTo:",
    "equalTo:",
    "asString",
    "isNil",
    "isNumber",
    "isString",
    "isBlock",
];
const BOOLEAN_SELECTORS: &[&str] = &["not", "and:", "or:", "ifTrue:ifFalse:"];
const INTEGER_SELECTORS: &[&str] = &[
    "asInteger",
    "greaterThan:",
    "plus:",
    "minus:",
    "multiplyBy:",
    "divBy:",
    "timesRepeat:",
];
const STRING_SELECTORS: &[&str] = &["asInteger", "concatenateWith:", "startsWith:endsBefore:", "print"];
const BLOCK_SELECTORS: &[&str] = &["whileTrue:", "value", "value:"];

pub(crate) fn dispatch<P: PrintWriter, R: LineReader, T: Tracer>(
    interp: &mut Interp<'_, P, R, T>,
    receiver: Value,
    selector: &str,
    args: &[Value],
) -> RunResult<Option<Value>> {
    let kind_result = match receiver {
        Value::Int(n) => integer::dispatch(interp, n, receiver, selector, args)?,
        Value::True | Value::False => boolean::dispatch(receiver, selector),
        _ if interp.heap.as_str(receiver).is_some() => string::dispatch(interp, receiver, selector, args)?,
        _ => None,
    };
    if let Some(result) = kind_result {
        return Ok(Some(result));
    }
    base(interp, receiver, selector, args)
}

/// The base methods, available on every value unless its kind overrode them
/// above: identity comparison, identity equality, `asString`, and the kind
/// predicates.
fn base<P: PrintWriter, R: LineReader, T: Tracer>(
    interp: &mut Interp<'_, P, R, T>,
    receiver: Value,
    selector: &str,
    args: &[Value],
) -> RunResult<Option<Value>> {
    let result = match selector {
        "identicalTo:" | "equalTo:" => Value::from_bool(receiver == args[0]),
        "asString" => {
            // Integer and String answer `asString` in their kind modules;
            // blocks and plain instances stringify to the empty string.
            let text = match receiver {
                Value::Nil => "nil",
                Value::True => "true",
                Value::False => "false",
                _ => "",
            };
            interp.heap.alloc_str(text)
        }
        "isNil" => Value::from_bool(receiver == Value::Nil),
        "isNumber" => Value::from_bool(matches!(receiver, Value::Int(_))),
        "isString" => Value::from_bool(interp.heap.as_str(receiver).is_some()),
        "isBlock" => Value::from_bool(interp.heap.as_block(receiver).is_some()),
        _ => return Ok(None),
    };
    Ok(Some(result))
}

/// True when attribute name `name` matches a built-in method (in getter or
/// setter form) on the given value kind.
pub(crate) fn collides_with_builtin(kind: Kind, name: &str) -> bool {
    let matches_in = |set: &[&str]| {
        set.iter()
            .any(|selector| *selector == name || selector.strip_suffix(':') == Some(name))
    };
    if matches_in(BASE_SELECTORS) {
        return true;
    }
    match kind {
        Kind::True | Kind::False => matches_in(BOOLEAN_SELECTORS),
        Kind::Integer => matches_in(INTEGER_SELECTORS),
        Kind::String => matches_in(STRING_SELECTORS),
        Kind::Block => matches_in(BLOCK_SELECTORS),
        Kind::Nil | Kind::Instance => false,
    }
}
