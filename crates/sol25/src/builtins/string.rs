//! String built-in methods.
//!
//! Substring indices are 1-based code-point positions; slicing is UTF-8
//! aware and never splits a code point.

use crate::{
    error::RunResult,
    interp::Interp,
    io::{LineReader, PrintWriter},
    tracer::Tracer,
    value::Value,
};

pub(crate) fn dispatch<P: PrintWriter, R: LineReader, T: Tracer>(
    interp: &mut Interp<'_, P, R, T>,
    receiver: Value,
    selector: &str,
    args: &[Value],
) -> RunResult<Option<Value>> {
    let result = match selector {
        "asString" => receiver,
        "isString" => Value::True,
        "asInteger" => interp
            .heap
            .as_str(receiver)
            .and_then(|text| text.parse::<i64>().ok())
            .map_or(Value::Nil, Value::Int),
        "equalTo:" => {
            let equal = matches!(
                (interp.heap.as_str(receiver), string_payload(interp, args[0])),
                (Some(mine), Some(other)) if mine == other
            );
            Value::from_bool(equal)
        }
        "concatenateWith:" => {
            let joined = match (interp.heap.as_str(receiver), interp.heap.as_str(args[0])) {
                (Some(left), Some(right)) => Some(format!("{left}{right}")),
                _ => None,
            };
            match joined {
                Some(text) => interp.heap.alloc_str(text),
                None => Value::Nil,
            }
        }
        "startsWith:endsBefore:" => substring(interp, receiver, args[0], args[1]),
        _ => return Ok(None),
    };
    Ok(Some(result))
}

/// The text behind a value: either a String itself or a user instance
/// delegating to one. `equalTo:` accepts both.
fn string_payload<'i, P: PrintWriter, R: LineReader, T: Tracer>(
    interp: &'i Interp<'_, P, R, T>,
    value: Value,
) -> Option<&'i str> {
    interp.heap.as_str(value).or_else(|| {
        interp
            .heap
            .internal_value(value)
            .and_then(|inner| interp.heap.as_str(inner))
    })
}

/// 1-based, end-exclusive code-point slice. Non-Integer or non-positive
/// bounds yield `nil`; an empty range yields the empty string.
fn substring<P: PrintWriter, R: LineReader, T: Tracer>(
    interp: &mut Interp<'_, P, R, T>,
    receiver: Value,
    start: Value,
    end: Value,
) -> Value {
    let (Value::Int(start), Value::Int(end)) = (start, end) else {
        return Value::Nil;
    };
    if start <= 0 || end <= 0 {
        return Value::Nil;
    }
    if end <= start {
        return interp.heap.alloc_str("");
    }
    let skip = usize::try_from(start - 1).unwrap_or(usize::MAX);
    let take = usize::try_from(end - start).unwrap_or(usize::MAX);
    let sliced = interp
        .heap
        .as_str(receiver)
        .map(|text| text.chars().skip(skip).take(take).collect::<String>());
    match sliced {
        Some(text) => interp.heap.alloc_str(text),
        None => Value::Nil,
    }
}
