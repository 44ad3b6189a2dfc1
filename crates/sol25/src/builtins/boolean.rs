//! Boolean built-in methods. The short-circuiting control messages live in
//! the dispatcher; only plain negation is answered here.

use crate::value::Value;

pub(crate) fn dispatch(receiver: Value, selector: &str) -> Option<Value> {
    match selector {
        "not" => Some(Value::from_bool(receiver == Value::False)),
        _ => None,
    }
}
