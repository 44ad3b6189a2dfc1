//! Integer built-in methods.
//!
//! Arithmetic operands must be raw Integers; unwrapping of delegating
//! instances happens in the dispatcher's forwarding phase, not here.

use crate::{
    error::{RunError, RunResult},
    interp::Interp,
    io::{LineReader, PrintWriter},
    tracer::Tracer,
    value::Value,
};

pub(crate) fn dispatch<P: PrintWriter, R: LineReader, T: Tracer>(
    interp: &mut Interp<'_, P, R, T>,
    n: i64,
    receiver: Value,
    selector: &str,
    args: &[Value],
) -> RunResult<Option<Value>> {
    let result = match selector {
        "asString" => interp.heap.alloc_str(n.to_string()),
        "asInteger" => receiver,
        "isNumber" => Value::True,
        "equalTo:" => Value::from_bool(args[0] == Value::Int(n)),
        "greaterThan:" => Value::from_bool(n > operand(interp, selector, args[0])?),
        "plus:" => checked(selector, n.checked_add(operand(interp, selector, args[0])?))?,
        "minus:" => checked(selector, n.checked_sub(operand(interp, selector, args[0])?))?,
        "multiplyBy:" => checked(selector, n.checked_mul(operand(interp, selector, args[0])?))?,
        "divBy:" => {
            let divisor = operand(interp, selector, args[0])?;
            if divisor == 0 {
                return Err(RunError::value_err("division by zero"));
            }
            // i64::MIN / -1 is the one quotient that does not fit.
            checked(selector, n.checked_div(divisor))?
        }
        _ => return Ok(None),
    };
    Ok(Some(result))
}

fn operand<P: PrintWriter, R: LineReader, T: Tracer>(
    interp: &Interp<'_, P, R, T>,
    selector: &str,
    arg: Value,
) -> RunResult<i64> {
    match arg {
        Value::Int(n) => Ok(n),
        _ => Err(RunError::value_err(format!(
            "'{selector}' expects an Integer argument, found {}",
            interp.classes.name(interp.heap.class_of(arg))
        ))),
    }
}

fn checked(selector: &str, result: Option<i64>) -> RunResult<Value> {
    result
        .map(Value::Int)
        .ok_or_else(|| RunError::value_err(format!("integer overflow in '{selector}'")))
}
