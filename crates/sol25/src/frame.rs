//! Execution frames and the call stack.
//!
//! A frame holds one block execution's `self`, its write-once parameters,
//! and its mutable locals. Frames are pushed and popped in strict pairs
//! around block execution; only the top frame is visible to the evaluator.

use ahash::AHashMap;

use crate::{
    error::{ErrorKind, RunError, RunResult},
    value::Value,
};

/// Names that can never be parameters or assignment targets.
const RESERVED_NAMES: [&str; 5] = ["self", "super", "nil", "true", "false"];

pub(crate) fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

#[derive(Debug)]
pub(crate) struct Frame {
    slf: Option<Value>,
    parameters: AHashMap<String, Value>,
    locals: AHashMap<String, Value>,
}

impl Frame {
    pub fn new(slf: Option<Value>) -> Self {
        Self {
            slf,
            parameters: AHashMap::new(),
            locals: AHashMap::new(),
        }
    }

    /// The `self` bound to this frame, if any.
    pub fn slf(&self) -> Option<Value> {
        self.slf
    }

    /// Binds one parameter at frame creation. Parameters are read-only for
    /// the rest of the frame's life.
    pub fn define_parameter(&mut self, name: &str, value: Value) -> RunResult<()> {
        if is_reserved(name) {
            return Err(RunError::new(
                ErrorKind::NameCollision,
                format!("'{name}' is reserved and cannot be a parameter"),
            ));
        }
        if self.parameters.insert(name.to_owned(), value).is_some() {
            return Err(RunError::new(
                ErrorKind::NameCollision,
                format!("duplicate parameter '{name}'"),
            ));
        }
        Ok(())
    }

    /// Creates or updates a local. Assigning to a parameter or a reserved
    /// name is a collision.
    pub fn define_or_update_variable(&mut self, name: &str, value: Value) -> RunResult<()> {
        if is_reserved(name) {
            return Err(RunError::new(
                ErrorKind::NameCollision,
                format!("cannot assign to reserved name '{name}'"),
            ));
        }
        if self.parameters.contains_key(name) {
            return Err(RunError::new(
                ErrorKind::NameCollision,
                format!("cannot assign to parameter '{name}'"),
            ));
        }
        self.locals.insert(name.to_owned(), value);
        Ok(())
    }

    /// Resolves a name: keywords first, then parameters, then locals.
    pub fn get(&self, name: &str) -> RunResult<Value> {
        match name {
            "nil" => return Ok(Value::Nil),
            "true" => return Ok(Value::True),
            "false" => return Ok(Value::False),
            "self" => {
                return self
                    .slf
                    .ok_or_else(|| RunError::type_err("'self' is not bound here"));
            }
            "super" => return Err(RunError::type_err("'super' is not a value")),
            _ => {}
        }
        if let Some(value) = self.parameters.get(name).or_else(|| self.locals.get(name)) {
            return Ok(*value);
        }
        Err(RunError::undefined(name))
    }
}

/// LIFO stack of frames. Push and pop are paired around block execution;
/// an access with no frame on the stack is an interpreter bug.
#[derive(Debug, Default)]
pub(crate) struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn current(&self) -> RunResult<&Frame> {
        self.frames
            .last()
            .ok_or_else(|| RunError::internal("call stack is empty"))
    }

    pub fn current_mut(&mut self) -> RunResult<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| RunError::internal("call stack is empty"))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
