//! The message dispatcher.
//!
//! `send` drives the precedence ladder: class messages, the block `value…`
//! shortcut, boolean control, loops, the string `print` intrinsic, user
//! methods, internal-value delegation, built-in methods, dynamic attributes,
//! and finally do-not-understand. The first matching phase wins.

use smallvec::SmallVec;

use crate::{
    builtins,
    classes::ClassId,
    error::{RunError, RunResult},
    expressions::BlockId,
    interp::Interp,
    io::{LineReader, PrintWriter},
    tracer::Tracer,
    value::{Kind, Value},
};

/// Result of evaluating an expression in receiver position.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Receiver {
    /// The receiver was a class-name literal.
    Class(ClassId),
    /// The receiver was the `super` sentinel; it is never a value.
    Super,
    Value(Value),
}

/// Selectors a user instance forwards to its internal value.
const DELEGATABLE_SELECTORS: &[&str] = &[
    "equalTo:",
    "greaterThan:",
    "plus:",
    "minus:",
    "multiplyBy:",
    "divBy:",
    "asString",
    "asInteger",
    "timesRepeat:",
    "concatenateWith:",
    "startsWith:endsBefore:",
    "isNumber",
    "isString",
    "isBlock",
    "isNil",
    "print",
];

/// The block invocation selectors: `value`, colon-padded `value:`/`value::`,
/// and the keyword form `value:value:…`.
fn is_value_selector(selector: &str) -> bool {
    let Some(rest) = selector.strip_prefix("value") else {
        return false;
    };
    if rest.chars().all(|c| c == ':') {
        return true;
    }
    !selector.is_empty() && selector.len() % 6 == 0 && selector.as_bytes().chunks(6).all(|chunk| chunk == b"value:")
}

impl<P: PrintWriter, R: LineReader, T: Tracer> Interp<'_, P, R, T> {
    /// Entry point for every message send.
    pub(crate) fn send(&mut self, receiver: Receiver, selector: &str, args: &[Value]) -> RunResult<Value> {
        if selector.matches(':').count() != args.len() {
            return Err(RunError::dnu(&self.describe_receiver(receiver), selector));
        }
        if self.tracer.is_active() {
            let description = self.describe_receiver(receiver);
            self.tracer.message_send(self.stack.depth(), &description, selector);
        }
        match receiver {
            Receiver::Class(class) => self.class_message(class, selector, args),
            Receiver::Super => self.super_send(selector, args),
            Receiver::Value(value) => self.send_value(value, selector, args),
        }
    }

    fn describe_receiver(&self, receiver: Receiver) -> String {
        match receiver {
            Receiver::Class(class) => format!("class {}", self.classes.name(class)),
            Receiver::Super => "super".to_owned(),
            Receiver::Value(value) => self.classes.name(self.heap.class_of(value)).to_owned(),
        }
    }

    // ----- class messages -----

    fn class_message(&mut self, class: ClassId, selector: &str, args: &[Value]) -> RunResult<Value> {
        match selector {
            "new" => self.class_new(class),
            "from:" => self.class_from(class, args[0]),
            "read" if class == ClassId::STRING => {
                let line = self.input.read_line().map_err(RunError::from)?.unwrap_or_default();
                Ok(self.heap.alloc_str(line))
            }
            _ => Err(RunError::dnu(
                &format!("class {}", self.classes.name(class)),
                selector,
            )),
        }
    }

    fn class_new(&mut self, class: ClassId) -> RunResult<Value> {
        match class {
            ClassId::NIL => Ok(Value::Nil),
            ClassId::TRUE => Ok(Value::True),
            ClassId::FALSE => Ok(Value::False),
            ClassId::INTEGER => Ok(Value::Int(0)),
            ClassId::STRING => Ok(self.heap.alloc_str("")),
            ClassId::BLOCK => Err(RunError::dnu("class Block", "new")),
            _ => Ok(self.new_instance(class)),
        }
    }

    /// Allocates an instance, seeding the internal value when the class
    /// descends from Integer or String.
    pub(crate) fn new_instance(&mut self, class: ClassId) -> Value {
        let internal = if self.classes.is_same_or_ancestor(ClassId::INTEGER, class) {
            Some(Value::Int(0))
        } else if self.classes.is_same_or_ancestor(ClassId::STRING, class) {
            Some(self.heap.alloc_str(""))
        } else {
            None
        };
        self.heap.alloc_instance(class, internal)
    }

    fn class_from(&mut self, class: ClassId, source: Value) -> RunResult<Value> {
        let source_class = self.heap.class_of(source);
        if !self.classes.are_related(class, source_class) {
            return Err(RunError::value_err(format!(
                "'from:' source {} is not compatible with {}",
                self.classes.name(source_class),
                self.classes.name(class)
            )));
        }
        match class {
            ClassId::NIL => Ok(Value::Nil),
            ClassId::TRUE => Ok(Value::True),
            ClassId::FALSE => Ok(Value::False),
            ClassId::INTEGER => match source {
                Value::Int(n) => Ok(Value::Int(n)),
                _ => Err(RunError::value_err("'Integer from:' expects an Integer")),
            },
            ClassId::STRING => {
                let text = self.heap.as_str(source).map(str::to_owned);
                match text {
                    Some(text) => Ok(self.heap.alloc_str(text)),
                    None => Err(RunError::value_err("'String from:' expects a String")),
                }
            }
            ClassId::BLOCK => Err(RunError::dnu("class Block", "from:")),
            _ => self.instance_from(class, source),
        }
    }

    fn instance_from(&mut self, class: ClassId, source: Value) -> RunResult<Value> {
        let target = self.new_instance(class);
        match self.heap.kind_of(source) {
            // A primitive source becomes the internal value.
            Kind::Integer | Kind::String | Kind::Block => self.heap.set_internal(target, source)?,
            // An instance source has every attribute except the internal
            // value copied through the dispatcher, so user setters and the
            // collision rules stay in force.
            Kind::Instance => {
                let attrs: Vec<(String, Value)> = self
                    .heap
                    .attrs(source)
                    .map(|attrs| attrs.iter().map(|(name, value)| (name.clone(), *value)).collect())
                    .unwrap_or_default();
                for (name, value) in attrs {
                    self.send_value(target, &format!("{name}:"), &[value])?;
                }
            }
            Kind::Nil | Kind::True | Kind::False => {}
        }
        Ok(target)
    }

    // ----- super -----

    /// `super` reroutes lookup to skip the class of the enclosing `self`;
    /// the enclosing `self` stays the receiver.
    fn super_send(&mut self, selector: &str, args: &[Value]) -> RunResult<Value> {
        let slf = self
            .stack
            .current()?
            .slf()
            .ok_or_else(|| RunError::type_err("'super' used outside of a method"))?;
        let class = self.heap.class_of(slf);
        let Some(block) = self.classes.find_method_in_parent(class, selector) else {
            return Err(RunError::dnu("super", selector));
        };
        self.execute_block(block, args, Some(slf))
    }

    // ----- the value ladder -----

    fn send_value(&mut self, receiver: Value, selector: &str, args: &[Value]) -> RunResult<Value> {
        // block `value…` shortcut
        if let Some((block, captured)) = self.heap.as_block(receiver)
            && is_value_selector(selector)
            && self.program.block(block).arity() == args.len()
        {
            return self.execute_block(block, args, captured);
        }

        // boolean control messages
        if matches!(receiver, Value::True | Value::False)
            && let Some(result) = self.boolean_control(receiver, selector, args)?
        {
            return Ok(result);
        }

        // loops
        if selector == "whileTrue:" && self.is_block_like(receiver) {
            return self.while_true(receiver, args[0]);
        }
        if selector == "timesRepeat:"
            && let Value::Int(count) = receiver
        {
            return self.times_repeat(count, args[0]);
        }

        // direct print intrinsic for strings
        if selector == "print" && self.heap.as_str(receiver).is_some() {
            return self.print_string(receiver);
        }

        // user-defined methods
        let class = self.heap.class_of(receiver);
        if let Some(block) = self.classes.find_method(class, selector) {
            return self.execute_block(block, args, Some(receiver));
        }

        // delegation to the internal value
        if let Some(internal) = self.heap.internal_value(receiver)
            && DELEGATABLE_SELECTORS.contains(&selector)
        {
            let forwarded = self.unwrap_delegated_args(internal, args);
            return self.send_value(internal, selector, &forwarded);
        }

        // built-in methods
        if let Some(result) = builtins::dispatch(self, receiver, selector, args)? {
            return Ok(result);
        }

        // dynamic attributes
        if let Some(result) = self.attribute_access(receiver, selector, args)? {
            return Ok(result);
        }

        Err(RunError::dnu(self.classes.name(class), selector))
    }

    fn print_string(&mut self, receiver: Value) -> RunResult<Value> {
        let Some(text) = self.heap.as_str(receiver) else {
            return Err(RunError::internal("print intrinsic on a non-string"));
        };
        self.print.write_str(text).map_err(RunError::from)?;
        Ok(receiver)
    }

    fn is_block_like(&self, value: Value) -> bool {
        self.heap.as_block(value).is_some()
            || self
                .heap
                .instance_class(value)
                .is_some_and(|class| self.classes.is_same_or_ancestor(ClassId::BLOCK, class))
    }

    fn boolean_control(&mut self, receiver: Value, selector: &str, args: &[Value]) -> RunResult<Option<Value>> {
        let truthy = receiver == Value::True;
        match selector {
            "ifTrue:ifFalse:" => {
                let chosen = if truthy { args[0] } else { args[1] };
                self.invoke_value(chosen).map(Some)
            }
            "and:" => {
                if truthy {
                    self.invoke_value(args[0]).map(Some)
                } else {
                    Ok(Some(Value::False))
                }
            }
            "or:" => {
                if truthy {
                    Ok(Some(Value::True))
                } else {
                    self.invoke_value(args[0]).map(Some)
                }
            }
            _ => Ok(None),
        }
    }

    fn while_true(&mut self, condition: Value, body: Value) -> RunResult<Value> {
        while self.invoke_value(condition)? == Value::True {
            self.invoke_value(body)?;
        }
        Ok(Value::Nil)
    }

    fn times_repeat(&mut self, count: i64, body: Value) -> RunResult<Value> {
        for i in 1..=count {
            self.invoke_value_with(body, Value::Int(i))?;
        }
        Ok(Value::Nil)
    }

    // ----- `value`-like invocation helper -----

    /// Invokes a thunk target as if by `value`.
    fn invoke_value(&mut self, target: Value) -> RunResult<Value> {
        self.invoke(target, "value", &[])
    }

    /// Invokes a thunk target as if by `value:`, piping one value in.
    fn invoke_value_with(&mut self, target: Value, piped: Value) -> RunResult<Value> {
        self.invoke(target, "value:", &[piped])
    }

    fn invoke(&mut self, target: Value, selector: &str, args: &[Value]) -> RunResult<Value> {
        if let Some((block, captured)) = self.heap.as_block(target) {
            return self.run_thunk(block, captured, args);
        }
        if self.responds_to_value(target, selector) {
            return self.send_value(target, selector, args);
        }
        // An instance wrapping a block is invocable through its internal
        // value, unless a user `value` method took precedence above.
        if let Some(inner) = self.heap.internal_value(target)
            && let Some((block, captured)) = self.heap.as_block(inner)
        {
            return self.run_thunk(block, captured, args);
        }
        Err(RunError::type_err(format!(
            "{} does not respond to '{selector}'",
            self.classes.name(self.heap.class_of(target))
        )))
    }

    fn run_thunk(&mut self, block: BlockId, captured: Option<Value>, args: &[Value]) -> RunResult<Value> {
        let arity = self.program.block(block).arity();
        if arity != args.len() {
            return Err(RunError::type_err(format!(
                "expected a block with {} parameter(s), found one with {arity}",
                args.len()
            )));
        }
        self.execute_block(block, args, captured)
    }

    /// Decides up front whether a non-block target can answer `value`, so a
    /// do-not-understand raised *inside* a user `value` method is never
    /// masked by the type-error rewrite.
    fn responds_to_value(&self, target: Value, selector: &str) -> bool {
        let class = self.heap.class_of(target);
        if self.classes.find_method(class, selector).is_some() {
            return true;
        }
        selector == "value"
            && self
                .heap
                .attrs(target)
                .is_some_and(|attrs| attrs.contains_key("value"))
    }

    // ----- delegation support -----

    /// Arguments that wrap a primitive of the same kind as the receiver's
    /// internal value are unwrapped before forwarding.
    fn unwrap_delegated_args(&self, internal: Value, args: &[Value]) -> SmallVec<[Value; 4]> {
        let internal_kind = self.heap.kind_of(internal);
        args.iter()
            .map(|&arg| match self.heap.internal_value(arg) {
                Some(inner) if self.heap.kind_of(inner) == internal_kind => inner,
                _ => arg,
            })
            .collect()
    }

    // ----- dynamic attributes -----

    fn attribute_access(&mut self, receiver: Value, selector: &str, args: &[Value]) -> RunResult<Option<Value>> {
        let (name, is_setter) = match selector.find(':') {
            None => (selector, false),
            Some(i) if i == selector.len() - 1 => (&selector[..i], true),
            // Multi-keyword selectors are never attribute accesses.
            Some(_) => return Ok(None),
        };
        if name.is_empty() {
            return Ok(None);
        }
        if builtins::collides_with_builtin(self.heap.kind_of(receiver), name) {
            return Err(RunError::type_err(format!(
                "attribute '{name}' collides with a built-in method of {}",
                self.classes.name(self.heap.class_of(receiver))
            )));
        }
        let class = self.heap.class_of(receiver);
        let setter_form = format!("{name}:");
        if self.classes.find_method(class, name).is_some()
            || self.classes.find_method(class, &setter_form).is_some()
        {
            return Err(RunError::type_err(format!(
                "attribute '{name}' would shadow a method of class {}",
                self.classes.name(class)
            )));
        }
        if is_setter {
            // Integers have no attribute storage; the write is accepted and
            // dropped, matching their value-copy semantics.
            if let Some(attrs) = self.heap.attrs_mut(receiver) {
                attrs.insert(name.to_owned(), args[0]);
            }
            return Ok(Some(receiver));
        }
        Ok(self.heap.attrs(receiver).and_then(|attrs| attrs.get(name)).copied())
    }
}
