//! The evaluator: walks expression and statement nodes, executes block
//! bodies in frames, and bootstraps the program through `Main#run`.
//!
//! Message sends are handed to the dispatcher (`dispatch.rs`), which calls
//! back into [`Interp::execute_block`] to run selected method bodies.

use smallvec::SmallVec;

use crate::{
    classes::ClassRegistry,
    dispatch::Receiver,
    error::{ErrorKind, RunError, RunResult},
    expressions::{BlockId, Expr, Literal, Program},
    frame::{CallStack, Frame},
    heap::Heap,
    io::{LineReader, PrintWriter},
    tracer::Tracer,
    value::Value,
};

/// One execution of a parsed program.
///
/// Borrows the immutable program and class registry from the `Runner` and
/// owns the per-run state: the heap and the call stack.
pub(crate) struct Interp<'r, P: PrintWriter, R: LineReader, T: Tracer> {
    pub(crate) program: &'r Program,
    pub(crate) classes: &'r ClassRegistry,
    pub(crate) heap: Heap,
    pub(crate) stack: CallStack,
    pub(crate) print: &'r mut P,
    pub(crate) input: &'r mut R,
    pub(crate) tracer: &'r mut T,
}

impl<'r, P: PrintWriter, R: LineReader, T: Tracer> Interp<'r, P, R, T> {
    pub fn new(
        program: &'r Program,
        classes: &'r ClassRegistry,
        print: &'r mut P,
        input: &'r mut R,
        tracer: &'r mut T,
    ) -> Self {
        Self {
            program,
            classes,
            heap: Heap::new(),
            stack: CallStack::new(),
            print,
            input,
            tracer,
        }
    }

    /// Bootstraps the program: allocates a `Main` instance and executes its
    /// `run` method with the instance as `self`.
    pub fn run_main(&mut self) -> RunResult<Value> {
        let main = self
            .classes
            .get("Main")
            .ok_or_else(|| RunError::internal("Main class missing after validation"))?;
        let run = self
            .classes
            .find_method(main, "run")
            .ok_or_else(|| RunError::internal("Main#run missing after validation"))?;
        let instance = self.new_instance(main);
        self.execute_block(run, &[], Some(instance))
    }

    pub(crate) fn evaluate(&mut self, expr: &Expr) -> RunResult<Value> {
        match expr {
            Expr::Literal(literal) => self.evaluate_literal(literal),
            Expr::Var(name) => self.stack.current()?.get(name),
            Expr::Block(block) => {
                let captured = self.stack.current()?.slf();
                Ok(self.heap.alloc_block(*block, captured))
            }
            Expr::Send {
                selector,
                receiver,
                args,
            } => {
                let receiver = self.evaluate_receiver(receiver)?;
                let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                self.send(receiver, selector, &values)
            }
        }
    }

    fn evaluate_literal(&mut self, literal: &Literal) -> RunResult<Value> {
        match literal {
            Literal::Nil => Ok(Value::Nil),
            Literal::True => Ok(Value::True),
            Literal::False => Ok(Value::False),
            Literal::Int(n) => Ok(Value::Int(*n)),
            Literal::Str(text) => Ok(self.heap.alloc_str(text.clone())),
            Literal::Class(name) => Err(RunError::type_err(format!(
                "class literal '{name}' is only valid as a message receiver"
            ))),
        }
    }

    /// Receiver position is special: a class literal resolves to a class
    /// reference and `super` to a sentinel that never becomes a value.
    fn evaluate_receiver(&mut self, expr: &Expr) -> RunResult<Receiver> {
        match expr {
            Expr::Var(name) if name == "super" => Ok(Receiver::Super),
            Expr::Literal(Literal::Class(name)) => self
                .classes
                .get(name)
                .map(Receiver::Class)
                .ok_or_else(|| RunError::undefined(name)),
            _ => Ok(Receiver::Value(self.evaluate(expr)?)),
        }
    }

    /// Executes a block body in a fresh frame.
    ///
    /// `slf` is the method receiver for method invocations, or the captured
    /// `self` for plain block invocations. The frame is popped on every exit
    /// path, error or not.
    pub(crate) fn execute_block(&mut self, block: BlockId, args: &[Value], slf: Option<Value>) -> RunResult<Value> {
        let lit = self.program.block(block);
        if lit.arity() != args.len() {
            return Err(RunError::new(
                ErrorKind::SelectorArity,
                format!(
                    "block with {} parameter(s) invoked with {} argument(s)",
                    lit.arity(),
                    args.len()
                ),
            ));
        }
        let mut frame = Frame::new(slf);
        for (name, value) in lit.parameters.iter().zip(args) {
            frame.define_parameter(name, *value)?;
        }
        self.stack.push(frame);
        let result = self.run_body(block);
        self.stack.pop();
        result
    }

    /// Runs the statements of an already-framed block; the value of the last
    /// statement is the block's result, an empty body yields `nil`.
    fn run_body(&mut self, block: BlockId) -> RunResult<Value> {
        let body = &self.program.block(block).body;
        let mut result = Value::Nil;
        for assign in body {
            let value = self.evaluate(&assign.expr)?;
            self.stack
                .current_mut()?
                .define_or_update_variable(&assign.target, value)?;
            result = value;
        }
        Ok(result)
    }
}
