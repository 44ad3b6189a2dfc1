//! Public interface for running SOL25 programs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    classes::ClassRegistry,
    error::Exception,
    expressions::Program,
    heap::Heap,
    interp::Interp,
    io::{LineReader, PrintWriter, StdInput, StdPrint},
    parse::parse,
    tracer::{NoopTracer, Tracer},
    value::Value,
};

/// Primary interface for running SOL25 programs.
///
/// A `Runner` holds the parsed program and class registry and is immutable
/// after construction. Every `run` builds a fresh heap and call stack, so
/// one `Runner` can execute any number of times.
///
/// # Example
/// ```
/// use sol25::{CollectStringPrint, EmptyInput, Object, Runner};
///
/// let source = r#"
/// <program language="SOL25">
///   <class name="Main" parent="Object">
///     <method selector="run">
///       <block arity="0">
///         <assign order="1">
///           <var name="out"/>
///           <expr>
///             <send selector="print">
///               <expr><literal class="String" value="hello"/></expr>
///             </send>
///           </expr>
///         </assign>
///       </block>
///     </method>
///   </class>
/// </program>"#;
///
/// let runner = Runner::new(source).unwrap();
/// let mut print = CollectStringPrint::new();
/// let result = runner.run(&mut print, &mut EmptyInput).unwrap();
/// assert_eq!(print.output(), "hello");
/// assert_eq!(result, Object::String("hello".to_owned()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    program: Program,
    classes: ClassRegistry,
}

impl Runner {
    /// Parses the XML AST document and validates the `Main`/`run` entry
    /// point.
    ///
    /// # Errors
    /// Returns an [`Exception`] for malformed documents (type error) or a
    /// missing entry point (missing-Main error).
    pub fn new(source: &str) -> Result<Self, Exception> {
        let (program, classes) = parse(source).map_err(Exception::from)?;
        Ok(Self { program, classes })
    }

    /// Runs the program: allocates a `Main` instance and invokes its `run`
    /// method. Returns the value of `run`'s last statement.
    pub fn run(&self, print: &mut impl PrintWriter, input: &mut impl LineReader) -> Result<Object, Exception> {
        self.run_with_tracer(print, input, &mut NoopTracer)
    }

    /// Runs with an execution tracer receiving every message send.
    pub fn run_with_tracer(
        &self,
        print: &mut impl PrintWriter,
        input: &mut impl LineReader,
        tracer: &mut impl Tracer,
    ) -> Result<Object, Exception> {
        let mut interp = Interp::new(&self.program, &self.classes, print, input, tracer);
        let value = interp.run_main().map_err(Exception::from)?;
        Ok(Object::from_value(value, &interp.heap, &self.classes))
    }

    /// Runs against the real standard streams.
    pub fn run_stdio(&self) -> Result<Object, Exception> {
        self.run(&mut StdPrint, &mut StdInput)
    }

    /// Serializes the parsed program to a binary format.
    ///
    /// The data can be stored and later restored with [`Runner::load`],
    /// avoiding a re-parse of the XML document.
    pub fn dump(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Deserializes a runner produced by [`Runner::dump`].
    pub fn load(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

/// An owned SOL25 value returned from execution.
///
/// Heap-backed values are copied out of the run's arena, so an `Object`
/// stays valid after the run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    /// The `nil` singleton.
    Nil,
    /// `true` or `false`.
    Bool(bool),
    /// A 64-bit integer.
    Int(i64),
    /// A string.
    String(String),
    /// A block value; the literal itself is not exposed.
    Block,
    /// A user-class instance, identified by its class name.
    Instance(String),
}

impl Object {
    fn from_value(value: Value, heap: &Heap, classes: &ClassRegistry) -> Self {
        match value {
            Value::Nil => Self::Nil,
            Value::True => Self::Bool(true),
            Value::False => Self::Bool(false),
            Value::Int(n) => Self::Int(n),
            Value::Ref(_) => {
                if let Some(text) = heap.as_str(value) {
                    Self::String(text.to_owned())
                } else if heap.as_block(value).is_some() {
                    Self::Block
                } else {
                    Self::Instance(classes.name(heap.class_of(value)).to_owned())
                }
            }
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Block => f.write_str("a block"),
            Self::Instance(class) => write!(f, "a {class} instance"),
        }
    }
}
