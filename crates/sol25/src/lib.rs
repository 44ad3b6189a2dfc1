//! A tree-walking interpreter for SOL25, a small pure-object language in
//! the Smalltalk family.
//!
//! The input is an already-parsed abstract syntax tree supplied as an XML
//! document. [`Runner::new`] reads the document, registers classes, and
//! validates the `Main`/`run` entry point; [`Runner::run`] then walks the
//! tree, dispatching messages over the closed value model (`nil`, `true`,
//! `false`, Integer, String, Block, and user instances).
//!
//! Standard streams are injected: `print` output goes through a
//! [`PrintWriter`] and `String read` lines come from a [`LineReader`], so
//! hosts and tests can capture or supply both.

mod builtins;
mod classes;
mod dispatch;
mod error;
mod expressions;
mod frame;
mod heap;
mod interp;
mod io;
mod parse;
mod run;
mod tracer;
mod value;

pub use crate::{
    error::{ErrorKind, Exception},
    io::{CollectStringPrint, EmptyInput, LineReader, NoPrint, PrintWriter, StdInput, StdPrint, StringInput},
    run::{Object, Runner},
    tracer::{NoopTracer, StderrTracer, Tracer},
};
