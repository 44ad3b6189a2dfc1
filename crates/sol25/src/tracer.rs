//! Execution tracing hooks.
//!
//! A [`Tracer`] receives a callback for every message send before it is
//! dispatched. The CLI wires [`StderrTracer`] behind `--trace`; everything
//! else runs with [`NoopTracer`].

/// Observer for interpreter execution.
pub trait Tracer {
    /// Whether the dispatcher should spend time describing receivers.
    fn is_active(&self) -> bool {
        true
    }

    /// Called once per message send, before dispatch. `depth` is the number
    /// of frames on the call stack.
    fn message_send(&mut self, depth: usize, receiver: &str, selector: &str);
}

/// Tracer that does nothing; dispatch skips receiver formatting entirely.
#[derive(Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn is_active(&self) -> bool {
        false
    }

    fn message_send(&mut self, _depth: usize, _receiver: &str, _selector: &str) {}
}

/// Tracer that writes one indented line per message send to stderr.
#[derive(Debug, Default)]
pub struct StderrTracer;

impl Tracer for StderrTracer {
    fn message_send(&mut self, depth: usize, receiver: &str, selector: &str) {
        eprintln!("{:indent$}{receiver} {selector}", "", indent = depth * 2);
    }
}
