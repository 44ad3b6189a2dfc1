//! Standard-stream abstractions.
//!
//! The interpreter never touches `stdin`/`stdout` directly: `print` goes
//! through a [`PrintWriter`] and `String read` through a [`LineReader`], so
//! hosts and tests can capture or supply the streams.

use std::io::{self, BufRead, Write};

use crate::error::{ErrorKind, Exception};

/// Trait for handling output from the `print` built-in.
///
/// Implement this trait to capture or redirect print output. The default
/// implementation [`StdPrint`] writes to stdout.
pub trait PrintWriter {
    /// Writes one printed string, byte for byte, with no added separators
    /// or terminator.
    fn write_str(&mut self, output: &str) -> Result<(), Exception>;
}

/// Default `PrintWriter` that writes straight to stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn write_str(&mut self, output: &str) -> Result<(), Exception> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(output.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|err| Exception::new(ErrorKind::Internal, format!("stdout write failed: {err}")))
    }
}

/// A `PrintWriter` that collects all output into a string.
///
/// Useful for testing or capturing print output programmatically.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected output so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.0
    }

    /// Consumes the writer and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn write_str(&mut self, output: &str) -> Result<(), Exception> {
        self.0.push_str(output);
        Ok(())
    }
}

/// `PrintWriter` that ignores all output.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn write_str(&mut self, _output: &str) -> Result<(), Exception> {
        Ok(())
    }
}

/// Trait for supplying input lines to `String read`.
///
/// A returned line never contains its trailing newline; `None` signals end
/// of input (the interpreter maps it to an empty SOL25 String).
pub trait LineReader {
    fn read_line(&mut self) -> Result<Option<String>, Exception>;
}

/// Default `LineReader` backed by stdin.
#[derive(Debug, Default)]
pub struct StdInput;

impl LineReader for StdInput {
    fn read_line(&mut self) -> Result<Option<String>, Exception> {
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|err| Exception::new(ErrorKind::Internal, format!("stdin read failed: {err}")))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(strip_newline(line)))
    }
}

/// A `LineReader` over a fixed string, for tests and embedding.
#[derive(Debug, Default)]
pub struct StringInput {
    remaining: String,
}

impl StringInput {
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            remaining: input.into(),
        }
    }
}

impl LineReader for StringInput {
    fn read_line(&mut self) -> Result<Option<String>, Exception> {
        if self.remaining.is_empty() {
            return Ok(None);
        }
        let line = match self.remaining.find('\n') {
            Some(end) => self.remaining.drain(..=end).collect(),
            None => std::mem::take(&mut self.remaining),
        };
        Ok(Some(strip_newline(line)))
    }
}

/// A `LineReader` that is always at end of input.
#[derive(Debug, Default)]
pub struct EmptyInput;

impl LineReader for EmptyInput {
    fn read_line(&mut self) -> Result<Option<String>, Exception> {
        Ok(None)
    }
}

fn strip_newline(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
