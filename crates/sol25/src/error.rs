use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;

/// Result type alias for operations that can raise a SOL25-level error.
pub(crate) type RunResult<T> = Result<T, RunError>;

/// The closed set of SOL25 error kinds.
///
/// Each kind carries a stable numeric code used as the process exit status;
/// the codes do not change between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The program has no `Main` class with a parameterless `run` method.
    #[strum(serialize = "missing Main")]
    MissingMain,
    /// A variable, parameter, or class name was read but never defined.
    #[strum(serialize = "undefined name")]
    UndefinedName,
    /// A method selector's arity disagrees with the arity of its block.
    #[strum(serialize = "selector arity mismatch")]
    SelectorArity,
    /// An assignment targets a parameter or a reserved name.
    #[strum(serialize = "name collision")]
    NameCollision,
    /// A selector was not understood by its receiver.
    #[strum(serialize = "does not understand")]
    DoesNotUnderstand,
    /// Malformed AST, misuse of `self`/`super`, attribute/method collision,
    /// or a `value` send to something that is not invocable.
    #[strum(serialize = "type error")]
    TypeError,
    /// A well-typed message with an unusable operand, such as arithmetic on a
    /// non-Integer, an incompatible `from:` source, or division by zero.
    #[strum(serialize = "value error")]
    ValueError,
    /// An interpreter invariant was violated.
    #[strum(serialize = "internal error")]
    Internal,
}

impl ErrorKind {
    /// Returns the stable numeric code for this kind.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::MissingMain => 31,
            Self::UndefinedName => 32,
            Self::SelectorArity => 33,
            Self::NameCollision => 34,
            Self::DoesNotUnderstand => 51,
            Self::TypeError => 52,
            Self::ValueError => 53,
            Self::Internal => 99,
        }
    }
}

/// Internal error carrier, propagated with `?` through the interpreter.
///
/// Converted into the public [`Exception`] at the `Runner` boundary.
#[derive(Debug, Clone)]
pub(crate) struct RunError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RunError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A receiver did not understand a selector.
    pub fn dnu(receiver: &str, selector: &str) -> Self {
        Self::new(
            ErrorKind::DoesNotUnderstand,
            format!("{receiver} does not understand '{selector}'"),
        )
    }

    pub fn undefined(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedName, format!("undefined variable '{name}'"))
    }

    pub fn type_err(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn value_err(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValueError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<Exception> for RunError {
    fn from(exception: Exception) -> Self {
        Self::new(exception.kind, exception.message)
    }
}

/// Public error type returned by [`crate::Runner`].
///
/// Carries the error kind and a rendered message; `exit_code()` yields the
/// stable numeric code the CLI maps to the process exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    kind: ErrorKind,
    message: String,
}

impl Exception {
    /// Creates a new exception.
    ///
    /// Public so that host-provided [`crate::PrintWriter`] and
    /// [`crate::LineReader`] implementations can report failures.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The kind of error that occurred.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The rendered error message, without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The stable numeric code for the process exit status.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.kind.code()
    }
}

impl From<RunError> for Exception {
    fn from(error: RunError) -> Self {
        Self::new(error.kind, error.message)
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Exception {}
