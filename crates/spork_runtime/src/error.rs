//! Runtime errors and the fatal-error channel.
//!
//! Every error in this crate is a programming error: the heap cannot be trusted
//! after one of them, so the public contract is to terminate. `try_*` and
//! `check_*` methods expose the same conditions as values for callers that want
//! to inspect them before committing.

use thiserror::Error;

use crate::memory::ValueRef;
use crate::value::ValueType;

pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("out of memory: failed to reserve {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("stack underflow: pop from an empty root stack")]
    StackUnderflow,

    #[error("stack overflow: root stack limit of {limit} entries reached")]
    StackOverflow { limit: usize },

    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    #[error("use of free slot {slot}")]
    FreeSlot { slot: ValueRef },
}

/// Report `err` and terminate.
///
/// Panics rather than calling `std::process::abort` directly so unit tests can
/// observe the message; release builds use `panic = "abort"`.
#[cold]
#[track_caller]
pub fn fatal(err: RuntimeError) -> ! {
    tracing::error!(error = %err, "fatal runtime error");
    panic!("{err}");
}

pub trait OrFatal<T> {
    /// Unwrap the value or route the error through [`fatal`].
    fn or_fatal(self) -> T;
}

impl<T> OrFatal<T> for Result<T> {
    #[track_caller]
    fn or_fatal(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => fatal(err),
        }
    }
}
