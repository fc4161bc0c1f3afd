//! Lazy code stream over a dynamically dispatched character sequence.
//!
//! # Invariants
//! - Every pull re-dispatches `length()` and `charAt(int)` on the source.
//! - Storage is one index and one flag, whatever the source length.
//! - Once exhausted, the stream stays exhausted.
//! - A failing source operation does not advance `next_int`; the iterator
//!   form yields that failure once and then ends.

use crate::capability::signature::Signature;
use crate::capability::value::{Instance, InvokeError, Value};
use crate::lang::capabilities::{char_at_signature, length_signature, CHAR_AT, LENGTH};
use crate::lang::stream::ExhaustedSequenceError;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::iter::FusedIterator;

/// Pull-based stream of codes produced by the `chars()` default.
pub struct CodeStream {
    source: Instance,
    next_index: usize,
    exhausted: bool,
}

impl CodeStream {
    /// Starts a fresh stream at index zero.
    pub fn over(source: Instance) -> Self {
        Self {
            source,
            next_index: 0,
            exhausted: false,
        }
    }

    pub fn source(&self) -> &Instance {
        &self.source
    }

    /// Number of elements pulled so far.
    pub fn position(&self) -> usize {
        self.next_index
    }

    pub fn has_next(&self) -> Result<bool, InvokeError> {
        if self.exhausted {
            return Ok(false);
        }
        Ok(self.next_index < self.current_length()?)
    }

    /// Pulls the next code.
    pub fn next_int(&mut self) -> Result<i32, PullError> {
        if self.exhausted {
            return Err(PullError::Exhausted(ExhaustedSequenceError));
        }
        if self.next_index >= self.current_length()? {
            self.exhausted = true;
            return Err(PullError::Exhausted(ExhaustedSequenceError));
        }

        let index = i64::try_from(self.next_index).map_err(|_| {
            let detail = format!("index {} exceeds int range", self.next_index);
            unexpected(char_at_signature(), detail)
        })?;
        let code = match self.source.invoke(CHAR_AT, &[Value::Int(index)])? {
            Value::Char(unit) => i32::from(unit),
            other => {
                let detail = format!("expected char, got {}", other.kind());
                return Err(unexpected(char_at_signature(), detail).into());
            }
        };
        self.next_index += 1;
        Ok(code)
    }

    fn current_length(&self) -> Result<usize, InvokeError> {
        match self.source.invoke(LENGTH, &[])? {
            Value::Int(length) => usize::try_from(length)
                .map_err(|_| unexpected(length_signature(), format!("negative length {length}"))),
            other => Err(unexpected(
                length_signature(),
                format!("expected int, got {}", other.kind()),
            )),
        }
    }
}

fn unexpected(operation: Signature, detail: String) -> InvokeError {
    InvokeError::UnexpectedResult { operation, detail }
}

impl Iterator for CodeStream {
    type Item = Result<i32, InvokeError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_int() {
            Ok(code) => Some(Ok(code)),
            Err(PullError::Exhausted(_)) => None,
            Err(PullError::Source(err)) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for CodeStream {}

impl Debug for CodeStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeStream")
            .field("source", &self.source)
            .field("next_index", &self.next_index)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

/// Why a pull produced no code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullError {
    /// Expected end of data.
    Exhausted(ExhaustedSequenceError),
    /// The source's `length()` or `charAt(int)` failed.
    Source(InvokeError),
}

impl PullError {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }
}

impl Display for PullError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted(err) => write!(f, "{err}"),
            Self::Source(err) => write!(f, "source operation failed: {err}"),
        }
    }
}

impl Error for PullError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Exhausted(err) => Some(err),
            Self::Source(err) => Some(err),
        }
    }
}

impl From<InvokeError> for PullError {
    fn from(value: InvokeError) -> Self {
        Self::Source(value)
    }
}

impl From<ExhaustedSequenceError> for PullError {
    fn from(value: ExhaustedSequenceError) -> Self {
        Self::Exhausted(value)
    }
}
