//! Closeable resource capability and scoped acquisition helpers.
//!
//! # Responsibility
//! - Define the `close()` release contract.
//! - Give callers a guaranteed-release discipline for every exit path.
//!
//! # Invariants
//! - A resource held by `Closing` or `with_resource` is closed exactly once.
//! - Close failures are returned to the caller, never retried.
//! - A body error stays primary; a close failure after it is attached as
//!   suppressed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};

/// Resource that releases what it holds on `close()`.
pub trait AutoCloseable {
    fn close(&mut self) -> Result<(), CloseError>;
}

/// Resource release failure.
#[derive(Debug)]
pub struct CloseError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl CloseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for CloseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to close resource: {}", self.message)
    }
}

impl Error for CloseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}

/// Guard that closes its resource when dropped.
///
/// `close()` releases explicitly and surfaces the `CloseError`. When the
/// guard is dropped without that call (early return or panic unwinding), the
/// resource is closed during drop and a close failure is discarded, since the
/// exit that caused the drop is already the primary outcome.
pub struct Closing<R: AutoCloseable> {
    resource: R,
    closed: bool,
}

impl<R: AutoCloseable> Closing<R> {
    pub fn new(resource: R) -> Self {
        Self {
            resource,
            closed: false,
        }
    }

    /// Releases the resource now and reports the outcome.
    pub fn close(mut self) -> Result<(), CloseError> {
        self.closed = true;
        self.resource.close()
    }
}

impl<R: AutoCloseable> Deref for Closing<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.resource
    }
}

impl<R: AutoCloseable> DerefMut for Closing<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.resource
    }
}

impl<R: AutoCloseable> Drop for Closing<R> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.resource.close();
        }
    }
}

/// Outcome of a scoped block that failed in its body, its release, or both.
#[derive(Debug)]
pub enum ScopedError<E> {
    Body {
        error: E,
        suppressed: Option<CloseError>,
    },
    Close(CloseError),
}

impl<E> ScopedError<E> {
    /// Returns the close failure, whether primary or suppressed.
    pub fn close_error(&self) -> Option<&CloseError> {
        match self {
            Self::Body { suppressed, .. } => suppressed.as_ref(),
            Self::Close(err) => Some(err),
        }
    }
}

impl<E: Display> Display for ScopedError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Body {
                error,
                suppressed: Some(close),
            } => write!(f, "{error} (suppressed: {close})"),
            Self::Body {
                error,
                suppressed: None,
            } => write!(f, "{error}"),
            Self::Close(err) => write!(f, "{err}"),
        }
    }
}

impl<E> Error for ScopedError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Body { error, .. } => Some(error),
            Self::Close(err) => Some(err),
        }
    }
}

/// Runs `body` with `resource`, then closes it on every exit path.
pub fn with_resource<R, T, E, F>(resource: R, body: F) -> Result<T, ScopedError<E>>
where
    R: AutoCloseable,
    F: FnOnce(&mut R) -> Result<T, E>,
{
    let mut guard = Closing::new(resource);
    let outcome = body(&mut *guard);
    let closed = guard.close();

    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close)) => Err(ScopedError::Close(close)),
        (Err(error), closed) => Err(ScopedError::Body {
            error,
            suppressed: closed.err(),
        }),
    }
}
