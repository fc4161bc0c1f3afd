//! Lazy numeric stream contract.
//!
//! # Responsibility
//! - Define the pull protocol shared by every `i32` code stream.
//! - Provide an eager builder for finite streams assembled by callers.
//!
//! # Invariants
//! - Exhaustion is signalled by `ExhaustedSequenceError`, never by a panic.
//! - Operators (map/filter/reduce) are not part of this contract.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::iter::FusedIterator;

/// End-of-data signal for a stream pulled past its last element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExhaustedSequenceError;

impl Display for ExhaustedSequenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sequence has no more elements")
    }
}

impl Error for ExhaustedSequenceError {}

/// Pull-based stream of numeric codes.
///
/// Every `Iterator<Item = i32>` is an `IntStream`; the explicit pull method
/// turns `None` into an `ExhaustedSequenceError` for callers that want the
/// error-shaped end-of-data signal.
pub trait IntStream: Iterator<Item = i32> {
    fn next_int(&mut self) -> Result<i32, ExhaustedSequenceError> {
        self.next().ok_or(ExhaustedSequenceError)
    }
}

impl<I> IntStream for I where I: Iterator<Item = i32> + ?Sized {}

/// Accumulates codes and builds a finite stream over them.
///
/// `build` consumes the builder, so no value can be accepted after the
/// stream exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntStreamBuilder {
    values: Vec<i32>,
}

impl IntStreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one value.
    pub fn accept(&mut self, value: i32) {
        self.values.push(value);
    }

    /// Appends one value and returns the builder for chaining.
    pub fn add(mut self, value: i32) -> Self {
        self.accept(value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Finishes the builder.
    pub fn build(self) -> BuiltIntStream {
        BuiltIntStream {
            inner: self.values.into_iter(),
        }
    }
}

impl Extend<i32> for IntStreamBuilder {
    fn extend<T: IntoIterator<Item = i32>>(&mut self, iter: T) {
        self.values.extend(iter);
    }
}

/// Finite stream produced by `IntStreamBuilder::build`.
#[derive(Debug, Clone)]
pub struct BuiltIntStream {
    inner: std::vec::IntoIter<i32>,
}

impl Iterator for BuiltIntStream {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for BuiltIntStream {}

impl FusedIterator for BuiltIntStream {}

#[cfg(test)]
mod tests {
    use super::{ExhaustedSequenceError, IntStream, IntStreamBuilder};

    #[test]
    fn builder_preserves_insertion_order() {
        let mut builder = IntStreamBuilder::new().add(3).add(1);
        builder.accept(2);
        assert_eq!(builder.len(), 3);

        let values: Vec<i32> = builder.build().collect();
        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn next_int_signals_exhaustion_repeatedly() {
        let mut stream = IntStreamBuilder::new().add(7).build();
        assert_eq!(stream.next_int(), Ok(7));
        assert_eq!(stream.next_int(), Err(ExhaustedSequenceError));
        assert_eq!(stream.next_int(), Err(ExhaustedSequenceError));
    }

    #[test]
    fn empty_builder_builds_empty_stream() {
        let builder = IntStreamBuilder::new();
        assert!(builder.is_empty());
        let mut stream = builder.build();
        assert_eq!(stream.len(), 0);
        assert_eq!(stream.next_int(), Err(ExhaustedSequenceError));
    }

    #[test]
    fn any_i32_iterator_is_an_int_stream() {
        let mut range = 0..2;
        assert_eq!(range.next_int(), Ok(0));
        assert_eq!(range.next_int(), Ok(1));
        assert!(range.next_int().is_err());
    }
}
