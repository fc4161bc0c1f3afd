//! Appendable sink capability.

use crate::lang::char_sequence::{CharSequence, CodeUnit};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sink accepting code units, sub-ranges, and whole sequences.
///
/// Every append returns the sink so calls chain with `?`.
pub trait Appendable {
    fn append_char(&mut self, unit: CodeUnit) -> Result<&mut Self, AppendError>;

    /// Appends `csq[start..end]`.
    ///
    /// Fails with `AppendError::RangeOutOfBounds` unless
    /// `start <= end <= csq.length()`.
    fn append_range<S>(
        &mut self,
        csq: &S,
        start: usize,
        end: usize,
    ) -> Result<&mut Self, AppendError>
    where
        S: CharSequence + ?Sized;

    fn append_seq<S>(&mut self, csq: &S) -> Result<&mut Self, AppendError>
    where
        S: CharSequence + ?Sized;
}

/// Checks a half-open sub-range against a sequence length.
pub fn check_range(start: usize, end: usize, length: usize) -> Result<(), AppendError> {
    if start > end || end > length {
        return Err(AppendError::RangeOutOfBounds { start, end, length });
    }
    Ok(())
}

impl Appendable for Vec<CodeUnit> {
    fn append_char(&mut self, unit: CodeUnit) -> Result<&mut Self, AppendError> {
        self.push(unit);
        Ok(self)
    }

    fn append_range<S>(
        &mut self,
        csq: &S,
        start: usize,
        end: usize,
    ) -> Result<&mut Self, AppendError>
    where
        S: CharSequence + ?Sized,
    {
        check_range(start, end, csq.length())?;
        self.extend((start..end).map(|index| csq.char_at(index)));
        Ok(self)
    }

    fn append_seq<S>(&mut self, csq: &S) -> Result<&mut Self, AppendError>
    where
        S: CharSequence + ?Sized,
    {
        // chars() yields widened code units, so narrowing back is lossless.
        self.extend(csq.chars().map(|code| code as CodeUnit));
        Ok(self)
    }
}

/// Append failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendError {
    RangeOutOfBounds {
        start: usize,
        end: usize,
        length: usize,
    },
    Rejected(String),
}

impl Display for AppendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RangeOutOfBounds { start, end, length } => write!(
                f,
                "append range [{start}, {end}) is out of bounds for length {length}"
            ),
            Self::Rejected(reason) => write!(f, "append rejected: {reason}"),
        }
    }
}

impl Error for AppendError {}
