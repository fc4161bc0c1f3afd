//! Character sequence capability and its lazy code adapter.
//!
//! # Responsibility
//! - Define the required `char_at`/`length` contract.
//! - Provide `chars()` as a default method shared by every implementer.
//!
//! # Invariants
//! - `chars()` never materializes the sequence; it keeps an index and a flag.
//! - Each pulled element reflects `char_at` at the moment of the pull.
//! - `char_at` is never called with an index at or past `length()`.
//! - Once exhausted, a `Chars` stream stays exhausted.

use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

/// One UTF-16 code unit. Values are opaque; no decoding happens here.
pub type CodeUnit = u16;

/// Read-only, index-addressable sequence of code units.
pub trait CharSequence {
    /// Returns the code unit at `index`.
    ///
    /// Callers guarantee `index < self.length()`.
    fn char_at(&self, index: usize) -> CodeUnit;

    fn length(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Returns a fresh lazy stream over this sequence's code units.
    fn chars(&self) -> Chars<'_, Self> {
        Chars::new(self)
    }
}

impl CharSequence for [CodeUnit] {
    fn char_at(&self, index: usize) -> CodeUnit {
        self[index]
    }

    fn length(&self) -> usize {
        self.len()
    }
}

impl CharSequence for Vec<CodeUnit> {
    fn char_at(&self, index: usize) -> CodeUnit {
        self[index]
    }

    fn length(&self) -> usize {
        self.len()
    }
}

impl<S> CharSequence for &S
where
    S: CharSequence + ?Sized,
{
    fn char_at(&self, index: usize) -> CodeUnit {
        (**self).char_at(index)
    }

    fn length(&self) -> usize {
        (**self).length()
    }
}

/// Lazy stream of codes backed by a borrowed `CharSequence`.
pub struct Chars<'a, S: ?Sized> {
    source: &'a S,
    next_index: usize,
    exhausted: bool,
}

impl<'a, S> Chars<'a, S>
where
    S: CharSequence + ?Sized,
{
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            next_index: 0,
            exhausted: false,
        }
    }

    /// Returns whether the next pull would yield an element.
    pub fn has_next(&self) -> bool {
        !self.exhausted && self.next_index < self.source.length()
    }

    /// Number of elements pulled so far.
    pub fn position(&self) -> usize {
        self.next_index
    }
}

impl<S> Iterator for Chars<'_, S>
where
    S: CharSequence + ?Sized,
{
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.exhausted {
            return None;
        }
        if self.next_index >= self.source.length() {
            self.exhausted = true;
            return None;
        }
        let code = i32::from(self.source.char_at(self.next_index));
        self.next_index += 1;
        Some(code)
    }
}

impl<S> FusedIterator for Chars<'_, S> where S: CharSequence + ?Sized {}

impl<S: ?Sized> Clone for Chars<'_, S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            next_index: self.next_index,
            exhausted: self.exhausted,
        }
    }
}

impl<S: ?Sized> Debug for Chars<'_, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chars")
            .field("next_index", &self.next_index)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::CharSequence;
    use crate::lang::stream::{ExhaustedSequenceError, IntStream};
    use std::cell::{Cell, RefCell};

    const WORD: [u16; 4] = [119, 111, 114, 100];

    struct Word;

    impl CharSequence for Word {
        fn char_at(&self, index: usize) -> u16 {
            WORD[index]
        }

        fn length(&self) -> usize {
            WORD.len()
        }
    }

    /// Counts `char_at` calls so laziness is observable.
    struct Counting {
        units: Vec<u16>,
        reads: Cell<usize>,
    }

    impl CharSequence for Counting {
        fn char_at(&self, index: usize) -> u16 {
            self.reads.set(self.reads.get() + 1);
            self.units[index]
        }

        fn length(&self) -> usize {
            self.units.len()
        }
    }

    #[test]
    fn word_yields_codes_then_exhausts() {
        let word = Word;
        let mut chars = word.chars();
        for expected in [119, 111, 114, 100] {
            assert_eq!(chars.next_int(), Ok(expected));
        }
        assert_eq!(chars.next_int(), Err(ExhaustedSequenceError));
        assert_eq!(chars.next_int(), Err(ExhaustedSequenceError));
    }

    #[test]
    fn empty_slice_exhausts_on_first_pull() {
        let empty: &[u16] = &[];
        assert!(CharSequence::is_empty(empty));
        let mut chars = empty.chars();
        assert!(!chars.has_next());
        assert_eq!(chars.next(), None);
    }

    #[test]
    fn creating_a_stream_reads_nothing() {
        let source = Counting {
            units: vec![1, 2, 3],
            reads: Cell::new(0),
        };
        let mut chars = source.chars();
        assert_eq!(source.reads.get(), 0);

        assert_eq!(chars.next(), Some(1));
        assert_eq!(source.reads.get(), 1);
        assert_eq!(chars.position(), 1);
    }

    #[test]
    fn pulls_observe_mutation_without_snapshot() {
        struct Shared(RefCell<Vec<u16>>);

        impl CharSequence for Shared {
            fn char_at(&self, index: usize) -> u16 {
                self.0.borrow()[index]
            }

            fn length(&self) -> usize {
                self.0.borrow().len()
            }
        }

        let shared = Shared(RefCell::new(vec![10, 20]));
        let mut chars = shared.chars();
        assert_eq!(chars.next(), Some(10));

        shared.0.borrow_mut()[1] = 99;
        shared.0.borrow_mut().push(30);
        assert_eq!(chars.next(), Some(99));
        assert_eq!(chars.next(), Some(30));
        assert_eq!(chars.next(), None);

        shared.0.borrow_mut().push(40);
        assert_eq!(chars.next(), None);
        assert!(!chars.has_next());
    }

    #[test]
    fn cloned_stream_continues_independently() {
        let units: Vec<u16> = vec![5, 6, 7];
        let mut first = units.chars();
        assert_eq!(first.next(), Some(5));

        let second = first.clone();
        assert_eq!(first.collect::<Vec<_>>(), vec![6, 7]);
        assert_eq!(second.collect::<Vec<_>>(), vec![6, 7]);
    }
}
