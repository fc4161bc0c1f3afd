use langcompat_core::{
    AppendError, Appendable, CharSequence, Class, CodeUnit, ExhaustedSequenceError, IntStream,
    IntStreamBuilder,
};
use std::cell::{Cell, RefCell};

/// Implements only the two required methods.
struct Word {
    units: Vec<CodeUnit>,
    char_at_calls: Cell<usize>,
}

impl Word {
    fn new(text: &str) -> Self {
        Self {
            units: text.encode_utf16().collect(),
            char_at_calls: Cell::new(0),
        }
    }
}

impl CharSequence for Word {
    fn char_at(&self, index: usize) -> CodeUnit {
        self.char_at_calls.set(self.char_at_calls.get() + 1);
        self.units[index]
    }

    fn length(&self) -> usize {
        self.units.len()
    }
}

/// Sequence whose contents change between pulls.
struct Shared {
    units: RefCell<Vec<CodeUnit>>,
}

impl CharSequence for Shared {
    fn char_at(&self, index: usize) -> CodeUnit {
        self.units.borrow()[index]
    }

    fn length(&self) -> usize {
        self.units.borrow().len()
    }
}

#[test]
fn word_streams_codes_then_reports_exhaustion() {
    let word = Word::new("word");
    let mut chars = word.chars();

    for expected in [119, 111, 114, 100] {
        assert_eq!(chars.next_int(), Ok(expected));
    }
    assert_eq!(chars.next_int(), Err(ExhaustedSequenceError));
    assert_eq!(chars.next_int(), Err(ExhaustedSequenceError));
}

#[test]
fn creating_a_stream_reads_nothing() {
    let word = Word::new("lazy");
    let mut chars = word.chars();
    assert_eq!(word.char_at_calls.get(), 0);

    chars.next();
    assert_eq!(word.char_at_calls.get(), 1);
    assert_eq!(chars.position(), 1);
}

#[test]
fn each_call_returns_an_independent_stream() {
    let word = Word::new("ab");
    let mut first = word.chars();
    first.next();

    let second: Vec<i32> = word.chars().collect();
    assert_eq!(second, vec![97, 98]);
    assert_eq!(first.collect::<Vec<_>>(), vec![98]);
}

#[test]
fn fresh_stream_after_full_consumption_repeats_the_sequence() {
    let word = Word::new("word");
    let mut first = word.chars();
    let drained: Vec<i32> = first.by_ref().collect();
    assert_eq!(first.next_int(), Err(ExhaustedSequenceError));

    let again: Vec<i32> = word.chars().collect();
    assert_eq!(drained, vec![119, 111, 114, 100]);
    assert_eq!(again, drained);
}

#[test]
fn pulls_observe_current_contents() {
    let shared = Shared {
        units: RefCell::new(vec![1, 2]),
    };
    let mut chars = shared.chars();
    assert_eq!(chars.next(), Some(1));

    shared.units.borrow_mut()[1] = 9;
    shared.units.borrow_mut().push(10);
    assert_eq!(chars.next(), Some(9));
    assert_eq!(chars.next(), Some(10));
    assert_eq!(chars.next(), None);

    shared.units.borrow_mut().push(11);
    assert!(!chars.has_next());
    assert_eq!(chars.next(), None);
}

#[test]
fn shrinking_source_ends_the_stream_without_out_of_range_reads() {
    let shared = Shared {
        units: RefCell::new(vec![1, 2, 3]),
    };
    let mut chars = shared.chars();
    assert_eq!(chars.next(), Some(1));

    shared.units.borrow_mut().truncate(1);
    assert_eq!(chars.next(), None);
}

#[test]
fn empty_sequences_yield_nothing() {
    let empty: Vec<CodeUnit> = Vec::new();
    assert!(CharSequence::is_empty(&empty));
    assert_eq!(empty.chars().next_int(), Err(ExhaustedSequenceError));
    assert_eq!(Class::for_name("").chars().count(), 0);
}

#[test]
fn appendable_sink_accepts_every_overload() -> Result<(), AppendError> {
    let word = Word::new("word");
    let mut sink: Vec<CodeUnit> = Vec::new();
    sink.append_seq(&word)?
        .append_char(u16::from(b'-'))?
        .append_range(&word, 1, 3)?;
    assert_eq!(String::from_utf16_lossy(&sink), "word-or");

    let err = sink.append_range(&word, 3, 9).expect_err("end past length");
    assert_eq!(
        err,
        AppendError::RangeOutOfBounds {
            start: 3,
            end: 9,
            length: 4,
        }
    );
    Ok(())
}

#[test]
fn class_is_a_char_sequence_of_its_name() {
    let class = Class::of::<Vec<u16>>();
    assert_eq!(class.simple_name(), "Vec<u16>");
    let decoded: String = class
        .chars()
        .map(|code| char::from_u32(code as u32).unwrap_or('?'))
        .collect();
    assert_eq!(decoded, class.name());
}

#[test]
fn builder_stream_follows_the_same_pull_protocol() {
    let mut builder = IntStreamBuilder::new();
    builder.extend(Word::new("ok").chars());
    let mut stream = builder.add(33).build();

    assert_eq!(stream.next_int(), Ok(111));
    assert_eq!(stream.next_int(), Ok(107));
    assert_eq!(stream.next_int(), Ok(33));
    assert!(stream.next_int().is_err());
}
