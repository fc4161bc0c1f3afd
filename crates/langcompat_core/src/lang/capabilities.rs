//! Built-in `java.lang` capabilities for the dynamic registry.
//!
//! # Responsibility
//! - Describe `CharSequence`, `Appendable`, and `AutoCloseable` as registry
//!   capabilities, mirroring the static traits in this module's siblings.
//! - Provide the canonical `chars()` default that yields a lazy `CodeStream`.
//!
//! # Invariants
//! - Defaults here use only the owning capability's required operations.

use crate::capability::definition::CapabilityDefinition;
use crate::capability::registry::{CapabilityError, CapabilityRegistry};
use crate::capability::signature::{Signature, ValueKind};
use crate::capability::stream::CodeStream;
use crate::capability::value::{InvokeError, Operation, Value};
use log::info;

/// Character sequence capability name.
pub const CHAR_SEQUENCE: &str = "CharSequence";
/// Appendable sink capability name.
pub const APPENDABLE: &str = "Appendable";
/// Closeable resource capability name.
pub const AUTO_CLOSEABLE: &str = "AutoCloseable";

pub const CHAR_AT: &str = "charAt";
pub const LENGTH: &str = "length";
pub const CHARS: &str = "chars";
pub const IS_EMPTY: &str = "isEmpty";
pub const APPEND: &str = "append";
pub const CLOSE: &str = "close";

pub fn char_at_signature() -> Signature {
    Signature::new(CHAR_AT, &[ValueKind::Int])
}

pub fn length_signature() -> Signature {
    Signature::nullary(LENGTH)
}

pub fn chars_signature() -> Signature {
    Signature::nullary(CHARS)
}

pub fn is_empty_signature() -> Signature {
    Signature::nullary(IS_EMPTY)
}

/// `append(char)`
pub fn append_char_signature() -> Signature {
    Signature::new(APPEND, &[ValueKind::Char])
}

/// `append(object, int, int)`: sub-range `[start, end)` of a sequence.
pub fn append_range_signature() -> Signature {
    Signature::new(APPEND, &[ValueKind::Object, ValueKind::Int, ValueKind::Int])
}

/// `append(object)`: a whole sequence.
pub fn append_seq_signature() -> Signature {
    Signature::new(APPEND, &[ValueKind::Object])
}

pub fn close_signature() -> Signature {
    Signature::nullary(CLOSE)
}

/// `CharSequence { required: charAt(int), length(); default: chars(), isEmpty() }`
pub fn char_sequence_capability() -> CapabilityDefinition {
    CapabilityDefinition::new(CHAR_SEQUENCE)
        .require(char_at_signature())
        .require(length_signature())
        .provide_default(
            chars_signature(),
            Operation::new(|this, _| Ok(Value::Stream(CodeStream::over(this.clone())))),
        )
        .provide_default(
            is_empty_signature(),
            Operation::new(|this, _| match this.invoke(LENGTH, &[])? {
                Value::Int(length) => Ok(Value::Bool(length == 0)),
                other => Err(InvokeError::UnexpectedResult {
                    operation: length_signature(),
                    detail: format!("expected int, got {}", other.kind()),
                }),
            }),
        )
}

/// `Appendable { required: append(char), append(object, int, int), append(object) }`
pub fn appendable_capability() -> CapabilityDefinition {
    CapabilityDefinition::new(APPENDABLE)
        .require(append_char_signature())
        .require(append_range_signature())
        .require(append_seq_signature())
}

/// `AutoCloseable { required: close() }`
pub fn auto_closeable_capability() -> CapabilityDefinition {
    CapabilityDefinition::new(AUTO_CLOSEABLE).require(close_signature())
}

/// Registers the three built-in capabilities, or none of them when any
/// name is already taken.
pub fn install_lang_capabilities(
    registry: &mut CapabilityRegistry,
) -> Result<(), CapabilityError> {
    let definitions = [
        char_sequence_capability(),
        appendable_capability(),
        auto_closeable_capability(),
    ];
    if let Some(taken) = definitions
        .iter()
        .find(|definition| registry.contains_capability(definition.name()))
    {
        return Err(CapabilityError::DuplicateCapability(
            taken.name().to_string(),
        ));
    }
    for definition in definitions {
        registry.define_capability(definition)?;
    }
    info!(
        "event=lang_capabilities_installed module=lang status=ok capabilities={}",
        registry.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        appendable_capability, char_at_signature, install_lang_capabilities, length_signature,
        APPENDABLE, CHARS, CHAR_SEQUENCE, IS_EMPTY,
    };
    use crate::capability::dispatch::ConcreteType;
    use crate::capability::registry::{CapabilityError, CapabilityRegistry};
    use crate::capability::stream::PullError;
    use crate::capability::value::{int_arg, InvokeError, Operation, Value};

    fn units_type(name: &str) -> ConcreteType {
        ConcreteType::new(name)
            .with_operation(
                char_at_signature(),
                Operation::new(|this, args| {
                    let units = this.state::<Vec<u16>>()?;
                    let index = int_arg(args, 0)?;
                    usize::try_from(index)
                        .ok()
                        .and_then(|position| units.get(position))
                        .map(|unit| Value::Char(*unit))
                        .ok_or(InvokeError::IndexOutOfRange {
                            index,
                            length: units.len(),
                        })
                }),
            )
            .with_operation(
                length_signature(),
                Operation::new(|this, _| {
                    let units = this.state::<Vec<u16>>()?;
                    Ok(Value::Int(units.len() as i64))
                }),
            )
    }

    #[test]
    fn installs_three_capabilities_once() {
        let mut registry = CapabilityRegistry::new();
        install_lang_capabilities(&mut registry).expect("first install");
        assert_eq!(
            registry.capability_names(),
            vec!["Appendable", "AutoCloseable", "CharSequence"]
        );

        let err = install_lang_capabilities(&mut registry).expect_err("second install must fail");
        assert_eq!(
            err,
            CapabilityError::DuplicateCapability(CHAR_SEQUENCE.to_string())
        );
    }

    #[test]
    fn chars_default_streams_lazily_and_exhausts() {
        let mut registry = CapabilityRegistry::new();
        install_lang_capabilities(&mut registry).expect("install");
        let word = registry
            .declare_type(units_type("Word"), &[CHAR_SEQUENCE])
            .expect("declare Word")
            .instantiate(vec![119u16, 111, 114, 100]);

        let mut stream = word
            .invoke(CHARS, &[])
            .expect("chars is injected")
            .into_stream()
            .expect("chars returns a stream");
        assert_eq!(stream.position(), 0);
        for expected in [119, 111, 114, 100] {
            assert_eq!(stream.next_int(), Ok(expected));
        }
        for _ in 0..2 {
            let err = stream.next_int().expect_err("pull past end must fail");
            assert!(err.is_exhausted());
        }
    }

    #[test]
    fn is_empty_default_uses_length() {
        let mut registry = CapabilityRegistry::new();
        install_lang_capabilities(&mut registry).expect("install");
        let sealed = registry
            .declare_type(units_type("Units"), &[CHAR_SEQUENCE])
            .expect("declare");

        let empty = sealed.instantiate(Vec::<u16>::new());
        let result = empty.invoke(IS_EMPTY, &[]).expect("isEmpty is injected");
        assert_eq!(result.as_bool(), Some(true));

        let full = sealed.instantiate(vec![1u16]);
        let result = full.invoke(IS_EMPTY, &[]).expect("isEmpty is injected");
        assert_eq!(result.as_bool(), Some(false));
    }

    #[test]
    fn source_failure_surfaces_without_advancing() {
        let mut registry = CapabilityRegistry::new();
        install_lang_capabilities(&mut registry).expect("install");
        let sealed = registry
            .declare_type(units_type("Units"), &[CHAR_SEQUENCE])
            .expect("declare");
        // Wrong state type: every charAt/length dispatch fails.
        let broken = sealed.instantiate("not units");

        let mut stream = broken
            .invoke(CHARS, &[])
            .expect("chars itself does not touch state")
            .into_stream()
            .expect("stream");
        let err = stream.next_int().expect_err("length must fail");
        assert!(matches!(
            err,
            PullError::Source(InvokeError::StateMismatch { .. })
        ));
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn iterating_a_failing_source_ends_after_one_error() {
        let mut registry = CapabilityRegistry::new();
        install_lang_capabilities(&mut registry).expect("install");
        let broken = registry
            .declare_type(units_type("Units"), &[CHAR_SEQUENCE])
            .expect("declare")
            .instantiate(0u8);

        let stream = broken
            .invoke(CHARS, &[])
            .expect("chars")
            .into_stream()
            .expect("stream");
        let pulls: Vec<_> = stream.take(2).collect();
        assert_eq!(pulls.len(), 1);
        assert!(matches!(pulls[0], Err(InvokeError::StateMismatch { .. })));

        let mut stream = broken
            .invoke(CHARS, &[])
            .expect("chars")
            .into_stream()
            .expect("stream");
        assert!(stream.next().is_some());
        assert!(stream.next().is_none());
        assert!(stream.next_int().expect_err("stays ended").is_exhausted());
    }

    #[test]
    fn installation_is_all_or_nothing() {
        let mut registry = CapabilityRegistry::new();
        registry
            .define_capability(appendable_capability())
            .expect("caller registers Appendable first");

        let err = install_lang_capabilities(&mut registry).expect_err("name is taken");
        assert_eq!(
            err,
            CapabilityError::DuplicateCapability(APPENDABLE.to_string())
        );
        assert!(!registry.contains_capability(CHAR_SEQUENCE));
        assert_eq!(registry.len(), 1);
    }
}
