//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `langcompat_core` linkage and the default-injection path.
//! - Keep output deterministic for quick local sanity checks.

use langcompat_core::capability::value::{int_arg, InvokeError, Operation, Value};
use langcompat_core::lang::capabilities::{char_at_signature, length_signature, CHARS};
use langcompat_core::{bootstrap, with_global_registry, ConcreteType, CHAR_SEQUENCE};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("langcompat_core ping={}", langcompat_core::ping());
    println!("langcompat_core version={}", langcompat_core::core_version());

    let text = std::env::args().nth(1).unwrap_or_else(|| "word".to_string());
    match run(&text) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("langcompat_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(text: &str) -> Result<(), String> {
    bootstrap().map_err(|err| err.to_string())?;

    let units: Vec<u16> = text.encode_utf16().collect();
    let sealed = with_global_registry(|registry| {
        registry.declare_type(word_type(), &[CHAR_SEQUENCE])
    })
    .map_err(|err| err.to_string())?;

    let stream = sealed
        .instantiate(units)
        .invoke(CHARS, &[])
        .map_err(|err| err.to_string())?
        .into_stream()
        .ok_or_else(|| "chars() did not return a stream".to_string())?;
    let codes = stream
        .collect::<Result<Vec<i32>, InvokeError>>()
        .map_err(|err| err.to_string())?;
    println!("chars={codes:?}");

    let snapshot = with_global_registry(|registry| registry.snapshot());
    let json = serde_json::to_string_pretty(&snapshot).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}

/// `Word` supplies only `charAt` and `length`; `chars` comes from the
/// capability default.
fn word_type() -> ConcreteType {
    ConcreteType::new("Word")
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
