//! Capability runtime with default-method injection.
//!
//! Two layers share one vocabulary:
//! - `lang`: statically typed traits whose provided methods are the defaults
//!   (`CharSequence::chars`, `IntStream::next_int`).
//! - `capability`: a runtime registry that patches default operations into
//!   per-type dispatch tables when a type declares conformance.

pub mod capability;
pub mod lang;
pub mod logging;

pub use capability::definition::{CapabilityDefinition, DefinitionError};
pub use capability::dispatch::{ConcreteType, DispatchTable, SealedType, SlotOrigin};
pub use capability::global::{bootstrap, global_registry, with_global_registry};
pub use capability::registry::{
    Capability, CapabilityError, CapabilityRegistry, CapabilitySummary, OperationSummary,
    RegistrySnapshot, TypeSummary,
};
pub use capability::signature::{Signature, ValueKind};
pub use capability::stream::{CodeStream, PullError};
pub use capability::value::{Instance, InvokeError, Operation, Value};
pub use lang::appendable::{AppendError, Appendable};
pub use lang::auto_closeable::{with_resource, AutoCloseable, CloseError, Closing, ScopedError};
pub use lang::capabilities::{
    install_lang_capabilities, APPENDABLE, AUTO_CLOSEABLE, CHAR_SEQUENCE,
};
pub use lang::char_sequence::{CharSequence, Chars, CodeUnit};
pub use lang::class::Class;
pub use lang::stream::{BuiltIntStream, ExhaustedSequenceError, IntStream, IntStreamBuilder};
pub use logging::{default_log_level, init_logging, logging_status};

/// Minimal health-check API for smoke probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
