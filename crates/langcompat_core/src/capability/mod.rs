//! Capability registry and default-method injector.
//!
//! This module lets unrelated dynamically declared types share one canonical
//! implementation of a capability's default operations. Conformance is
//! resolved once, when a type is declared; sealed tables never change.

pub mod definition;
pub mod dispatch;
pub mod global;
pub mod registry;
pub mod signature;
pub mod stream;
pub mod value;
