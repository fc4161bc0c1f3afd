//! `java.lang`-shaped capabilities expressed as Rust traits.
//!
//! # Responsibility
//! - Define the static capability traits and their default methods.
//! - Describe the same capabilities for the dynamic registry.
//!
//! # Invariants
//! - No concrete string type lives here; sequences are opaque code units.
//! - Stream operators beyond the pull contract are out of scope.

pub mod appendable;
pub mod auto_closeable;
pub mod capabilities;
pub mod char_sequence;
pub mod class;
pub mod stream;
