//! Run-time type identity that reads as its own name.

use crate::lang::char_sequence::{CharSequence, CodeUnit};
use std::fmt::{Display, Formatter};

/// Type identity carrying its textual name as a character sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Class {
    name: String,
    units: Vec<CodeUnit>,
}

impl Class {
    /// Identity for a caller-provided name, e.g. a dynamically declared type.
    pub fn for_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let units = name.encode_utf16().collect();
        Self { name, units }
    }

    /// Identity of the Rust type `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self::for_name(std::any::type_name::<T>())
    }

    /// Identity of the value's static type.
    pub fn of_val<T: ?Sized>(_value: &T) -> Self {
        Self::of::<T>()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last path segment of the name, keeping generic arguments intact.
    ///
    /// `alloc::vec::Vec<u16>` -> `Vec<u16>`.
    pub fn simple_name(&self) -> &str {
        let head_end = self.name.find('<').unwrap_or(self.name.len());
        match self.name[..head_end].rfind("::") {
            Some(separator) => &self.name[separator + 2..],
            None => &self.name,
        }
    }
}

impl CharSequence for Class {
    fn char_at(&self, index: usize) -> CodeUnit {
        self.units[index]
    }

    fn length(&self) -> usize {
        self.units.len()
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "class {}", self.name)
    }
}
