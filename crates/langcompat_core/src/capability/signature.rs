//! Operation signatures and identifier rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex"));
static QUALIFIED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
        .expect("valid qualified name regex")
});

/// Operation and type names: `charAt`, `Word`.
pub fn is_valid_identifier(value: &str) -> bool {
    IDENTIFIER_RE.is_match(value)
}

/// Capability names, optionally package-qualified: `java.lang.CharSequence`.
pub fn is_valid_qualified_name(value: &str) -> bool {
    QUALIFIED_NAME_RE.is_match(value)
}

/// Kind of a dynamic value, used for parameter lists and overload lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Unit,
    Bool,
    Int,
    Char,
    Text,
    Object,
    Stream,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "void",
            Self::Bool => "boolean",
            Self::Int => "int",
            Self::Char => "char",
            Self::Text => "text",
            Self::Object => "object",
            Self::Stream => "stream",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation name plus parameter kinds.
///
/// Overloads share a name and differ in parameters, so
/// `append(char)` and `append(object)` are distinct signatures.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    name: String,
    params: Vec<ValueKind>,
}

impl Signature {
    pub fn new(name: impl Into<String>, params: &[ValueKind]) -> Self {
        Self {
            name: name.into(),
            params: params.to_vec(),
        }
    }

    pub fn nullary(name: impl Into<String>) -> Self {
        Self::new(name, &[])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        for (position, kind) in self.params.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}")?;
        }
        f.write_str(")")
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
