//! Capability declaration and validation.

use crate::capability::signature::{is_valid_identifier, is_valid_qualified_name, Signature};
use crate::capability::value::Operation;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declarative capability: required signatures plus default operations.
///
/// Defaults may only be written in terms of the required operations; the
/// registry cannot check bodies, so this is the author's contract.
#[derive(Debug, Clone)]
pub struct CapabilityDefinition {
    name: String,
    extends: Vec<String>,
    required: Vec<Signature>,
    defaults: Vec<(Signature, Operation)>,
}

impl CapabilityDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: Vec::new(),
            required: Vec::new(),
            defaults: Vec::new(),
        }
    }

    /// Inherits required operations and defaults from an already
    /// registered capability.
    pub fn extends(mut self, capability: impl Into<String>) -> Self {
        self.extends.push(capability.into());
        self
    }

    pub fn require(mut self, signature: Signature) -> Self {
        self.required.push(signature);
        self
    }

    pub fn provide_default(mut self, signature: Signature, operation: Operation) -> Self {
        self.defaults.push((signature, operation));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn super_capabilities(&self) -> &[String] {
        &self.extends
    }

    pub fn required(&self) -> &[Signature] {
        &self.required
    }

    pub fn defaults(&self) -> &[(Signature, Operation)] {
        &self.defaults
    }

    /// Validates declaration-level invariants.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        if name != self.name || !is_valid_qualified_name(name) {
            return Err(DefinitionError::InvalidName(self.name.clone()));
        }

        let mut seen_supers = BTreeSet::<&str>::new();
        for parent in &self.extends {
            if parent == &self.name {
                return Err(DefinitionError::ExtendsItself(self.name.clone()));
            }
            if !seen_supers.insert(parent.as_str()) {
                return Err(DefinitionError::DuplicateSuperCapability(parent.clone()));
            }
        }

        let mut seen = BTreeSet::<&Signature>::new();
        for signature in &self.required {
            validate_operation_name(signature)?;
            if !seen.insert(signature) {
                return Err(DefinitionError::DuplicateOperation(signature.clone()));
            }
        }
        for (signature, _) in &self.defaults {
            validate_operation_name(signature)?;
            if self.required.contains(signature) {
                return Err(DefinitionError::RequiredAndDefault(signature.clone()));
            }
            if !seen.insert(signature) {
                return Err(DefinitionError::DuplicateOperation(signature.clone()));
            }
        }
        Ok(())
    }
}

fn validate_operation_name(signature: &Signature) -> Result<(), DefinitionError> {
    if is_valid_identifier(signature.name()) {
        Ok(())
    } else {
        Err(DefinitionError::InvalidOperationName(
            signature.name().to_string(),
        ))
    }
}

/// Capability definition validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    EmptyName,
    InvalidName(String),
    ExtendsItself(String),
    DuplicateSuperCapability(String),
    InvalidOperationName(String),
    DuplicateOperation(Signature),
    RequiredAndDefault(Signature),
}

impl Display for DefinitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "capability name must not be empty"),
            Self::InvalidName(value) => write!(f, "capability name is invalid: {value}"),
            Self::ExtendsItself(value) => write!(f, "capability extends itself: {value}"),
            Self::DuplicateSuperCapability(value) => {
                write!(f, "super capability is listed twice: {value}")
            }
            Self::InvalidOperationName(value) => {
                write!(f, "operation name is invalid: {value}")
            }
            Self::DuplicateOperation(signature) => {
                write!(f, "operation is declared twice: {signature}")
            }
            Self::RequiredAndDefault(signature) => {
                write!(f, "operation is both required and default: {signature}")
            }
        }
    }
}

impl Error for DefinitionError {}

#[cfg(test)]
mod tests {
    use super::{CapabilityDefinition, DefinitionError};
    use crate::capability::signature::{Signature, ValueKind};
    use crate::capability::value::{Operation, Value};

    fn unit_operation() -> Operation {
        Operation::new(|_, _| Ok(Value::Unit))
    }

    fn valid_definition() -> CapabilityDefinition {
        CapabilityDefinition::new("java.lang.CharSequence")
            .require(Signature::new("charAt", &[ValueKind::Int]))
            .require(Signature::nullary("length"))
            .provide_default(Signature::nullary("chars"), unit_operation())
    }

    #[test]
    fn validates_baseline_definition() {
        assert!(valid_definition().validate().is_ok());
    }

    #[test]
    fn marker_capability_without_operations_is_valid() {
        let definition = CapabilityDefinition::new("Serializable");
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn rejects_empty_and_malformed_names() {
        let err = CapabilityDefinition::new("  ").validate().unwrap_err();
        assert_eq!(err, DefinitionError::EmptyName);

        let err = CapabilityDefinition::new("Char Sequence")
            .validate()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidName(_)));

        let err = CapabilityDefinition::new(" CharSequence")
            .validate()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidName(_)));
    }

    #[test]
    fn rejects_duplicate_required_signature() {
        let err = valid_definition()
            .require(Signature::nullary("length"))
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateOperation(Signature::nullary("length"))
        );
    }

    #[test]
    fn rejects_signature_both_required_and_default() {
        let err = valid_definition()
            .provide_default(Signature::nullary("length"), unit_operation())
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::RequiredAndDefault(Signature::nullary("length"))
        );
    }

    #[test]
    fn overloads_with_different_params_are_not_duplicates() {
        let definition = CapabilityDefinition::new("Appendable")
            .require(Signature::new("append", &[ValueKind::Char]))
            .require(Signature::new("append", &[ValueKind::Object]));
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn rejects_invalid_operation_name() {
        let err = valid_definition()
            .require(Signature::nullary("to string"))
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::InvalidOperationName("to string".to_string())
        );
    }

    #[test]
    fn rejects_self_extension() {
        let err = CapabilityDefinition::new("Closeable")
            .extends("Closeable")
            .validate()
            .unwrap_err();
        assert_eq!(err, DefinitionError::ExtendsItself("Closeable".to_string()));
    }
}
