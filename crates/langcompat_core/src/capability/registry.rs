//! Capability registry and default-method injector.
//!
//! # Responsibility
//! - Register capabilities once, with their resolved required/default sets.
//! - Attach capability defaults onto concrete types at declaration time.
//! - Index sealed types by the capabilities they conform to.
//!
//! # Invariants
//! - A capability name is registered at most once; a rejected duplicate
//!   leaves the first registration untouched.
//! - Attachment is all-or-nothing: a missing required operation leaves the
//!   type's table unchanged.
//! - The registry holds type tables only, never instances.
//! - Failures are returned to the caller and never logged here.

use crate::capability::definition::{CapabilityDefinition, DefinitionError};
use crate::capability::dispatch::{ConcreteType, SealedType, SlotOrigin};
use crate::capability::signature::{is_valid_identifier, Signature};
use crate::capability::value::Operation;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Registered capability with inheritance already resolved.
#[derive(Debug)]
pub struct Capability {
    name: String,
    extends: Vec<String>,
    ancestors: Vec<String>,
    required: BTreeSet<Signature>,
    defaults: BTreeMap<Signature, Operation>,
}

impl Capability {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct super capabilities, in declaration order.
    pub fn super_capabilities(&self) -> &[String] {
        &self.extends
    }

    /// Every transitive super capability, nearest first, without repeats.
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    pub fn required(&self) -> impl Iterator<Item = &Signature> {
        self.required.iter()
    }

    pub fn defaults(&self) -> impl Iterator<Item = (&Signature, &Operation)> {
        self.defaults.iter()
    }

    pub fn is_required(&self, signature: &Signature) -> bool {
        self.required.contains(signature)
    }

    pub fn default_operation(&self, signature: &Signature) -> Option<&Operation> {
        self.defaults.get(signature)
    }
}

/// In-process registry of capabilities and declared types.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    capabilities: BTreeMap<String, Arc<Capability>>,
    types: BTreeMap<String, Arc<SealedType>>,
    conformance_index: BTreeMap<String, BTreeSet<String>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one capability after definition validation.
    ///
    /// Super capabilities contribute their required operations and defaults.
    /// Own defaults override inherited ones; an own default also satisfies an
    /// inherited requirement, and an own requirement withdraws an inherited
    /// default.
    pub fn define_capability(
        &mut self,
        definition: CapabilityDefinition,
    ) -> Result<(), CapabilityError> {
        definition
            .validate()
            .map_err(CapabilityError::InvalidDefinition)?;
        let name = definition.name().to_string();
        if self.capabilities.contains_key(name.as_str()) {
            return Err(CapabilityError::DuplicateCapability(name));
        }

        let mut ancestors = Vec::<String>::new();
        let mut required = BTreeSet::<Signature>::new();
        let mut defaults = BTreeMap::<Signature, Operation>::new();
        for parent_name in definition.super_capabilities() {
            let parent = self
                .capabilities
                .get(parent_name.as_str())
                .ok_or_else(|| CapabilityError::UnknownCapability(parent_name.clone()))?;
            let lineage = std::iter::once(parent.name())
                .chain(parent.ancestors().iter().map(String::as_str));
            for ancestor in lineage {
                if !ancestors.iter().any(|known| known == ancestor) {
                    ancestors.push(ancestor.to_string());
                }
            }
            required.extend(parent.required().cloned());
            for (signature, operation) in parent.defaults() {
                defaults.insert(signature.clone(), operation.clone());
            }
        }

        for signature in definition.required() {
            defaults.remove(signature);
            required.insert(signature.clone());
        }
        for (signature, operation) in definition.defaults() {
            required.remove(signature);
            defaults.insert(signature.clone(), operation.clone());
        }

        debug!(
            "event=capability_defined module=capability name={} extends={} required={} defaults={}",
            name,
            ancestors.len(),
            required.len(),
            defaults.len()
        );

        let capability = Capability {
            name: name.clone(),
            extends: definition.super_capabilities().to_vec(),
            ancestors,
            required,
            defaults,
        };
        self.capabilities.insert(name, Arc::new(capability));
        Ok(())
    }

    /// Installs the capability's defaults onto `concrete_type`.
    ///
    /// Every required signature must already be in the type's table, either
    /// written by the type or injected by an earlier attachment. Defaults
    /// never replace explicit operations; they do replace defaults injected
    /// by earlier attachments.
    ///
    /// Attaching a capability the type already inherits through an attached
    /// extension is a no-op that only records the attachment. Attaching the
    /// same capability by name twice fails with `AlreadyConforms`.
    pub fn attach_defaults(
        &self,
        concrete_type: &mut ConcreteType,
        capability_name: &str,
    ) -> Result<(), CapabilityError> {
        let capability = self
            .capabilities
            .get(capability_name)
            .ok_or_else(|| CapabilityError::UnknownCapability(capability_name.to_string()))?;
        if concrete_type.is_attached(capability_name) {
            return Err(CapabilityError::AlreadyConforms {
                type_name: concrete_type.name().to_string(),
                capability: capability_name.to_string(),
            });
        }
        if concrete_type.conforms_to(capability_name) {
            // An extension attached earlier already brought in this
            // capability's requirements and defaults.
            concrete_type.record_attachment(capability.name());
            debug!(
                "event=defaults_attached module=capability type={} capability={} injected=0 via=extension",
                concrete_type.name(),
                capability.name()
            );
            return Ok(());
        }
        if let Some(missing) = capability
            .required()
            .find(|signature| !concrete_type.table().contains(signature))
        {
            return Err(CapabilityError::MissingRequiredOperation {
                capability: capability_name.to_string(),
                operation: missing.clone(),
            });
        }

        let mut injected = 0usize;
        let mut overridden = 0usize;
        for (signature, operation) in capability.defaults() {
            if concrete_type.inject_default(capability.name(), signature, operation) {
                injected += 1;
            } else {
                overridden += 1;
            }
        }
        concrete_type.record_attachment(capability.name());
        for ancestor in capability.ancestors() {
            concrete_type.record_conformance(ancestor);
        }

        debug!(
            "event=defaults_attached module=capability type={} capability={} injected={} overridden={}",
            concrete_type.name(),
            capability.name(),
            injected,
            overridden
        );
        Ok(())
    }

    /// Attaches every capability in order, seals the type, and records it.
    pub fn declare_type(
        &mut self,
        mut concrete_type: ConcreteType,
        capabilities: &[&str],
    ) -> Result<Arc<SealedType>, CapabilityError> {
        let type_name = concrete_type.name().to_string();
        if !is_valid_identifier(&type_name) {
            return Err(CapabilityError::InvalidTypeName(type_name));
        }
        if self.types.contains_key(type_name.as_str()) {
            return Err(CapabilityError::DuplicateType(type_name));
        }

        for capability in capabilities {
            self.attach_defaults(&mut concrete_type, capability)?;
        }

        let sealed = concrete_type.seal();
        for capability in sealed.conformances() {
            self.conformance_index
                .entry(capability.clone())
                .or_default()
                .insert(type_name.clone());
        }
        debug!(
            "event=type_sealed module=capability type={} conformances={} operations={}",
            type_name,
            sealed.conformances().len(),
            sealed.table().len()
        );
        self.types.insert(type_name, Arc::clone(&sealed));
        Ok(sealed)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn capability(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name).map(Arc::as_ref)
    }

    pub fn contains_capability(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Returns sorted capability names.
    pub fn capability_names(&self) -> Vec<String> {
        self.capabilities.keys().cloned().collect()
    }

    pub fn sealed_type(&self, name: &str) -> Option<Arc<SealedType>> {
        self.types.get(name).cloned()
    }

    /// Declared types conforming to `capability`, sorted by name.
    pub fn types_conforming_to(&self, capability: &str) -> Vec<Arc<SealedType>> {
        let Some(names) = self.conformance_index.get(capability) else {
            return vec![];
        };
        names
            .iter()
            .filter_map(|name| self.types.get(name).cloned())
            .collect()
    }

    /// Serializable listing of registered capabilities and declared types.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let capabilities = self
            .capabilities
            .values()
            .map(|capability| CapabilitySummary {
                name: capability.name().to_string(),
                extends: capability.super_capabilities().to_vec(),
                required: capability.required().cloned().collect(),
                defaults: capability
                    .defaults()
                    .map(|(signature, _)| signature.clone())
                    .collect(),
            })
            .collect();
        let types = self
            .types
            .values()
            .map(|sealed| TypeSummary {
                name: sealed.name().to_string(),
                conforms_to: sealed.conformances().to_vec(),
                operations: sealed
                    .table()
                    .signatures()
                    .filter_map(|signature| {
                        sealed
                            .table()
                            .origin(signature)
                            .map(|origin| OperationSummary {
                                signature: signature.clone(),
                                origin: origin.clone(),
                            })
                    })
                    .collect(),
            })
            .collect();
        RegistrySnapshot {
            capabilities,
            types,
        }
    }
}

/// Point-in-time registry listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub capabilities: Vec<CapabilitySummary>,
    pub types: Vec<TypeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilitySummary {
    pub name: String,
    pub extends: Vec<String>,
    pub required: Vec<Signature>,
    pub defaults: Vec<Signature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub conforms_to: Vec<String>,
    pub operations: Vec<OperationSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationSummary {
    pub signature: Signature,
    pub origin: SlotOrigin,
}

/// Registry definition and attachment errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    InvalidDefinition(DefinitionError),
    DuplicateCapability(String),
    UnknownCapability(String),
    MissingRequiredOperation {
        capability: String,
        operation: Signature,
    },
    AlreadyConforms {
        type_name: String,
        capability: String,
    },
    InvalidTypeName(String),
    DuplicateType(String),
}

impl Display for CapabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDefinition(err) => write!(f, "invalid capability definition: {err}"),
            Self::DuplicateCapability(name) => {
                write!(f, "capability already registered: {name}")
            }
            Self::UnknownCapability(name) => write!(f, "capability is not registered: {name}"),
            Self::MissingRequiredOperation {
                capability,
                operation,
            } => write!(
                f,
                "type is missing operation `{operation}` required by capability `{capability}`"
            ),
            Self::AlreadyConforms {
                type_name,
                capability,
            } => write!(
                f,
                "type `{type_name}` already conforms to capability `{capability}`"
            ),
            Self::InvalidTypeName(name) => write!(f, "type name is invalid: {name}"),
            Self::DuplicateType(name) => write!(f, "type already declared: {name}"),
        }
    }
}

impl Error for CapabilityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDefinition(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DefinitionError> for CapabilityError {
    fn from(value: DefinitionError) -> Self {
        Self::InvalidDefinition(value)
    }
}
