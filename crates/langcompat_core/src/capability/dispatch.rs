//! Type-level dispatch tables.
//!
//! # Responsibility
//! - Hold one operation per signature for a concrete type.
//! - Record whether each slot was written by the type or injected by a
//!   capability.
//!
//! # Invariants
//! - Explicit slots are never replaced by injected defaults.
//! - A later injected default replaces an earlier injected default.
//! - A sealed table is immutable and shared by every instance.

use crate::capability::signature::Signature;
use crate::capability::value::{Instance, Operation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where a dispatch slot came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOrigin {
    /// Written by the concrete type itself.
    Explicit,
    /// Injected from the named capability's defaults.
    Default(String),
}

#[derive(Debug, Clone)]
struct Slot {
    operation: Operation,
    origin: SlotOrigin,
}

/// Signature-keyed operation table of one type.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    slots: BTreeMap<Signature, Slot>,
}

impl DispatchTable {
    pub fn lookup(&self, signature: &Signature) -> Option<&Operation> {
        self.slots.get(signature).map(|slot| &slot.operation)
    }

    pub fn origin(&self, signature: &Signature) -> Option<&SlotOrigin> {
        self.slots.get(signature).map(|slot| &slot.origin)
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.slots.contains_key(signature)
    }

    /// Signatures in sorted order.
    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.slots.keys()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn define_explicit(&mut self, signature: Signature, operation: Operation) {
        self.slots.insert(
            signature,
            Slot {
                operation,
                origin: SlotOrigin::Explicit,
            },
        );
    }

    /// Returns `false` when an explicit slot kept the signature.
    fn inject_default(
        &mut self,
        capability: &str,
        signature: &Signature,
        operation: &Operation,
    ) -> bool {
        if let Some(existing) = self.slots.get(signature) {
            if existing.origin == SlotOrigin::Explicit {
                return false;
            }
        }
        self.slots.insert(
            signature.clone(),
            Slot {
                operation: operation.clone(),
                origin: SlotOrigin::Default(capability.to_string()),
            },
        );
        true
    }
}

/// A type under declaration; its table still accepts operations and defaults.
#[derive(Debug, Clone)]
pub struct ConcreteType {
    name: String,
    table: DispatchTable,
    conformances: Vec<String>,
    attached: Vec<String>,
}

impl ConcreteType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: DispatchTable::default(),
            conformances: Vec::new(),
            attached: Vec::new(),
        }
    }

    /// Adds an explicit operation. A repeated signature replaces the earlier
    /// body.
    pub fn with_operation(mut self, signature: Signature, operation: Operation) -> Self {
        self.define_operation(signature, operation);
        self
    }

    pub fn define_operation(&mut self, signature: Signature, operation: Operation) {
        self.table.define_explicit(signature, operation);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Capabilities attached so far, in attachment order.
    pub fn conformances(&self) -> &[String] {
        &self.conformances
    }

    pub fn conforms_to(&self, capability: &str) -> bool {
        self.conformances.iter().any(|name| name == capability)
    }

    /// Capabilities attached by name, excluding those only inherited.
    pub fn attached(&self) -> &[String] {
        &self.attached
    }

    pub fn is_attached(&self, capability: &str) -> bool {
        self.attached.iter().any(|name| name == capability)
    }

    /// Freezes the table. No further operations or defaults can be attached.
    pub fn seal(self) -> Arc<SealedType> {
        Arc::new(SealedType {
            name: self.name,
            table: self.table,
            conformances: self.conformances,
        })
    }

    pub(crate) fn inject_default(
        &mut self,
        capability: &str,
        signature: &Signature,
        operation: &Operation,
    ) -> bool {
        self.table.inject_default(capability, signature, operation)
    }

    pub(crate) fn record_attachment(&mut self, capability: &str) {
        if !self.is_attached(capability) {
            self.attached.push(capability.to_string());
        }
        self.record_conformance(capability);
    }

    pub(crate) fn record_conformance(&mut self, capability: &str) {
        if !self.conforms_to(capability) {
            self.conformances.push(capability.to_string());
        }
    }
}

/// A declared type whose dispatch table no longer changes.
#[derive(Debug)]
pub struct SealedType {
    name: String,
    table: DispatchTable,
    conformances: Vec<String>,
}

impl SealedType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn conformances(&self) -> &[String] {
        &self.conformances
    }

    pub fn conforms_to(&self, capability: &str) -> bool {
        self.conformances.iter().any(|name| name == capability)
    }

    /// Creates an instance of this type around `state`.
    pub fn instantiate<S>(self: &Arc<Self>, state: S) -> Instance
    where
        S: std::any::Any + Send + Sync,
    {
        Instance::new(Arc::clone(self), state)
    }
}
