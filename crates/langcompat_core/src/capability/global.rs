//! Process-wide capability registry.
//!
//! # Responsibility
//! - Hold one registry per process behind a single lock.
//! - Install the built-in `java.lang` capabilities exactly once.
//!
//! # Invariants
//! - Every registry read or write goes through the same `Mutex`.
//! - `bootstrap()` is idempotent; the first successful run wins.
//! - A poisoned lock is recovered; registry mutations are all-or-nothing,
//!   so the state behind it is still consistent.

use crate::capability::registry::{CapabilityError, CapabilityRegistry};
use crate::lang::capabilities::install_lang_capabilities;
use once_cell::sync::{Lazy, OnceCell};
use std::sync::{Mutex, MutexGuard, PoisonError};

static GLOBAL_REGISTRY: Lazy<Mutex<CapabilityRegistry>> =
    Lazy::new(|| Mutex::new(CapabilityRegistry::new()));
static LANG_BOOTSTRAP: OnceCell<()> = OnceCell::new();

/// Returns the process-wide registry lock.
pub fn global_registry() -> &'static Mutex<CapabilityRegistry> {
    &GLOBAL_REGISTRY
}

/// Runs `action` while holding the process-wide registry lock.
pub fn with_global_registry<T>(action: impl FnOnce(&mut CapabilityRegistry) -> T) -> T {
    let mut registry = lock_registry();
    action(&mut registry)
}

/// Installs the built-in capabilities into the process-wide registry once.
///
/// Safe to call from several threads; later calls return `Ok(())` without
/// touching the registry.
pub fn bootstrap() -> Result<(), CapabilityError> {
    LANG_BOOTSTRAP.get_or_try_init(|| {
        let mut registry = lock_registry();
        install_lang_capabilities(&mut registry)
    })?;
    Ok(())
}

fn lock_registry() -> MutexGuard<'static, CapabilityRegistry> {
    GLOBAL_REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}
