//! Outbound seams: live input routing and durable storage

use crate::slots::SlotBinding;
use parking_lot::RwLock;
use std::sync::Arc;

/// Receives the reconciled slot list after every pass
pub trait InputConsumer: Send + Sync {
    fn apply(&self, bindings: &[SlotBinding]);
}

/// Receives slot lists that must be written to durable storage
///
/// Implementations must return without waiting on I/O.
pub trait SlotStore: Send + Sync {
    fn save(&self, bindings: &[SlotBinding]);
}

/// Latest applied slot list, readable from any thread
#[derive(Debug, Clone, Default)]
pub struct SharedSlots {
    inner: Arc<RwLock<Vec<SlotBinding>>>,
}

impl SharedSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the most recently applied slots
    pub fn snapshot(&self) -> Vec<SlotBinding> {
        self.inner.read().clone()
    }
}

impl InputConsumer for SharedSlots {
    fn apply(&self, bindings: &[SlotBinding]) {
        *self.inner.write() = bindings.to_vec();
    }
}
