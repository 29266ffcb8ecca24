//! Reconciler - serialized slot reconciliation
//!
//! Hot-plug notifications arrive from driver threads. They are funneled
//! through one actor so each assign + reconcile pass runs to completion before
//! the next event is looked at. Results go to the live input consumer after
//! every pass and to the persistence actor only when new hardware appeared.

mod actor;
mod actor_handle;
mod commands;
pub mod persistence_actor;
mod sinks;
mod snapshot;


pub use actor::ReconcileActor;
pub use actor_handle::ReconcileActorHandle;
pub use commands::ReconcileCommand;
pub use persistence_actor::{PersistenceActor, PersistenceActorHandle, DEFAULT_DEBOUNCE_MS};
pub use sinks::{InputConsumer, SharedSlots, SlotStore};
pub use snapshot::SlotSnapshot;
