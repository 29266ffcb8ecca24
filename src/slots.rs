//! Controller slot assignment
//!
//! A reconciliation pass runs whenever the connected set changes:
//!
//! ```text
//! connected devices ─┐
//!                    ├─▶ assign ─▶ reconcile ─▶ assign_colors ─▶ final slots
//! saved slots ───────┘   (engine)   (policy)      (led)
//! ```
//!
//! Everything here is synchronous and pure; serialization of passes is the
//! reconciler actor's job.

mod engine;
mod led;
mod reconcile;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{assign, Assignment};
pub use led::{assign_colors, color_for_slot, LedOverflow, PLAYER_COLORS};
pub use reconcile::{compact, realign, reconcile, Reconciled};
pub use types::{AssignmentState, SlotBinding, DEFAULT_MAX_SLOTS, MAX_SLOTS_LIMIT};

use crate::defaults::BindingDefaultsProvider;
use crate::device::Device;
use tracing::info;

/// Knobs for a single pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOptions {
    pub max_slots: usize,
    pub led_overflow: LedOverflow,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            max_slots: DEFAULT_MAX_SLOTS,
            led_overflow: LedOverflow::default(),
        }
    }
}

/// Outcome of a full pass
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// Final slot list, sorted by slot index
    pub bindings: Vec<SlotBinding>,
    pub introduced_new_device: bool,
    pub should_persist: bool,
}

/// Run assign, reconcile and LED coloring over one connected snapshot
pub fn run_pass(
    connected: &[Device],
    saved: &[SlotBinding],
    provider: &dyn BindingDefaultsProvider,
    options: PassOptions,
) -> ReconcileOutcome {
    let assignment = assign(connected, saved, options.max_slots, provider);
    let introduced_new_device = assignment.introduced_new_device;
    let reconciled = reconcile(assignment.bindings, saved, introduced_new_device);
    let bindings = assign_colors(reconciled.bindings, options.led_overflow);

    info!(
        connected = connected.len(),
        slots = bindings.len(),
        introduced_new_device,
        should_persist = reconciled.should_persist,
        "Slot reconciliation pass complete"
    );

    ReconcileOutcome {
        bindings,
        introduced_new_device,
        should_persist: reconciled.should_persist,
    }
}
