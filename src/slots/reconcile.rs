//! Reconciliation policy
//!
//! A pass that introduced unseen hardware is compacted and persisted. A pass
//! without new hardware (a disconnect, or known hardware coming back) keeps
//! the saved order and only swaps the slots that actually conflict, so
//! players don't get renumbered when a lower slot drops out.

use super::types::SlotBinding;
use tracing::debug;

/// Result of reconciling a fresh assignment against saved state
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub bindings: Vec<SlotBinding>,
    /// Write the result to durable storage
    pub should_persist: bool,
}

pub fn reconcile(
    fresh: Vec<SlotBinding>,
    saved: &[SlotBinding],
    introduced_new_device: bool,
) -> Reconciled {
    if introduced_new_device {
        return Reconciled {
            bindings: compact(fresh),
            should_persist: true,
        };
    }

    Reconciled {
        bindings: realign(&fresh, saved),
        should_persist: false,
    }
}

/// Renumber from 0, preserving slot order
pub fn compact(mut bindings: Vec<SlotBinding>) -> Vec<SlotBinding> {
    bindings.sort_by_key(|b| b.slot_index);
    for (index, slot) in bindings.iter_mut().enumerate() {
        if slot.slot_index != index {
            debug!(device_id = %slot.device_id, from = slot.slot_index, to = index, "Compacted slot");
            slot.slot_index = index;
        }
    }
    bindings
}

/// Apply the fresh placement to a copy of the saved table with pairwise swaps
pub fn realign(fresh: &[SlotBinding], saved: &[SlotBinding]) -> Vec<SlotBinding> {
    let mut table = saved.to_vec();

    for entry in fresh {
        let substitute = table.iter().position(|b| b.device_id == entry.device_id);
        let incumbent = table.iter().position(|b| b.slot_index == entry.slot_index);

        let (Some(s), Some(i)) = (substitute, incumbent) else {
            continue;
        };
        if table[s].slot_index == table[i].slot_index {
            continue;
        }

        debug!(
            device_id = %table[s].device_id,
            displaced = %table[i].device_id,
            from = table[s].slot_index,
            to = table[i].slot_index,
            "Swapped slots"
        );
        let moved = table[s].slot_index;
        table[s].slot_index = table[i].slot_index;
        table[i].slot_index = moved;
    }

    table.sort_by_key(|b| b.slot_index);
    table
}
