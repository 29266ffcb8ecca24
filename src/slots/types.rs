//! Slot data model

use crate::binding::BindingConfig;
use crate::device::normalize_device_id;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Default number of player slots (one per palette color)
pub const DEFAULT_MAX_SLOTS: usize = 8;

/// Largest slot count accepted from configuration (8 players + handheld)
pub const MAX_SLOTS_LIMIT: usize = 9;

/// One player's configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotBinding {
    /// Player position, `0 <= slot_index < max_slots`
    pub slot_index: usize,
    /// Normalized id of the device bound to this slot
    pub device_id: String,
    pub binding: BindingConfig,
}

impl SlotBinding {
    pub fn new(slot_index: usize, device_id: impl Into<String>, binding: BindingConfig) -> Self {
        Self {
            slot_index,
            device_id: device_id.into(),
            binding,
        }
    }

    /// LED color shown for this player, if the binding drives one
    pub fn led_color(&self) -> Option<u32> {
        self.binding.led_color()
    }

    /// 1-based label used in logs and the REPL ("Player 1", ...)
    pub fn player_label(&self) -> String {
        format!("Player {}", self.slot_index + 1)
    }
}

/// The engine's slot table
///
/// Ordered by `slot_index`. Slot indices are unique, device ids are unique.
/// Bindings of briefly disconnected devices stay here until a pass drops or
/// reassigns them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentState {
    bindings: Vec<SlotBinding>,
}

impl AssignmentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from persisted bindings, repairing anything that would
    /// break the uniqueness invariants
    ///
    /// Empty ids are dropped, ids are normalized, a repeated device keeps its
    /// first entry, and out-of-range or colliding indices move to the first
    /// free slot. Entries that no longer fit are dropped.
    pub fn from_saved(saved: Vec<SlotBinding>, max_slots: usize) -> Self {
        let mut seen = HashSet::new();
        let mut claimed: BTreeMap<usize, SlotBinding> = BTreeMap::new();
        let mut displaced = Vec::new();

        for mut entry in saved {
            entry.device_id = normalize_device_id(&entry.device_id);
            if entry.device_id.is_empty() {
                debug!("Dropping saved binding without device id");
                continue;
            }
            if !seen.insert(entry.device_id.clone()) {
                warn!(device_id = %entry.device_id, "Dropping duplicate saved binding");
                continue;
            }
            if entry.slot_index < max_slots && !claimed.contains_key(&entry.slot_index) {
                claimed.insert(entry.slot_index, entry);
            } else {
                displaced.push(entry);
            }
        }

        for mut entry in displaced {
            match first_free_index(&claimed, max_slots) {
                Some(index) => {
                    warn!(
                        device_id = %entry.device_id,
                        from = entry.slot_index,
                        to = index,
                        "Moved stale saved slot index"
                    );
                    entry.slot_index = index;
                    claimed.insert(index, entry);
                }
                None => {
                    warn!(device_id = %entry.device_id, "No free slot for saved binding, dropping");
                }
            }
        }

        Self {
            bindings: claimed.into_values().collect(),
        }
    }

    /// Replace the whole table with a reconciled result
    pub(crate) fn replace(&mut self, mut bindings: Vec<SlotBinding>) {
        bindings.sort_by_key(|b| b.slot_index);
        self.bindings = bindings;
    }

    pub fn bindings(&self) -> &[SlotBinding] {
        &self.bindings
    }

    pub fn into_bindings(self) -> Vec<SlotBinding> {
        self.bindings
    }

    pub fn by_device(&self, device_id: &str) -> Option<&SlotBinding> {
        self.bindings.iter().find(|b| b.device_id == device_id)
    }

    pub fn by_slot(&self, slot_index: usize) -> Option<&SlotBinding> {
        self.bindings.iter().find(|b| b.slot_index == slot_index)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Lowest index in `0..max_slots` not yet claimed
pub(crate) fn first_free_index<V>(claimed: &BTreeMap<usize, V>, max_slots: usize) -> Option<usize> {
    (0..max_slots).find(|i| !claimed.contains_key(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(index: usize, id: &str) -> SlotBinding {
        SlotBinding::new(index, id, BindingConfig::generic())
    }

    #[test]
    fn test_from_saved_keeps_valid_entries() {
        let state = AssignmentState::from_saved(vec![slot(2, "c"), slot(0, "a")], 8);
        let ids: Vec<_> = state.bindings().iter().map(|b| (b.slot_index, b.device_id.as_str())).collect();
        assert_eq!(ids, vec![(0, "a"), (2, "c")]);
    }

    #[test]
    fn test_from_saved_repairs_collisions_and_range() {
        let state = AssignmentState::from_saved(
            vec![slot(1, "a"), slot(1, "b"), slot(42, "c"), slot(0, ""), slot(3, "a")],
            4,
        );
        let ids: Vec<_> = state.bindings().iter().map(|b| (b.slot_index, b.device_id.as_str())).collect();
        assert_eq!(ids, vec![(0, "b"), (1, "a"), (2, "c")]);
    }

    #[test]
    fn test_from_saved_normalizes_ids_and_drops_overflow() {
        let state = AssignmentState::from_saved(
            vec![slot(0, "5 Pro Controller"), slot(0, "6"), slot(0, "7")],
            2,
        );
        assert_eq!(state.len(), 2);
        assert_eq!(state.by_slot(0).unwrap().device_id, "5");
        assert_eq!(state.by_device("6").unwrap().slot_index, 1);
        assert!(state.by_device("7").is_none());
    }

    #[test]
    fn test_player_label() {
        assert_eq!(slot(0, "a").player_label(), "Player 1");
        assert_eq!(slot(7, "a").player_label(), "Player 8");
    }
}
