//! Slot assignment: maps connected devices onto player slots
//!
//! Two passes over the connected set:
//! 1. devices with a saved binding keep their previous slot when it is still
//!    valid and free, otherwise they take the lowest free slot;
//! 2. unseen devices, in ascending id order, take the lowest free slot with a
//!    fresh binding from the defaults provider.
//!
//! Devices beyond the slot capacity are dropped.

use super::types::{first_free_index, SlotBinding};
use crate::binding::BindingConfig;
use crate::defaults::BindingDefaultsProvider;
use crate::device::Device;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Result of an assignment pass
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Claimed slots, sorted by slot index
    pub bindings: Vec<SlotBinding>,
    /// At least one device without a saved binding was given a slot
    ///
    /// Unseen devices dropped for lack of capacity don't count, so an
    /// unchanged over-capacity set settles instead of persisting every pass.
    pub introduced_new_device: bool,
}

/// Compute the slot table for the connected devices
pub fn assign(
    connected: &[Device],
    saved: &[SlotBinding],
    max_slots: usize,
    provider: &dyn BindingDefaultsProvider,
) -> Assignment {
    let mut saved_by_id: HashMap<&str, &SlotBinding> = HashMap::new();
    for entry in saved.iter().filter(|b| !b.device_id.is_empty()) {
        saved_by_id.entry(entry.device_id.as_str()).or_insert(entry);
    }

    let mut seen = HashSet::new();
    let devices: Vec<&Device> = connected
        .iter()
        .filter(|d| d.is_valid())
        .filter(|d| seen.insert(d.device_id.as_str()))
        .collect();

    let mut claimed: BTreeMap<usize, SlotBinding> = BTreeMap::new();
    let mut unseen = Vec::new();

    for device in &devices {
        let Some(previous) = saved_by_id.get(device.device_id.as_str()) else {
            unseen.push(*device);
            continue;
        };

        let desired = previous.slot_index;
        let index = if desired < max_slots && !claimed.contains_key(&desired) {
            Some(desired)
        } else {
            first_free_index(&claimed, max_slots)
        };

        match index {
            Some(index) => {
                if index != desired {
                    debug!(device_id = %device.device_id, desired, index, "Saved slot unavailable, reassigned");
                } else {
                    debug!(device_id = %device.device_id, index, "Kept saved slot");
                }
                claimed.insert(
                    index,
                    SlotBinding::new(index, device.device_id.clone(), previous.binding.clone()),
                );
            }
            None => warn!(device_id = %device.device_id, max_slots, "All slots taken, dropping device"),
        }
    }

    unseen.sort_by(|a, b| a.device_id.cmp(&b.device_id));

    let mut placed_unseen = 0usize;
    for device in unseen {
        let Some(index) = first_free_index(&claimed, max_slots) else {
            warn!(device_id = %device.device_id, max_slots, "All slots taken, dropping new device");
            continue;
        };

        let binding = provider
            .default_binding_for(&device.display_name)
            .unwrap_or_else(|e| {
                warn!(device_id = %device.device_id, "Default binding failed ({}), using generic layout", e);
                BindingConfig::generic()
            });

        debug!(
            device_id = %device.device_id,
            name = %device.display_name,
            controller_type = ?binding.controller_type(),
            index,
            "Assigned new device"
        );
        claimed.insert(index, SlotBinding::new(index, device.device_id.clone(), binding));
        placed_unseen += 1;
    }

    Assignment {
        bindings: claimed.into_values().collect(),
        introduced_new_device: placed_unseen > 0,
    }
}
