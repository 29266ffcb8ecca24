//! Scenario and property tests for full reconciliation passes

use super::*;
use crate::binding::{BindingConfig, ControllerType};
use crate::defaults::SwitchDefaults;
use crate::device::Device;
use proptest::prelude::*;
use std::collections::HashSet;

fn saved(index: usize, id: &str) -> SlotBinding {
    SlotBinding::new(index, id, BindingConfig::generic())
}

fn pad(id: &str) -> Device {
    Device::new(id, "Generic USB Gamepad")
}

fn placement(bindings: &[SlotBinding]) -> Vec<(usize, String)> {
    bindings
        .iter()
        .map(|b| (b.slot_index, b.device_id.clone()))
        .collect()
}

fn pass(connected: &[Device], saved: &[SlotBinding]) -> ReconcileOutcome {
    run_pass(connected, saved, &SwitchDefaults, PassOptions::default())
}

#[test]
fn test_pure_disconnect_keeps_slots() {
    let saved_slots = vec![saved(0, "A"), saved(1, "B"), saved(2, "C")];
    let outcome = pass(&[pad("A"), pad("C")], &saved_slots);

    assert!(!outcome.should_persist);
    assert!(!outcome.introduced_new_device);
    let by_id = |id: &str| outcome.bindings.iter().find(|b| b.device_id == id).unwrap().slot_index;
    assert_eq!(by_id("A"), 0);
    assert_eq!(by_id("C"), 2);
}

#[test]
fn test_reconnect_returns_to_same_slot() {
    let saved_slots = vec![saved(0, "A"), saved(1, "B"), saved(2, "C")];
    let after_drop = pass(&[pad("A"), pad("C")], &saved_slots);
    // B comes back, registry now reports it last
    let after_return = pass(&[pad("A"), pad("C"), pad("B")], &after_drop.bindings);

    assert!(!after_return.should_persist);
    assert_eq!(
        placement(&after_return.bindings),
        vec![(0, "A".into()), (1, "B".into()), (2, "C".into())]
    );
}

#[test]
fn test_new_device_compacts_gaps() {
    let saved_slots = vec![saved(0, "A"), saved(2, "B")];
    let outcome = pass(&[pad("A"), pad("B"), pad("NEW")], &saved_slots);

    assert!(outcome.should_persist);
    let indices: Vec<_> = outcome.bindings.iter().map(|b| b.slot_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(
        placement(&outcome.bindings),
        vec![(0, "A".into()), (1, "NEW".into()), (2, "B".into())]
    );
}

#[test]
fn test_new_device_closes_wide_gap() {
    let saved_slots = vec![saved(0, "A"), saved(4, "B"), saved(6, "GONE")];
    let outcome = pass(&[pad("B"), pad("A"), pad("NEW")], &saved_slots);

    assert!(outcome.should_persist);
    assert_eq!(
        placement(&outcome.bindings),
        vec![(0, "A".into()), (1, "NEW".into()), (2, "B".into())]
    );
}

#[test]
fn test_second_pass_is_idempotent() {
    let connected = vec![pad("3"), pad("1"), Device::new("7", "Nintendo Switch Joy-Con (L)")];
    let first = pass(&connected, &[saved(5, "1")]);
    let second = pass(&connected, &first.bindings);

    assert!(first.should_persist);
    assert!(!second.should_persist);
    assert_eq!(first.bindings, second.bindings);
}

#[test]
fn test_id_suffix_matches_saved_binding() {
    let outcome = pass(&[Device::new("5 Pro Controller", "Pro Controller")], &[saved(3, "5")]);
    assert!(!outcome.introduced_new_device);
    assert_eq!(placement(&outcome.bindings), vec![(3, "5".into())]);
}

#[test]
fn test_led_colors_independent_of_arrival_order() {
    let ids = ["d", "b", "a", "h", "c", "g", "e", "f"];
    let forward: Vec<_> = ids.iter().map(|id| pad(id)).collect();
    let backward: Vec<_> = ids.iter().rev().map(|id| pad(id)).collect();

    for connected in [forward, backward] {
        let outcome = pass(&connected, &[]);
        let colors: Vec<_> = outcome.bindings.iter().map(|b| b.led_color().unwrap()).collect();
        assert_eq!(colors, PLAYER_COLORS.to_vec());
    }
}

#[test]
fn test_ninth_slot_led_policy() {
    let connected: Vec<_> = (0..9).map(|i| pad(&i.to_string())).collect();

    let colorless = run_pass(
        &connected,
        &[],
        &SwitchDefaults,
        PassOptions { max_slots: 9, led_overflow: LedOverflow::Colorless },
    );
    assert_eq!(colorless.bindings.len(), 9);
    assert_eq!(colorless.bindings[8].led_color(), None);

    let wrapped = run_pass(
        &connected,
        &[],
        &SwitchDefaults,
        PassOptions { max_slots: 9, led_overflow: LedOverflow::Wrap },
    );
    assert_eq!(wrapped.bindings[8].led_color(), Some(PLAYER_COLORS[0]));
}

#[test]
fn test_over_capacity_set_settles() {
    let options = PassOptions { max_slots: 2, ..PassOptions::default() };
    let connected = vec![pad("a"), pad("b"), pad("c")];

    let first = run_pass(&connected, &[], &SwitchDefaults, options);
    assert!(first.should_persist);
    assert_eq!(placement(&first.bindings), vec![(0, "a".into()), (1, "b".into())]);

    let second = run_pass(&connected, &first.bindings, &SwitchDefaults, options);
    let third = run_pass(&connected, &second.bindings, &SwitchDefaults, options);

    assert!(!second.should_persist);
    assert!(!second.introduced_new_device);
    assert!(!third.should_persist);
    assert_eq!(second.bindings, first.bindings);
    assert_eq!(third.bindings, first.bindings);
}

#[test]
fn test_controller_type_inference_in_pass() {
    let connected = vec![
        Device::new("1", "Nintendo Switch Joy-Con (L)"),
        Device::new("2", "Nintendo Switch Pro Controller"),
        Device::new("3", "Xbox Wireless Controller"),
    ];
    let outcome = pass(&connected, &[]);
    let types: Vec<_> = outcome.bindings.iter().map(|b| b.binding.controller_type()).collect();
    assert_eq!(
        types,
        vec![
            ControllerType::JoyconLeft,
            ControllerType::ProController,
            ControllerType::ProController
        ]
    );
}

#[test]
fn test_saved_binding_survives_mutation_of_result() {
    let saved_slots = vec![saved(0, "A"), saved(1, "B")];
    let mut outcome = pass(&[pad("A"), pad("B")], &saved_slots);
    if let BindingConfig::Standard(b) = &mut outcome.bindings[0].binding {
        b.deadzone_left = 0.9;
    }
    assert_eq!(saved_slots[0].binding, BindingConfig::generic());
    assert_ne!(outcome.bindings[0].binding, outcome.bindings[1].binding);
}

fn device_pool() -> impl Strategy<Value = Vec<Device>> {
    prop::collection::vec(0u8..12, 0..12)
        .prop_map(|ids| ids.into_iter().map(|i| pad(&format!("dev{}", i))).collect())
}

fn saved_pool() -> impl Strategy<Value = Vec<SlotBinding>> {
    prop::collection::vec((0usize..12, 0u8..12), 0..10).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(index, id)| saved(index, &format!("dev{}", id)))
            .collect()
    })
}

fn assert_unique(bindings: &[SlotBinding], max_slots: usize) -> Result<(), TestCaseError> {
    let mut indices = HashSet::new();
    let mut ids = HashSet::new();
    for b in bindings {
        prop_assert!(b.slot_index < max_slots, "slot {} out of range", b.slot_index);
        prop_assert!(indices.insert(b.slot_index), "duplicate slot {}", b.slot_index);
        prop_assert!(ids.insert(b.device_id.clone()), "duplicate device {}", b.device_id);
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_slots_unique_and_in_range(
        max_slots in 1usize..=MAX_SLOTS_LIMIT,
        saved_slots in saved_pool(),
        connected in device_pool(),
    ) {
        let state = AssignmentState::from_saved(saved_slots, max_slots);
        assert_unique(state.bindings(), max_slots)?;

        let options = PassOptions { max_slots, led_overflow: LedOverflow::Wrap };
        let outcome = run_pass(&connected, state.bindings(), &SwitchDefaults, options);
        assert_unique(&outcome.bindings, max_slots)?;
    }

    #[test]
    fn prop_repeat_pass_is_stable(
        max_slots in 1usize..=MAX_SLOTS_LIMIT,
        saved_slots in saved_pool(),
        connected in device_pool(),
    ) {
        let options = PassOptions { max_slots, led_overflow: LedOverflow::Colorless };
        let state = AssignmentState::from_saved(saved_slots, max_slots);
        let first = run_pass(&connected, state.bindings(), &SwitchDefaults, options);
        let second = run_pass(&connected, &first.bindings, &SwitchDefaults, options);

        prop_assert!(!second.should_persist);
        prop_assert_eq!(first.bindings, second.bindings);
    }
}
