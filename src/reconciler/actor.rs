//! ReconcileActor - single writer for the slot table
//!
//! Owns the connected-device list and the [`AssignmentState`]. Commands are
//! processed one at a time, so a connect racing a disconnect can never
//! interleave inside a pass.
//!
//! ```text
//! registry thread ──┐                       ┌──▶ InputConsumer::apply (every pass)
//! config watcher ───┼─▶ command_rx ─▶ pass ─┤
//! REPL / API ───────┘                       └──▶ SlotStore::save (new hardware only)
//! ```

use super::actor_handle::ReconcileActorHandle;
use super::commands::ReconcileCommand;
use super::sinks::{InputConsumer, SlotStore};
use crate::config::AutoAssignConfig;
use crate::defaults::BindingDefaultsProvider;
use crate::device::{normalize_device_id, Device};
use crate::slots::{run_pass, AssignmentState, SlotBinding};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

pub struct ReconcileActor {
    settings: AutoAssignConfig,

    /// Connected devices in registry-reported order
    connected: Vec<Device>,

    /// Slot table as of the last pass (or as loaded at startup)
    state: AssignmentState,

    provider: Arc<dyn BindingDefaultsProvider>,
    consumer: Arc<dyn InputConsumer>,
    store: Arc<dyn SlotStore>,

    command_rx: mpsc::UnboundedReceiver<ReconcileCommand>,

    pass_count: u64,
    persist_count: u64,
}

impl ReconcileActor {
    /// Spawn the actor on the current tokio runtime
    ///
    /// `saved` is the persisted slot table; it is repaired before first use.
    /// No pass runs until the first registry notification arrives.
    pub fn spawn(
        settings: AutoAssignConfig,
        saved: Vec<SlotBinding>,
        provider: Arc<dyn BindingDefaultsProvider>,
        consumer: Arc<dyn InputConsumer>,
        store: Arc<dyn SlotStore>,
    ) -> ReconcileActorHandle {
        let (cmd_tx, command_rx) = mpsc::unbounded_channel();

        let state = AssignmentState::from_saved(saved, settings.max_slots);
        info!(
            saved_slots = state.len(),
            max_slots = settings.max_slots,
            enabled = settings.enabled,
            "ReconcileActor spawned"
        );

        let actor = ReconcileActor {
            settings,
            connected: Vec::new(),
            state,
            provider,
            consumer,
            store,
            command_rx,
            pass_count: 0,
            persist_count: 0,
        };

        tokio::spawn(actor.run());

        ReconcileActorHandle::new(cmd_tx)
    }

    async fn run(mut self) {
        debug!("ReconcileActor run loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            trace!(?cmd, "Processing command");

            match cmd {
                ReconcileCommand::Connected(device) => {
                    self.handle_connected(device);
                    self.reconcile_now();
                }
                ReconcileCommand::Disconnected(device_id) => {
                    self.handle_disconnected(&device_id);
                    self.reconcile_now();
                }
                ReconcileCommand::Resync(devices) => {
                    self.handle_resync(devices);
                    self.reconcile_now();
                }
                ReconcileCommand::UpdateSettings(settings) => {
                    if self.handle_update_settings(settings) {
                        self.reconcile_now();
                    }
                }
                ReconcileCommand::Refresh => {
                    self.reconcile_now();
                }
                ReconcileCommand::GetSlots(response) => {
                    let _ = response.send(self.state.bindings().to_vec());
                }
                ReconcileCommand::GetConnected(response) => {
                    let _ = response.send(self.connected.clone());
                }
                ReconcileCommand::Shutdown => {
                    info!("ReconcileActor received shutdown command");
                    break;
                }
            }
        }

        info!(
            passes = self.pass_count,
            persisted = self.persist_count,
            "ReconcileActor run loop terminated"
        );
    }

    fn handle_connected(&mut self, device: Device) {
        if !device.is_valid() {
            debug!(name = %device.display_name, "Ignoring device without id");
            return;
        }

        info!(device_id = %device.device_id, name = %device.display_name, "Gamepad connected");

        match self.connected.iter_mut().find(|d| d.device_id == device.device_id) {
            Some(existing) => {
                debug!(device_id = %device.device_id, "Already connected, refreshing name");
                existing.display_name = device.display_name;
            }
            None => self.connected.push(device),
        }
    }

    fn handle_disconnected(&mut self, device_id: &str) {
        let device_id = normalize_device_id(device_id);
        let before = self.connected.len();
        self.connected.retain(|d| d.device_id != device_id);

        if self.connected.len() == before {
            debug!(device_id = %device_id, "Disconnect for unknown device");
        } else {
            info!(device_id = %device_id, "Gamepad disconnected");
        }
    }

    fn handle_resync(&mut self, devices: Vec<Device>) {
        info!(count = devices.len(), "Registry resync");
        self.connected.clear();
        for device in devices {
            if device.is_valid() && !self.connected.iter().any(|d| d.device_id == device.device_id) {
                self.connected.push(device);
            }
        }
    }

    /// Returns false when nothing changed, so no pass is needed
    fn handle_update_settings(&mut self, settings: AutoAssignConfig) -> bool {
        if settings == self.settings {
            debug!("Auto-assign settings unchanged");
            return false;
        }

        if settings.max_slots != self.settings.max_slots {
            let bindings = std::mem::take(&mut self.state).into_bindings();
            self.state = AssignmentState::from_saved(bindings, settings.max_slots);
        }

        info!(
            enabled = settings.enabled,
            max_slots = settings.max_slots,
            led_overflow = ?settings.led_overflow,
            "Auto-assign settings updated"
        );
        self.settings = settings;
        true
    }

    /// One atomic assign + reconcile + color pass over the connected list
    fn reconcile_now(&mut self) {
        if !self.settings.enabled {
            debug!("Auto-assign disabled, skipping reconciliation");
            return;
        }

        let outcome = run_pass(
            &self.connected,
            self.state.bindings(),
            self.provider.as_ref(),
            self.settings.pass_options(),
        );
        self.pass_count += 1;

        for slot in &outcome.bindings {
            debug!(
                player = slot.slot_index + 1,
                device_id = %slot.device_id,
                controller_type = ?slot.binding.controller_type(),
                "Slot assigned"
            );
        }

        self.state.replace(outcome.bindings);
        self.consumer.apply(self.state.bindings());

        if outcome.should_persist {
            self.persist_count += 1;
            self.store.save(self.state.bindings());
        } else if outcome.introduced_new_device {
            warn!("New device reported without persistence request");
        }
    }
}
