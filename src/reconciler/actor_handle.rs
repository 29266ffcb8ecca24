//! ReconcileActorHandle - public API for the ReconcileActor
//!
//! Notifications are fire-and-forget so they can be sent from blocking
//! driver threads. Queries await a oneshot reply.

use tokio::sync::{mpsc, oneshot};

use super::commands::ReconcileCommand;
use crate::config::AutoAssignConfig;
use crate::device::{normalize_device_id, Device};
use crate::slots::SlotBinding;

/// Handle for interacting with the ReconcileActor
///
/// # Notifications (fire-and-forget)
/// - `on_device_connected` / `on_device_disconnected` - hot-plug events
/// - `resync` - full registry snapshot
/// - `update_settings` / `refresh` - settings changes and manual passes
///
/// # Queries (async with response)
/// - `slots` - current slot table
/// - `connected` - currently connected devices
#[derive(Clone)]
pub struct ReconcileActorHandle {
    cmd_tx: mpsc::UnboundedSender<ReconcileCommand>,
}

impl ReconcileActorHandle {
    pub fn new(cmd_tx: mpsc::UnboundedSender<ReconcileCommand>) -> Self {
        Self { cmd_tx }
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Report a newly connected device
    ///
    /// `raw_id` may carry trailing tokens; only the first one is kept.
    pub fn on_device_connected(&self, raw_id: &str, display_name: impl Into<String>) {
        let device = Device::new(raw_id, display_name);
        let _ = self.cmd_tx.send(ReconcileCommand::Connected(device));
    }

    pub fn on_device_disconnected(&self, raw_id: &str) {
        let device_id = normalize_device_id(raw_id);
        let _ = self.cmd_tx.send(ReconcileCommand::Disconnected(device_id));
    }

    /// Replace the connected list and run one pass
    pub fn resync(&self, devices: Vec<Device>) {
        let _ = self.cmd_tx.send(ReconcileCommand::Resync(devices));
    }

    pub fn update_settings(&self, settings: AutoAssignConfig) {
        let _ = self.cmd_tx.send(ReconcileCommand::UpdateSettings(settings));
    }

    pub fn refresh(&self) {
        let _ = self.cmd_tx.send(ReconcileCommand::Refresh);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current slot table, ordered by slot index
    ///
    /// Returns an empty list if the actor has stopped.
    pub async fn slots(&self) -> Vec<SlotBinding> {
        let (response_tx, response_rx) = oneshot::channel();
        if self.cmd_tx.send(ReconcileCommand::GetSlots(response_tx)).is_err() {
            return Vec::new();
        }
        response_rx.await.unwrap_or_default()
    }

    pub async fn connected(&self) -> Vec<Device> {
        let (response_tx, response_rx) = oneshot::channel();
        if self.cmd_tx.send(ReconcileCommand::GetConnected(response_tx)).is_err() {
            return Vec::new();
        }
        response_rx.await.unwrap_or_default()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Returns false once the actor has stopped
    pub fn is_alive(&self) -> bool {
        !self.cmd_tx.is_closed()
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(ReconcileCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<ReconcileActorHandle>();
    }

    #[tokio::test]
    async fn test_is_alive_when_channel_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let handle = ReconcileActorHandle::new(tx);
        assert!(!handle.is_alive());
        assert!(handle.slots().await.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_id_is_normalized() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ReconcileActorHandle::new(tx);

        handle.on_device_disconnected("abc123 Pro Controller");

        match rx.recv().await {
            Some(ReconcileCommand::Disconnected(id)) => assert_eq!(id, "abc123"),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
