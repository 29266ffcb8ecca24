//! Device registry adapters
//!
//! A registry reports which gamepads are present. Adapters push
//! [`RegistryEvent`]s onto an unbounded channel from whatever thread they run
//! on; [`forward_events`] drains that channel into the reconciler.

mod gilrs_registry;

pub use gilrs_registry::{list_devices, GilrsRegistry};

use crate::device::Device;
use crate::reconciler::ReconcileActorHandle;
use tokio::sync::mpsc;
use tracing::debug;

/// Change reported by a device registry
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// Every device currently present, in enumeration order
    Snapshot(Vec<Device>),
    Connected(Device),
    /// Normalized device id
    Disconnected(String),
}

/// Forward registry events to the reconciler until the registry goes away
pub async fn forward_events(
    mut event_rx: mpsc::UnboundedReceiver<RegistryEvent>,
    handle: ReconcileActorHandle,
) {
    while let Some(event) = event_rx.recv().await {
        match event {
            RegistryEvent::Snapshot(devices) => handle.resync(devices),
            RegistryEvent::Connected(device) => {
                handle.on_device_connected(&device.device_id, device.display_name)
            }
            RegistryEvent::Disconnected(device_id) => handle.on_device_disconnected(&device_id),
        }
    }
    debug!("Registry event stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AutoAssignConfig;
    use crate::defaults::SwitchDefaults;
    use crate::reconciler::{ReconcileActor, SharedSlots};
    use std::sync::Arc;

    struct NullStore;

    impl crate::reconciler::SlotStore for NullStore {
        fn save(&self, _bindings: &[crate::slots::SlotBinding]) {}
    }

    #[tokio::test]
    async fn test_forward_events_drives_actor() {
        let handle = ReconcileActor::spawn(
            AutoAssignConfig::default(),
            Vec::new(),
            Arc::new(SwitchDefaults),
            Arc::new(SharedSlots::new()),
            Arc::new(NullStore),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(RegistryEvent::Snapshot(vec![Device::new("A", "Pad")])).unwrap();
        tx.send(RegistryEvent::Connected(Device::new("B", "Pad"))).unwrap();
        tx.send(RegistryEvent::Disconnected("A".into())).unwrap();
        drop(tx);

        forward_events(rx, handle.clone()).await;

        let connected = handle.connected().await;
        assert_eq!(connected, vec![Device::new("B", "Pad")]);
        handle.shutdown();
    }
}
