//! gilrs-backed device registry with hot-plug support
//!
//! gilrs is not `Send`, so it lives on a dedicated thread for its whole
//! lifetime. The thread reports the devices present after the initial scan as
//! one snapshot, then individual connect/disconnect events.

use super::RegistryEvent;
use crate::device::Device;
use anyhow::{anyhow, Result};
use gilrs::{Event, EventType, GamepadId, Gilrs};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Time given to slow (Bluetooth) controllers to enumerate before the first snapshot
const INITIAL_SCAN: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Running gilrs registry; stops when dropped
pub struct GilrsRegistry {
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl GilrsRegistry {
    /// Start the registry thread, reporting into `event_tx`
    pub fn start(event_tx: mpsc::UnboundedSender<RegistryEvent>) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        std::thread::Builder::new()
            .name("gilrs-registry".into())
            .spawn(move || Self::event_loop_blocking(event_tx, shutdown_rx))?;

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }

    fn event_loop_blocking(
        event_tx: mpsc::UnboundedSender<RegistryEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("GilRs initialized");
                g
            }
            Err(e) => {
                warn!("Failed to initialize GilRs: {:?}", e);
                return;
            }
        };

        info!("Scanning for gamepads...");
        let scan_start = Instant::now();
        while scan_start.elapsed() < INITIAL_SCAN {
            while gilrs.next_event().is_some() {}
            std::thread::sleep(Duration::from_millis(100));
        }

        // Ids handed out so far, so disconnects report the id the device connected with
        let mut known: HashMap<GamepadId, String> = HashMap::new();

        let snapshot: Vec<Device> = gilrs
            .gamepads()
            .filter(|(_, gp)| gp.is_connected())
            .map(|(id, gp)| {
                let device = device_for(id, gp.uuid(), gp.name());
                known.insert(id, device.device_id.clone());
                device
            })
            .collect();

        info!("Found {} connected gamepad(s)", snapshot.len());
        for device in &snapshot {
            info!("  - {}: \"{}\"", device.device_id, device.display_name);
        }
        if event_tx.send(RegistryEvent::Snapshot(snapshot)).is_err() {
            return;
        }

        loop {
            match shutdown_rx.try_recv() {
                Ok(_) | Err(mpsc::error::TryRecvError::Disconnected) => {
                    info!("Gamepad registry shutting down");
                    break;
                }
                Err(mpsc::error::TryRecvError::Empty) => {}
            }

            while let Some(Event { id, event, .. }) = gilrs.next_event() {
                let report = match event {
                    EventType::Connected => {
                        let gamepad = gilrs.gamepad(id);
                        let device = device_for(id, gamepad.uuid(), gamepad.name());
                        debug!(?id, device_id = %device.device_id, "gilrs connect");
                        known.insert(id, device.device_id.clone());
                        RegistryEvent::Connected(device)
                    }
                    EventType::Disconnected => match known.remove(&id) {
                        Some(device_id) => {
                            debug!(?id, device_id = %device_id, "gilrs disconnect");
                            RegistryEvent::Disconnected(device_id)
                        }
                        None => continue,
                    },
                    _ => continue,
                };

                if event_tx.send(report).is_err() {
                    debug!("Registry receiver dropped, stopping");
                    return;
                }
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Drop for GilrsRegistry {
    fn drop(&mut self) {
        self.stop();
    }
}

fn device_for(id: GamepadId, uuid: [u8; 16], name: &str) -> Device {
    Device::new(gilrs_device_id(id, uuid), name)
}

/// `"{index}-{uuid hex}"`; the index keeps two identical pads apart
fn gilrs_device_id(id: GamepadId, uuid: [u8; 16]) -> String {
    format!("{}-{}", usize::from(id), hex::encode(uuid))
}

/// One-shot enumeration for `--list-devices`
pub fn list_devices() -> Result<Vec<Device>> {
    let mut gilrs = Gilrs::new().map_err(|e| anyhow!("Failed to initialize GilRs: {:?}", e))?;

    let scan_start = Instant::now();
    while scan_start.elapsed() < INITIAL_SCAN {
        while gilrs.next_event().is_some() {}
        std::thread::sleep(Duration::from_millis(100));
    }

    Ok(gilrs
        .gamepads()
        .filter(|(_, gp)| gp.is_connected())
        .map(|(id, gp)| device_for(id, gp.uuid(), gp.name()))
        .collect())
}
