//! Command enum for the reconciler actor

use crate::config::AutoAssignConfig;
use crate::device::Device;
use crate::slots::SlotBinding;
use tokio::sync::oneshot;

/// Commands for the reconciler actor
///
/// Device and settings commands each trigger at most one full pass. Queries
/// answer over a oneshot channel and never trigger a pass.
#[derive(Debug)]
pub enum ReconcileCommand {
    // -------------------------------------------------------------------------
    // Registry notifications
    // -------------------------------------------------------------------------
    /// A device appeared
    Connected(Device),

    /// A device went away (normalized id)
    Disconnected(String),

    /// Replace the connected list with a full registry snapshot
    Resync(Vec<Device>),

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------
    /// New auto-assign settings (hot reload)
    UpdateSettings(AutoAssignConfig),

    /// Run a pass over the current connected list
    Refresh,

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------
    /// Current slot table
    GetSlots(oneshot::Sender<Vec<SlotBinding>>),

    /// Currently connected devices in registry order
    GetConnected(oneshot::Sender<Vec<Device>>),

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------
    Shutdown,
}
