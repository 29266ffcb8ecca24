//! padslots - stable player slots for hot-plugged controllers
//!
//! Controllers come and go; players should keep their numbers. Every
//! connect/disconnect runs one reconciliation pass that maps connected
//! devices onto player slots, keeps known devices where they were, hands
//! unseen ones default bindings, and colors player LEDs by slot.

pub mod binding;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod device;
pub mod error;
pub mod paths;
pub mod reconciler;
pub mod registry;
pub mod slots;

pub use error::{Result, SlotError};
