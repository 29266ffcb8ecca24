//! Error types shared across the library
//!
//! Nothing in the assignment engine itself is fatal. These errors surface at
//! the edges and are recovered or reported by the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot build default binding for \"{name}\": {reason}")]
    Provider { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SlotError>;
