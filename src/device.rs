//! Connected device identity
//!
//! Drivers often report ids with a descriptive suffix (`"3 Joycon(L)"`).
//! Only the first whitespace-delimited token identifies the device, so ids are
//! normalized on construction and compared in that form everywhere.

use serde::{Deserialize, Serialize};

/// A physical controller as reported by the device registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Normalized id (first whitespace token of the driver-reported id)
    pub device_id: String,
    /// Human-readable name, only used to pick controller-type defaults
    pub display_name: String,
}

impl Device {
    /// Create a device, normalizing the driver-reported id
    pub fn new(raw_id: impl AsRef<str>, display_name: impl Into<String>) -> Self {
        Self {
            device_id: normalize_device_id(raw_id.as_ref()),
            display_name: display_name.into(),
        }
    }

    /// A device without an id cannot be matched or placed
    pub fn is_valid(&self) -> bool {
        !self.device_id.is_empty()
    }
}

/// Strip everything after the first whitespace-delimited token
pub fn normalize_device_id(raw: &str) -> String {
    raw.split_whitespace().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_suffix() {
        assert_eq!(normalize_device_id("5 Pro Controller"), "5");
        assert_eq!(normalize_device_id("3 Joycon(L)"), "3");
        assert_eq!(normalize_device_id("0-030000007e0500000920000000026803"), "0-030000007e0500000920000000026803");
    }

    #[test]
    fn test_normalize_trims_and_handles_empty() {
        assert_eq!(normalize_device_id("  7  Xbox"), "7");
        assert_eq!(normalize_device_id(""), "");
        assert_eq!(normalize_device_id("   "), "");
    }

    #[test]
    fn test_device_validity() {
        assert!(Device::new("1 Pad", "Pad").is_valid());
        assert!(!Device::new(" ", "Ghost").is_valid());
    }
}
