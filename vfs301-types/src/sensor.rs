//! Supported sensor models

use std::fmt;

use crate::error::{Error, Result};

/// Validity swipe sensor model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SensorModel {
    Vfs300,
    #[default]
    Vfs301,
}

impl SensorModel {
    /// USB vendor ID shared by both models
    pub const VENDOR_ID: u16 = 0x138A;

    /// All supported models, in probing order
    pub const ALL: [SensorModel; 2] = [Self::Vfs300, Self::Vfs301];

    pub fn vendor_id(self) -> u16 {
        Self::VENDOR_ID
    }

    pub fn product_id(self) -> u16 {
        match self {
            Self::Vfs300 => 0x0008,
            Self::Vfs301 => 0x0005,
        }
    }

    /// Look up a model by its USB IDs
    pub fn from_ids(vendor_id: u16, product_id: u16) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.vendor_id() == vendor_id && m.product_id() == product_id)
            .ok_or(Error::UnknownDevice {
                vendor_id,
                product_id,
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Vfs300 => "VFS300",
            Self::Vfs301 => "VFS301",
        }
    }
}

impl fmt::Display for SensorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:04x}:{:04x})",
            self.name(),
            self.vendor_id(),
            self.product_id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids() {
        assert_eq!(SensorModel::from_ids(0x138A, 0x0005).unwrap(), SensorModel::Vfs301);
        assert_eq!(SensorModel::from_ids(0x138A, 0x0008).unwrap(), SensorModel::Vfs300);
    }

    #[test]
    fn test_unknown_ids() {
        assert!(matches!(
            SensorModel::from_ids(0x138A, 0x0011),
            Err(Error::UnknownDevice { product_id: 0x0011, .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(SensorModel::Vfs301.to_string(), "VFS301 (138a:0005)");
    }
}
