//! USB endpoints used by the sensor

use std::fmt;

/// Logical endpoint of the sensor
///
/// The sensor exposes one bulk OUT endpoint for commands and two bulk IN
/// endpoints: a control-reply endpoint for short acknowledgements and
/// status replies, and a data endpoint for calibration dumps and scan lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Endpoint {
    Send = 0x01,
    RecvCtrl = 0x81,
    RecvData = 0x82,
}

impl Endpoint {
    /// USB endpoint address
    pub fn address(self) -> u8 {
        self as u8
    }

    /// Check if the host reads from this endpoint
    pub fn is_in(self) -> bool {
        self.address() & 0x80 != 0
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Send => "SEND",
            Self::RecvCtrl => "RECV_CTRL",
            Self::RecvData => "RECV_DATA",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), self.address())
    }
}
