//! VFS301 command definitions

use std::fmt;

use crate::error::{Error, Result};
use crate::sequence::ProtocolGeneration;

/// Command type codes
///
/// Single-byte opcodes are sent as-is. `Scan` and `Calibration` are the
/// two-byte prefixes of templated commands.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CommandType {
    /// Reset the command context, answered by a 38 byte reply
    Reset = 0x01,

    /// End of capture
    EndCapture = 0x04,

    /// Register writes, only ever sent as pre-encoded blobs
    Setup = 0x06,

    /// Configuration with a subtype byte
    Configure = 0x0B,

    /// Poll for a finger event
    Poll = 0x17,

    /// Identify, answered by 64 + 4 bytes
    Identify = 0x19,

    /// Precedes every `Setup` blob
    Prepare = 0x1A,

    /// Scan control (illumination, next-scan arming)
    Scan = 0x0220,

    /// Calibration upload
    Calibration = 0x02D0,
}

impl CommandType {
    /// Check if this command type is sent as a single opcode byte
    pub fn is_bare(self) -> bool {
        matches!(
            self,
            Self::Reset | Self::EndCapture | Self::Poll | Self::Identify | Self::Prepare
        )
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::Reset => "CMD_RESET",
            Self::EndCapture => "CMD_END_CAPTURE",
            Self::Setup => "CMD_SETUP",
            Self::Configure => "CMD_CONFIGURE",
            Self::Poll => "CMD_POLL",
            Self::Identify => "CMD_IDENTIFY",
            Self::Prepare => "CMD_PREPARE",
            Self::Scan => "CMD_SCAN",
            Self::Calibration => "CMD_CALIBRATION",
        }
    }
}

impl From<CommandType> for u16 {
    fn from(cmd: CommandType) -> u16 {
        cmd as u16
    }
}

impl TryFrom<u16> for CommandType {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0x01 => Ok(Self::Reset),
            0x04 => Ok(Self::EndCapture),
            0x06 => Ok(Self::Setup),
            0x0B => Ok(Self::Configure),
            0x17 => Ok(Self::Poll),
            0x19 => Ok(Self::Identify),
            0x1A => Ok(Self::Prepare),
            0x0220 => Ok(Self::Scan),
            0x02D0 => Ok(Self::Calibration),
            _ => Err(Error::UnsupportedCommand {
                command: value,
                subtype: None,
                generation: ProtocolGeneration::default(),
            }),
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u16)
    }
}

/// Pre-encoded command blobs captured from the vendor driver
///
/// These are transmitted byte-for-byte; nothing in them is generated at
/// runtime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RawBlob {
    Setup1,
    Setup2,
    Setup3,
    Setup4,
    /// Sent after the last calibration upload
    CalibrationDone,
    /// Turns the illumination on
    Illuminate,
}

impl RawBlob {
    pub fn name(self) -> &'static str {
        match self {
            Self::Setup1 => "setup_06_1",
            Self::Setup2 => "setup_06_2",
            Self::Setup3 => "setup_06_3",
            Self::Setup4 => "setup_06_4",
            Self::CalibrationDone => "calibration_12",
            Self::Illuminate => "illuminate_24",
        }
    }
}

/// A command as sent to the sensor
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Single opcode byte, no payload
    Bare(CommandType),

    /// `0x0B` with a subtype (`0x04` or `0x05`)
    Configure(u8),

    /// `0x02D0` with a subtype in `1..=7`
    Calibration(u8),

    /// `0x0220` with subtype `1..=3` or a next-scan subtype
    Scan(u16),

    /// Literal blob
    Raw(RawBlob),
}

impl Command {
    pub const RESET: Self = Self::Bare(CommandType::Reset);
    pub const END_CAPTURE: Self = Self::Bare(CommandType::EndCapture);
    pub const POLL: Self = Self::Bare(CommandType::Poll);
    pub const IDENTIFY: Self = Self::Bare(CommandType::Identify);
    pub const PREPARE: Self = Self::Bare(CommandType::Prepare);

    /// Command type code this command is encoded under
    pub fn command_type(&self) -> u16 {
        match self {
            Self::Bare(kind) => (*kind).into(),
            Self::Configure(_) => CommandType::Configure.into(),
            Self::Calibration(_) => CommandType::Calibration.into(),
            Self::Scan(_) => CommandType::Scan.into(),
            Self::Raw(_) => CommandType::Setup.into(),
        }
    }

    /// Subtype selector, if the command has one
    pub fn subtype(&self) -> Option<u16> {
        match self {
            Self::Bare(_) | Self::Raw(_) => None,
            Self::Configure(subtype) | Self::Calibration(subtype) => Some(u16::from(*subtype)),
            Self::Scan(subtype) => Some(*subtype),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare(kind) => write!(f, "{}", kind),
            Self::Configure(subtype) => write!(f, "CMD_CONFIGURE(0x0B/0x{:02X})", subtype),
            Self::Calibration(subtype) => write!(f, "CMD_CALIBRATION(0x02D0/{})", subtype),
            Self::Scan(subtype) => write!(f, "CMD_SCAN(0x0220/0x{:04X})", subtype),
            Self::Raw(blob) => write!(f, "RAW({})", blob.name()),
        }
    }
}
