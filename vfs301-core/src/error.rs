//! Error types for vfs301-core

/// Result type alias for vfs301 protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command type / subtype pair outside the closed command set
    #[error("Unsupported command 0x{command:04X} (subtype {subtype:?}) for {generation:?} protocol")]
    UnsupportedCommand {
        command: u16,
        subtype: Option<u16>,
        generation: crate::sequence::ProtocolGeneration,
    },

    /// Hex template could not be decoded
    #[error("Invalid hex template `{name}`: {reason}")]
    InvalidHexTemplate {
        name: &'static str,
        reason: String,
    },

    /// Next-scan template has no sentinel where the patch is expected
    #[error("Sentinel DEADDEAD not found at offset {offset} of template `{name}`")]
    SentinelNotFound {
        name: &'static str,
        offset: usize,
    },

    /// First block of a capture contains no line start marker
    #[error("No scan line start marker within the first {searched} bytes of the block")]
    NoStartMarker {
        searched: usize,
    },

    /// Buffer is too short to hold a scan line record
    #[error("Scan line record too short: expected {expected} bytes, got {actual} bytes")]
    RecordTooShort {
        expected: usize,
        actual: usize,
    },

    /// Reconstruction attempted on a capture without lines
    #[error("Capture contains no scan lines")]
    EmptyCapture,

    /// Invalid session state transition
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Session was shut down and must be reset first
    #[error("Session is shut down - reset it before initializing again")]
    SessionShutDown,

    /// An earlier step failed and left the sensor in an unknown state
    #[error("Session failed - reset it and run the bring-up again")]
    RestartRequired,

    /// Reconstructed rows do not form a valid image
    #[error("Image error: {0}")]
    Image(#[from] vfs301_types::Error),
}

impl Error {
    /// Check if error only affects the current swipe
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyCapture)
    }

    /// Check if error is a problem with the command encoder or its tables
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCommand { .. }
                | Self::InvalidHexTemplate { .. }
                | Self::SentinelNotFound { .. }
        )
    }

    /// Check if error means the device broke a protocol guarantee
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::NoStartMarker { .. } | Self::RecordTooShort { .. }
        )
    }
}
