//! High-level error types

use std::io;

use vfs301_core::Endpoint;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] vfs301_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] vfs301_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] vfs301_types::Error),

    #[error("Image sink error: {0}")]
    Sink(#[from] io::Error),

    #[error("Protocol violation during {step}: {detail}")]
    ProtocolViolation { step: &'static str, detail: String },

    #[error("Unexpected poll status: {}", hex_preview(.0))]
    UnexpectedStatus(Vec<u8>),

    #[error("Short reply on {endpoint}: expected {expected} bytes, got {actual} bytes")]
    ShortReply {
        endpoint: Endpoint,
        expected: usize,
        actual: usize,
    },
}

impl Error {
    /// Check if only the current swipe is lost
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Core(e) => e.is_recoverable(),
            _ => false,
        }
    }

    /// Check if the session has to be reset and brought up again
    pub fn requires_restart(&self) -> bool {
        match self {
            Self::Core(e) => !e.is_recoverable() && !matches!(e, vfs301_core::Error::SessionShutDown),
            Self::Transport(_)
            | Self::ProtocolViolation { .. }
            | Self::UnexpectedStatus(_)
            | Self::ShortReply { .. } => true,
            Self::Types(_) | Self::Sink(_) => false,
        }
    }

    /// Check if a transfer timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Check if the session stopped on request
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Core(vfs301_core::Error::SessionShutDown))
    }
}

fn hex_preview(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect()
}
