//! Transport errors

use std::io;

use vfs301_core::Endpoint;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Timeout on {endpoint} after {timeout_ms} ms")]
    Timeout { endpoint: Endpoint, timeout_ms: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Scripted transport: {0}")]
    Script(String),
}

impl Error {
    /// Check if the endpoint simply had nothing to deliver
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = Error::Timeout {
            endpoint: Endpoint::RecvCtrl,
            timeout_ms: 300,
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Timeout on RECV_CTRL(0x81) after 300 ms");
    }

    #[test]
    fn test_other_errors_are_not_timeouts() {
        assert!(!Error::Disconnected.is_timeout());
        assert!(!Error::Script("empty".into()).is_timeout());
    }
}
