//! Transport layer for VFS301 sensors
//!
//! The protocol talks to three bulk endpoints of the sensor. A transport
//! moves bytes to and from those endpoints; it knows nothing about the
//! commands it carries.

pub mod error;
pub mod scripted;

pub use error::{Error, Result};
pub use scripted::{Exchange, ScriptedTransport};

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use vfs301_core::Endpoint;

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write a complete message to an OUT endpoint
    async fn send(&mut self, endpoint: Endpoint, data: &[u8]) -> Result<()>;

    /// Read up to `max_len` bytes from an IN endpoint
    ///
    /// A reply shorter than `max_len` is not an error. Returns
    /// [`Error::Timeout`] if nothing arrives within `timeout`.
    async fn receive(
        &mut self,
        endpoint: Endpoint,
        max_len: usize,
        timeout: Duration,
    ) -> Result<BytesMut>;

    /// Human readable description of the underlying device
    fn description(&self) -> String;
}
