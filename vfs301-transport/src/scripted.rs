//! Scripted in-memory transport
//!
//! Replays a fixed list of endpoint replies and records everything the
//! host sends. Used to drive the protocol without hardware, either from
//! tests or from a recorded capture.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use tracing::{trace, warn};
use vfs301_core::Endpoint;

use crate::{error::*, Transport};

/// One scripted event on an IN endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// The endpoint delivers these bytes
    Reply { endpoint: Endpoint, data: Bytes },

    /// The endpoint stays silent until the read times out
    Timeout { endpoint: Endpoint },
}

impl Exchange {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Reply { endpoint, .. } | Self::Timeout { endpoint } => *endpoint,
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    pending: VecDeque<Exchange>,
    sent: Vec<Bytes>,
    reads: Vec<(Endpoint, usize)>,
}

/// In-memory transport following a script
///
/// Clones share the same script, so a test can keep a handle to inspect
/// what was sent after the transport has been moved into a device.
///
/// Reads must happen in script order: reading an endpoint other than the
/// one the next event is scripted for is an error. Once the script is
/// exhausted every read fails with [`Error::Disconnected`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the script
    pub fn push(&self, exchange: Exchange) -> &Self {
        self.script.lock().pending.push_back(exchange);
        self
    }

    /// Append a reply on `endpoint`
    pub fn reply(&self, endpoint: Endpoint, data: impl Into<Bytes>) -> &Self {
        self.push(Exchange::Reply {
            endpoint,
            data: data.into(),
        })
    }

    /// Append a silent read on `endpoint`
    pub fn timeout(&self, endpoint: Endpoint) -> &Self {
        self.push(Exchange::Timeout { endpoint })
    }

    /// Messages sent so far, in order
    pub fn sent(&self) -> Vec<Bytes> {
        self.script.lock().sent.clone()
    }

    /// Reads performed so far as (endpoint, requested length)
    pub fn reads(&self) -> Vec<(Endpoint, usize)> {
        self.script.lock().reads.clone()
    }

    /// Number of scripted events not consumed yet
    pub fn remaining(&self) -> usize {
        self.script.lock().pending.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, endpoint: Endpoint, data: &[u8]) -> Result<()> {
        if endpoint.is_in() {
            return Err(Error::Script(format!("cannot send to {}", endpoint)));
        }

        trace!(
            "Sending {} bytes to {}: {:02X?}",
            data.len(),
            endpoint,
            &data[..data.len().min(32)]
        );

        self.script.lock().sent.push(Bytes::copy_from_slice(data));
        Ok(())
    }

    async fn receive(
        &mut self,
        endpoint: Endpoint,
        max_len: usize,
        timeout: Duration,
    ) -> Result<BytesMut> {
        // the lock must not be held across the simulated wait
        let next = {
            let mut script = self.script.lock();
            script.reads.push((endpoint, max_len));

            let scripted = script
                .pending
                .front()
                .map(Exchange::endpoint)
                .ok_or(Error::Disconnected)?;

            if scripted != endpoint {
                return Err(Error::Script(format!(
                    "read on {} but next event is scripted for {}",
                    endpoint, scripted
                )));
            }

            script.pending.pop_front()
        };

        match next {
            Some(Exchange::Reply { data, .. }) => {
                let n = data.len().min(max_len);
                if n < data.len() {
                    warn!(
                        "Scripted reply of {} bytes truncated to {} on {}",
                        data.len(),
                        n,
                        endpoint
                    );
                }

                trace!(
                    "Received {} bytes from {}: {:02X?}",
                    n,
                    endpoint,
                    &data[..n.min(32)]
                );

                Ok(BytesMut::from(&data[..n]))
            }
            Some(Exchange::Timeout { .. }) => {
                tokio::time::sleep(timeout).await;
                Err(Error::Timeout {
                    endpoint,
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            None => Err(Error::Disconnected),
        }
    }

    fn description(&self) -> String {
        format!("scripted ({} events pending)", self.remaining())
    }
}
