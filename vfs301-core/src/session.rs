//! Protocol session state
//!
//! A session tracks where the device is in its protocol lifecycle:
//!
//! ```text
//! Uninitialized -> Initializing -> WaitingForEvent <-> Capturing
//!                                      any state -> Failed
//!                                      any state -> ShutDown
//! ```
//!
//! This is independent of the transport's claim/reset state. A session
//! that failed or was shut down has to be reset before it can be
//! initialized again.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Bring-up not started
    Uninitialized,

    /// Bring-up sequence running
    Initializing,

    /// Polling for a finger
    WaitingForEvent,

    /// Reading scan lines
    Capturing,

    /// A fatal error interrupted bring-up, polling or capture
    Failed,

    /// Stopped on request
    ShutDown,
}

/// Session manager
///
/// Cheap to clone (Arc internally); clones share state, so a clone can be
/// handed to another task to request a shutdown.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Current session state
    state: parking_lot::RwLock<SessionState>,

    /// Set from outside, observed between blocking calls
    shutdown_requested: AtomicBool,

    /// Completed captures since the last reset
    captures: AtomicU32,
}

impl Session {
    /// Create a new uninitialized session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: parking_lot::RwLock::new(SessionState::Uninitialized),
                shutdown_requested: AtomicBool::new(false),
                captures: AtomicU32::new(0),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if bring-up has completed and no capture is running
    pub fn is_waiting(&self) -> bool {
        matches!(self.state(), SessionState::WaitingForEvent)
    }

    pub fn is_shut_down(&self) -> bool {
        matches!(self.state(), SessionState::ShutDown)
    }

    /// Enter bring-up
    pub fn begin_initialization(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        match *state {
            SessionState::Uninitialized => {
                *state = SessionState::Initializing;
                Ok(())
            }
            SessionState::ShutDown => Err(Error::SessionShutDown),
            SessionState::Failed => Err(Error::RestartRequired),
            other => Err(Error::InvalidSessionState(format!(
                "Cannot initialize from state: {:?}",
                other
            ))),
        }
    }

    /// Leave bring-up
    pub fn finish_initialization(&self) -> Result<()> {
        self.transition(SessionState::Initializing, SessionState::WaitingForEvent)
    }

    /// Finger detected, start reading lines
    pub fn begin_capture(&self) -> Result<()> {
        self.transition(SessionState::WaitingForEvent, SessionState::Capturing)
    }

    /// Capture done, back to polling
    pub fn finish_capture(&self) -> Result<()> {
        self.transition(SessionState::Capturing, SessionState::WaitingForEvent)?;
        self.inner.captures.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Ask the protocol loop to stop at its next check
    pub fn request_shutdown(&self) {
        self.inner.shutdown_requested.store(true, Ordering::Release);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.inner.shutdown_requested.load(Ordering::Acquire)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state(), SessionState::Failed)
    }

    /// Move to `Failed` unless already shut down
    pub fn fail(&self) {
        let mut state = self.inner.state.write();
        if *state != SessionState::ShutDown {
            *state = SessionState::Failed;
        }
    }

    /// Move to `ShutDown` from any state
    pub fn shut_down(&self) {
        *self.inner.state.write() = SessionState::ShutDown;
    }

    /// Full reset back to `Uninitialized`
    pub fn reset(&self) {
        *self.inner.state.write() = SessionState::Uninitialized;
        self.inner.shutdown_requested.store(false, Ordering::Release);
        self.inner.captures.store(0, Ordering::Release);
    }

    /// Completed captures since the last reset
    pub fn captures(&self) -> u32 {
        self.inner.captures.load(Ordering::Acquire)
    }

    fn transition(&self, from: SessionState, to: SessionState) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != from {
            return Err(Error::InvalidSessionState(format!(
                "Cannot move to {:?} from state: {:?}",
                to, *state
            )));
        }

        *state = to;
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(!session.is_waiting());
        assert!(!session.is_shutdown_requested());
    }

    #[test]
    fn test_session_lifecycle() {
        let session = Session::new();
        session.begin_initialization().unwrap();
        assert_eq!(session.state(), SessionState::Initializing);

        session.finish_initialization().unwrap();
        assert!(session.is_waiting());

        session.begin_capture().unwrap();
        assert_eq!(session.state(), SessionState::Capturing);

        session.finish_capture().unwrap();
        assert!(session.is_waiting());
        assert_eq!(session.captures(), 1);
    }

    #[test]
    fn test_invalid_state_transitions() {
        let session = Session::new();

        // Cannot capture before bring-up
        assert!(session.begin_capture().is_err());
        assert!(session.finish_initialization().is_err());

        // Cannot initialize twice
        session.begin_initialization().unwrap();
        assert!(session.begin_initialization().is_err());
    }

    #[test]
    fn test_shut_down_requires_reset() {
        let session = Session::new();
        session.begin_initialization().unwrap();
        session.shut_down();

        assert!(session.is_shut_down());
        assert!(matches!(
            session.begin_initialization(),
            Err(Error::SessionShutDown)
        ));

        session.reset();
        assert_eq!(session.state(), SessionState::Uninitialized);
        session.begin_initialization().unwrap();
    }

    #[test]
    fn test_failed_requires_reset() {
        let session = Session::new();
        session.begin_initialization().unwrap();
        session.finish_initialization().unwrap();
        session.begin_capture().unwrap();
        session.fail();

        assert!(session.is_failed());
        assert!(session.finish_capture().is_err());
        assert!(matches!(
            session.begin_initialization(),
            Err(Error::RestartRequired)
        ));

        session.reset();
        assert_eq!(session.state(), SessionState::Uninitialized);
        session.begin_initialization().unwrap();
    }

    #[test]
    fn test_fail_keeps_shut_down() {
        let session = Session::new();
        session.shut_down();
        session.fail();
        assert!(session.is_shut_down());
    }

    #[test]
    fn test_shutdown_request_shared_between_clones() {
        let session = Session::new();
        let handle = session.clone();

        handle.request_shutdown();
        assert!(session.is_shutdown_requested());

        session.reset();
        assert!(!handle.is_shutdown_requested());
    }
}
