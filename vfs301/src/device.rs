//! High-level device interface

use bytes::BytesMut;
use tracing::{debug, info, trace, warn};

use vfs301_core::constants::{status, CAPTURE_PREAMBLE_SIZE, FIRST_BLOCK_SIZE, NEXT_BLOCK_SIZE};
use vfs301_core::sequence::{Reply, Step, UnorderedPair, ARM, POST_CAPTURE};
use vfs301_core::{reconstruct, Capture, Command, Encoder, Endpoint, Session, SessionState};
use vfs301_transport::Transport;
use vfs301_types::Image;

use crate::config::DeviceConfig;
use crate::error::{Error, Result};
use crate::sink::ImageSink;

/// VFS301 capture session
///
/// Drives one sensor through bring-up, finger detection and capture over
/// a [`Transport`]. Every transfer is awaited before the next one starts.
///
/// # Examples
///
/// ```no_run
/// use vfs301::{Device, PgmWriter, ScriptedTransport};
///
/// #[tokio::main]
/// async fn main() -> vfs301::Result<()> {
///     let mut device = Device::new(ScriptedTransport::new());
///     let mut sink = PgmWriter::new(".");
///
///     let images = device.run(&mut sink).await?;
///     println!("Captured {} images", images);
///     Ok(())
/// }
/// ```
pub struct Device {
    transport: Box<dyn Transport>,
    session: Session,
    encoder: Encoder,
    capture: Capture,
    config: DeviceConfig,
}

/// Requests a running session to stop
///
/// The request is observed between two transfers; a transfer in flight is
/// never interrupted.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    session: Session,
}

impl ShutdownHandle {
    pub fn request(&self) {
        self.session.request_shutdown();
    }

    pub fn is_requested(&self) -> bool {
        self.session.is_shutdown_requested()
    }
}

/// Order in which an unordered reply pair arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrivalOrder {
    Expected,
    Swapped,
}

/// Decoded poll status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FingerStatus {
    Idle,
    Present,
}

impl FingerStatus {
    fn parse(reply: &[u8]) -> Result<Self> {
        if reply.iter().all(|&b| b == 0) {
            Ok(Self::Idle)
        } else if reply.get(status::EVENT_INDEX) == Some(&status::FINGER_PRESENT) {
            Ok(Self::Present)
        } else {
            Err(Error::UnexpectedStatus(reply.to_vec()))
        }
    }
}

impl Device {
    /// Create a device with the default configuration
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(transport, DeviceConfig::default())
    }

    pub fn with_config(transport: impl Transport + 'static, config: DeviceConfig) -> Self {
        Self {
            transport: Box::new(transport),
            session: Session::new(),
            encoder: Encoder::new(config.generation),
            capture: Capture::new(config.line_width),
            config,
        }
    }

    /// Set transfer timeout
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Use a different command encoder, e.g. one with captured fragment tables
    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Lines accumulated by the last capture
    pub fn last_capture(&self) -> &Capture {
        &self.capture
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            session: self.session.clone(),
        }
    }

    /// Run the bring-up sequence
    ///
    /// # Errors
    ///
    /// Any failed step is fatal and moves the session to
    /// [`SessionState::Failed`]; it must be [reset](Self::reset) before
    /// trying again.
    pub async fn initialize(&mut self) -> Result<()> {
        info!(
            "Initializing {} via {} ({:?} protocol)...",
            self.config.model,
            self.transport.description(),
            self.config.generation
        );

        self.session.begin_initialization()?;

        let steps = self.config.generation.bring_up();
        let result = self.run_steps("bring-up", &steps).await;
        self.fail_on_error(result)?;

        self.session.finish_initialization()?;

        info!("Sensor initialized ({} steps)", steps.len());
        Ok(())
    }

    /// Poll until a finger is on the sensor
    ///
    /// Returns the number of idle polls before the finger was seen. A
    /// fatal error moves the session to [`SessionState::Failed`].
    pub async fn wait_for_finger(&mut self) -> Result<usize> {
        self.ensure_state(SessionState::WaitingForEvent)?;
        let result = self.poll_for_finger().await;
        self.fail_on_error(result)
    }

    /// Read one swipe and reconstruct it
    ///
    /// Returns `None` if the swipe produced no lines or an image not
    /// taller than the configured minimum. A fatal error moves the session
    /// to [`SessionState::Failed`]; a shutdown request seen between block
    /// reads moves it to [`SessionState::ShutDown`] instead.
    pub async fn capture(&mut self) -> Result<Option<Image>> {
        self.ensure_state(SessionState::Capturing)?;
        let result = self.read_swipe().await;
        self.fail_on_error(result)?;
        self.build_image()
    }

    /// Capture until shut down, handing every image to `sink`
    ///
    /// Initializes the session first if needed. Returns the number of
    /// delivered images.
    pub async fn run(&mut self, sink: &mut dyn ImageSink) -> Result<usize> {
        if self.session.state() == SessionState::Uninitialized {
            self.initialize().await?;
        }

        let mut delivered = 0;
        loop {
            let image = match self.next_image().await {
                Ok(image) => image,
                Err(e) if e.is_shutdown() => break,
                Err(e) => return Err(e),
            };

            if let Some(image) = image {
                sink.accept(&image)?;
                delivered += 1;
            }
        }

        info!("Capture loop stopped after {} images", delivered);
        Ok(delivered)
    }

    /// Stop the session
    pub fn shutdown(&mut self) {
        if !self.session.is_shut_down() {
            info!("Shutting down session");
        }
        self.session.shut_down();
    }

    /// Return to `Uninitialized` so the session can be brought up again
    pub fn reset(&mut self) {
        debug!("Resetting session from {:?}", self.session.state());
        self.session.reset();
        self.capture.reset();
    }

    // Helper methods

    async fn poll_for_finger(&mut self) -> Result<usize> {
        self.check_shutdown()?;

        if self.config.generation.arms_before_wait() {
            self.run_steps("arm", ARM).await?;
        }

        let mut idle = 0;
        loop {
            self.check_shutdown()?;

            self.send_command(&Command::POLL).await?;
            let reply = self.expect_reply(Reply::ctrl(status::LEN)).await?;

            match FingerStatus::parse(&reply)? {
                FingerStatus::Present => break,
                FingerStatus::Idle => {
                    idle += 1;
                    trace!(idle, "No finger");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }

        self.session.begin_capture()?;

        info!("Finger detected after {} idle polls", idle);
        Ok(idle)
    }

    async fn read_swipe(&mut self) -> Result<()> {
        self.capture.reset();

        let preamble = self.receive(Reply::data(CAPTURE_PREAMBLE_SIZE)).await?;
        trace!("Capture preamble: {:02X?}", &preamble[..preamble.len().min(16)]);

        self.read_blocks().await?;
        self.acknowledge_capture().await?;

        if self.config.generation.arms_after_capture() {
            self.run_steps("re-arm", ARM).await?;
        }

        self.session.finish_capture()?;
        Ok(())
    }

    /// Move the session to `Failed` on any error other than a shutdown
    fn fail_on_error<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if !e.is_shutdown() {
                warn!("Session failed in state {:?}: {}", self.session.state(), e);
                self.session.fail();
            }
        }
        result
    }

    async fn next_image(&mut self) -> Result<Option<Image>> {
        self.wait_for_finger().await?;
        self.capture().await
    }

    async fn read_blocks(&mut self) -> Result<()> {
        let mut first_block = true;

        loop {
            self.check_shutdown()?;

            let requested = if first_block { FIRST_BLOCK_SIZE } else { NEXT_BLOCK_SIZE };

            let block = match self
                .transport
                .receive(Endpoint::RecvData, requested, self.config.timeout)
                .await
            {
                Ok(block) => block,
                Err(e) if e.is_timeout() => {
                    debug!("No more data, swipe finished");
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            if block.is_empty() {
                debug!("Empty block, swipe finished");
                break;
            }

            let summary = self.capture.append(first_block, &block)?;
            first_block = false;

            if block.len() < requested {
                debug!(
                    "Short block ({} of {} bytes), swipe finished",
                    block.len(),
                    requested
                );
                break;
            }

            if self.config.finish_detection && summary.finished {
                debug!("Finger left the sensor");
                break;
            }
        }

        debug!(
            lines = self.capture.len(),
            blocks = self.capture.blocks(),
            "Block loop done"
        );
        Ok(())
    }

    async fn acknowledge_capture(&mut self) -> Result<()> {
        for (command, pair) in POST_CAPTURE {
            self.send_command(command).await?;

            if self.receive_pair(*pair).await? == ArrivalOrder::Swapped {
                warn!("Replies to {} arrived in swapped order", command);
            }
        }
        Ok(())
    }

    /// Receive a pair of replies whose order is not guaranteed
    ///
    /// Tries the primary reply first. If it times out, the secondary is
    /// read and then the primary once more; no further retries. An
    /// optional secondary may be absent in either order.
    async fn receive_pair(&mut self, pair: UnorderedPair) -> Result<ArrivalOrder> {
        match self.expect_reply(pair.primary).await {
            Ok(_) => {
                match self.expect_reply(pair.secondary).await {
                    Ok(_) => {}
                    Err(e) if e.is_timeout() && pair.secondary_optional => {
                        debug!("Optional reply on {} absent", pair.secondary.endpoint);
                    }
                    Err(e) => return Err(e),
                }
                Ok(ArrivalOrder::Expected)
            }
            Err(e) if e.is_timeout() => {
                debug!(
                    "No reply on {}, reading {} first",
                    pair.primary.endpoint, pair.secondary.endpoint
                );

                match self.expect_reply(pair.secondary).await {
                    Ok(_) => {}
                    Err(e) if e.is_timeout() && pair.secondary_optional => {
                        debug!("Optional reply on {} absent", pair.secondary.endpoint);
                    }
                    Err(e) if e.is_timeout() => return Err(Self::neither_order(pair)),
                    Err(e) => return Err(e),
                }

                match self.expect_reply(pair.primary).await {
                    Ok(_) => Ok(ArrivalOrder::Swapped),
                    Err(e) if e.is_timeout() => Err(Self::neither_order(pair)),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn neither_order(pair: UnorderedPair) -> Error {
        Error::ProtocolViolation {
            step: "end of capture",
            detail: format!(
                "replies on {} and {} arrived in neither order",
                pair.primary.endpoint, pair.secondary.endpoint
            ),
        }
    }

    fn build_image(&self) -> Result<Option<Image>> {
        let image = match reconstruct(&self.capture) {
            Ok(image) => image,
            Err(e) if e.is_recoverable() => {
                warn!("Capture contained no lines, skipping");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if image.height() <= self.config.min_image_height {
            warn!(
                "Image too short ({} rows from {} lines), skipping",
                image.height(),
                self.capture.len()
            );
            return Ok(None);
        }

        info!(
            "Captured {}x{} image from {} lines",
            image.width(),
            image.height(),
            self.capture.len()
        );
        Ok(Some(image))
    }

    async fn run_steps(&mut self, name: &str, steps: &[Step]) -> Result<()> {
        debug!("Running {} ({} steps)", name, steps.len());

        for step in steps {
            match step {
                Step::Send(command) => self.send_command(command).await?,
                Step::Receive(reply) => {
                    self.expect_reply(*reply).await?;
                }
            }
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &Command) -> Result<()> {
        let data = self.encoder.encode_command(command)?;

        trace!(
            "Sending {} ({} bytes): {:02X?}",
            command,
            data.len(),
            &data[..data.len().min(32)]
        );

        self.transport.send(Endpoint::Send, &data).await?;
        Ok(())
    }

    async fn receive(&mut self, reply: Reply) -> Result<BytesMut> {
        let data = self
            .transport
            .receive(reply.endpoint, reply.len, self.config.timeout)
            .await?;

        trace!("Received {} bytes on {}", data.len(), reply.endpoint);
        Ok(data)
    }

    /// Receive a reply; control replies must have the exact length
    async fn expect_reply(&mut self, reply: Reply) -> Result<BytesMut> {
        let data = self.receive(reply).await?;

        if reply.endpoint == Endpoint::RecvCtrl && data.len() != reply.len {
            return Err(Error::ShortReply {
                endpoint: reply.endpoint,
                expected: reply.len,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    fn ensure_state(&self, expected: SessionState) -> Result<()> {
        let state = self.session.state();
        match state {
            SessionState::ShutDown => return Err(vfs301_core::Error::SessionShutDown.into()),
            SessionState::Failed => return Err(vfs301_core::Error::RestartRequired.into()),
            _ => {}
        }
        if state != expected {
            return Err(vfs301_core::Error::InvalidSessionState(format!(
                "expected {:?}, session is {:?}",
                expected, state
            ))
            .into());
        }
        Ok(())
    }

    fn check_shutdown(&self) -> Result<()> {
        if self.session.is_shutdown_requested() {
            info!("Shutdown requested in state {:?}", self.session.state());
            self.session.shut_down();
            return Err(vfs301_core::Error::SessionShutDown.into());
        }
        Ok(())
    }
}
