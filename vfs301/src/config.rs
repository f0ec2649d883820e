//! Device configuration

use std::time::Duration;

use vfs301_core::constants::{DEFAULT_MIN_IMAGE_HEIGHT, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use vfs301_core::{LineWidth, ProtocolGeneration};
use vfs301_types::SensorModel;

/// Settings of one capture session
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vfs301::{DeviceConfig, LineWidth};
///
/// let config = DeviceConfig::default()
///     .with_timeout(Duration::from_millis(500))
///     .with_line_width(LineWidth::Raw);
///
/// assert_eq!(config.line_width, LineWidth::Raw);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Protocol generation the encoder and state machine follow
    pub generation: ProtocolGeneration,

    /// Sensor the session talks to, used to identify it in logs
    ///
    /// USB IDs do not tell which protocol generation a sensor speaks, so
    /// the model never selects one; set [`generation`](Self::generation)
    /// explicitly.
    pub model: SensorModel,

    /// Bound of every single send or receive
    pub timeout: Duration,

    /// Sleep between two idle polls
    pub poll_interval: Duration,

    /// Row width of accumulated lines and of produced images
    pub line_width: LineWidth,

    /// Images with this many rows or fewer are dropped
    pub min_image_height: usize,

    /// Stop reading blocks as soon as the last lines show no finger
    pub finish_detection: bool,
}

impl DeviceConfig {
    pub fn with_generation(mut self, generation: ProtocolGeneration) -> Self {
        self.generation = generation;
        self
    }

    /// Set the sensor model; leaves the protocol generation as it is
    pub fn with_model(mut self, model: SensorModel) -> Self {
        self.model = model;
        self
    }

    /// Set transfer timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set delay between idle polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_line_width(mut self, line_width: LineWidth) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn with_min_image_height(mut self, min_image_height: usize) -> Self {
        self.min_image_height = min_image_height;
        self
    }

    pub fn with_finish_detection(mut self, enabled: bool) -> Self {
        self.finish_detection = enabled;
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            generation: ProtocolGeneration::default(),
            model: SensorModel::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            line_width: LineWidth::default(),
            min_image_height: DEFAULT_MIN_IMAGE_HEIGHT,
            finish_detection: false,
        }
    }
}
