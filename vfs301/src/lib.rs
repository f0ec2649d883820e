//! # vfs301
//!
//! Userspace driver for Validity VFS300/VFS301 swipe fingerprint sensors.
//!
//! ## Features
//!
//! - Follows the bring-up and capture protocol; ships only placeholder
//!   payload tables, so real hardware needs captured ones via
//!   [`Encoder::with_fragments`](vfs301_core::Encoder::with_fragments)
//! - Reconstructs a still image from the stream of scan lines
//! - Async/await API using Tokio over any [`Transport`]
//! - Images written as PGM files or collected in memory
//!
//! ## Quick Start
//!
//! ```no_run
//! use vfs301::{Device, ScriptedTransport};
//!
//! #[tokio::main]
//! async fn main() -> vfs301::Result<()> {
//!     let mut device = Device::new(ScriptedTransport::new());
//!     device.initialize().await?;
//!
//!     device.wait_for_finger().await?;
//!     if let Some(image) = device.capture().await? {
//!         println!("{}", image);
//!     }
//!
//!     device.shutdown();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod sink;

// Re-exports
pub use config::DeviceConfig;
pub use device::{Device, ShutdownHandle};
pub use error::{Error, Result};
pub use sink::{ImageSink, PgmWriter};

pub use vfs301_core::{Capture, Encoder, LineWidth, ProtocolGeneration, SessionState};
pub use vfs301_transport::{ScriptedTransport, Transport};
pub use vfs301_types::{Image, SensorModel};
