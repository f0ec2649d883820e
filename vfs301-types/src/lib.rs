//! Type definitions for vfs301

pub mod error;
pub mod image;
pub mod sensor;

pub use error::{Error, Result};
pub use image::Image;
pub use sensor::SensorModel;
