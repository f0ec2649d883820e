//! # vfs301-core
//!
//! Core protocol implementation for Validity VFS300/VFS301 swipe
//! fingerprint sensors.
//!
//! This crate provides the I/O-free protocol primitives:
//! - Command definitions and the command encoder
//! - Fixed bring-up and post-capture sequences
//! - Scan line decoding and frame synchronization
//! - Scan line accumulation and image reconstruction
//! - Protocol session state

pub mod capture;
pub mod command;
pub mod constants;
pub mod encoder;
pub mod endpoint;
pub mod error;
pub mod fragments;
pub mod reconstruct;
pub mod scanline;
pub mod sequence;
pub mod session;
pub mod sync;

pub use capture::{Capture, LineWidth};
pub use command::{Command, CommandType, RawBlob};
pub use encoder::Encoder;
pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use reconstruct::reconstruct;
pub use scanline::ScanLine;
pub use sequence::ProtocolGeneration;
pub use session::{Session, SessionState};
