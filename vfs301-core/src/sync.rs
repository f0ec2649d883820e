//! Frame synchronization
//!
//! The first transfer of a capture starts with a header of unknown length
//! in front of line 0. The synchronizer finds the first start marker and
//! reports how many complete records follow it. Later transfers of the same
//! capture are already aligned.

use tracing::trace;

use crate::{
    constants::line,
    error::{Error, Result},
};

/// Location of the complete records inside a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Offset of line 0
    pub start: usize,
    /// Number of complete records from `start` on
    pub lines: usize,
}

impl Frame {
    /// Iterate over the complete records of `buf`
    ///
    /// Trailing bytes that do not form a complete record are skipped.
    pub fn records(self, buf: &[u8]) -> impl Iterator<Item = &[u8]> {
        buf[self.start..]
            .chunks_exact(line::RECORD_SIZE)
            .take(self.lines)
    }
}

/// Locate the scan lines inside one transfer
///
/// On the first block of a capture, the first `01 FE` marker within one
/// record length becomes line 0. Other blocks start at offset 0.
///
/// # Errors
///
/// Returns [`Error::NoStartMarker`] if a first block carries no marker
/// within one record length.
///
/// # Examples
///
/// ```
/// use vfs301_core::sync::synchronize;
///
/// let mut buf = vec![0u8; 3];
/// buf.extend_from_slice(&[0x01, 0xFE]);
/// buf.resize(3 + 2 * 288, 0);
///
/// let frame = synchronize(&buf, true).unwrap();
/// assert_eq!(frame.start, 3);
/// assert_eq!(frame.lines, 2);
/// ```
pub fn synchronize(buf: &[u8], first_block: bool) -> Result<Frame> {
    let start = if first_block {
        buf.windows(line::START_MARKER.len())
            .take(line::RECORD_SIZE)
            .position(|w| w == line::START_MARKER)
            .ok_or(Error::NoStartMarker {
                searched: buf.len().min(line::RECORD_SIZE),
            })?
    } else {
        0
    };

    let frame = Frame {
        start,
        lines: (buf.len() - start) / line::RECORD_SIZE,
    };

    trace!(
        first_block,
        len = buf.len(),
        start = frame.start,
        lines = frame.lines,
        "Synchronized block"
    );

    Ok(frame)
}
