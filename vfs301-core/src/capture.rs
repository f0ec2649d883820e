//! Scan line accumulation for one swipe

use tracing::debug;

use crate::{
    constants::{finish, line},
    error::Result,
    scanline::{self, ScanLine},
    sync::{synchronize, Frame},
};

/// Bytes kept per accumulated line
///
/// Chosen once when the capture buffer is created and used for the whole
/// pipeline, the reconstructed image included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineWidth {
    /// Only the 200 grayscale samples
    #[default]
    Samples,
    /// The complete 288 byte record
    Raw,
}

impl LineWidth {
    /// Row width in bytes
    pub fn bytes(self) -> usize {
        match self {
            Self::Samples => line::SAMPLES,
            Self::Raw => line::RECORD_SIZE,
        }
    }
}

/// Result of appending one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSummary {
    pub frame: Frame,
    /// The trailing lines of the block show no finger
    pub finished: bool,
}

/// Raw capture buffer
///
/// Append-only store of the lines of one swipe, laid out as fixed-width
/// rows in a single allocation.
#[derive(Debug, Clone)]
pub struct Capture {
    width: LineWidth,
    rows: Vec<u8>,
    lines: usize,
    blocks: usize,
}

impl Capture {
    /// Create an empty capture buffer
    pub fn new(width: LineWidth) -> Self {
        Self {
            width,
            rows: Vec::new(),
            lines: 0,
            blocks: 0,
        }
    }

    /// Append the lines of one transfer
    ///
    /// A first block resets the buffer and is synchronized to the first
    /// start marker; other blocks are appended as they are.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoStartMarker`](crate::Error::NoStartMarker) if a
    /// first block cannot be synchronized.
    pub fn append(&mut self, first_block: bool, raw: &[u8]) -> Result<BlockSummary> {
        if first_block {
            self.reset();
        }

        let frame = synchronize(raw, first_block)?;
        self.rows.reserve(frame.lines * self.width.bytes());

        let mut trailing_blank = 0;
        for record in frame.records(raw) {
            let parsed = ScanLine::parse(record)?;

            match self.width {
                LineWidth::Samples => self.rows.extend_from_slice(&parsed.scan),
                LineWidth::Raw => self.rows.extend_from_slice(record),
            }

            trailing_blank = if parsed.is_blank() { trailing_blank + 1 } else { 0 };
        }

        self.lines += frame.lines;
        self.blocks += 1;

        let finished = frame.lines >= finish::SUM_LINES && trailing_blank >= finish::SUM_LINES;

        debug!(
            first_block,
            block = self.blocks,
            added = frame.lines,
            total = self.lines,
            finished,
            "Accumulated block"
        );

        Ok(BlockSummary { frame, finished })
    }

    /// Drop all lines
    pub fn reset(&mut self) {
        self.rows.clear();
        self.lines = 0;
        self.blocks = 0;
    }

    pub fn width(&self) -> LineWidth {
        self.width
    }

    /// Number of accumulated lines
    pub fn len(&self) -> usize {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    /// Number of appended blocks
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Stored row of line `index`
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        let width = self.width.bytes();
        self.rows.get(index * width..(index + 1) * width)
    }

    /// Grayscale samples of line `index`
    pub fn samples(&self, index: usize) -> Option<&[u8]> {
        let row = self.row(index)?;
        Some(match self.width {
            LineWidth::Samples => row,
            LineWidth::Raw => scanline::samples(row),
        })
    }

    /// All stored rows in order
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.chunks_exact(self.width.bytes())
    }
}

impl Default for Capture {
    fn default() -> Self {
        Self::new(LineWidth::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(values: &[u8]) -> Vec<u8> {
        values
            .iter()
            .enumerate()
            .flat_map(|(i, &v)| ScanLine::new(i as u16, [v; line::SAMPLES]).encode())
            .collect()
    }

    #[test]
    fn test_append_samples() {
        let mut capture = Capture::new(LineWidth::Samples);
        let summary = capture.append(true, &block(&[10, 20, 30])).unwrap();

        assert_eq!(summary.frame.lines, 3);
        assert_eq!(capture.len(), 3);
        assert_eq!(capture.row(1).unwrap(), &[20u8; line::SAMPLES][..]);
        assert_eq!(capture.row(3), None);
    }

    #[test]
    fn test_append_raw_keeps_full_records() {
        let raw = block(&[10, 20]);
        let mut capture = Capture::new(LineWidth::Raw);
        capture.append(true, &raw).unwrap();

        assert_eq!(capture.row(0).unwrap(), &raw[..line::RECORD_SIZE]);
        assert_eq!(capture.samples(1).unwrap(), &[20u8; line::SAMPLES][..]);
    }

    #[test]
    fn test_append_grows_across_blocks() {
        let mut capture = Capture::default();
        capture.append(true, &block(&[1, 2])).unwrap();
        capture.append(false, &block(&[3, 4, 5])).unwrap();

        assert_eq!(capture.len(), 5);
        assert_eq!(capture.blocks(), 2);
        let firsts: Vec<u8> = capture.rows().map(|r| r[0]).collect();
        assert_eq!(firsts, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_first_block_resets() {
        let second = block(&[7, 8]);

        let mut twice = Capture::default();
        twice.append(true, &block(&[1, 2, 3])).unwrap();
        twice.append(true, &second).unwrap();

        let mut once = Capture::default();
        once.append(true, &second).unwrap();

        assert_eq!(twice.len(), once.len());
        assert_eq!(twice.rows().collect::<Vec<_>>(), once.rows().collect::<Vec<_>>());
    }

    #[test]
    fn test_first_block_with_header() {
        let mut raw = vec![0x55u8; 64];
        raw.extend_from_slice(&block(&[9, 9]));

        let mut capture = Capture::default();
        let summary = capture.append(true, &raw).unwrap();

        assert_eq!(summary.frame.start, 64);
        assert_eq!(capture.len(), 2);
    }

    #[test]
    fn test_unsynchronized_first_block_fails() {
        let mut capture = Capture::default();
        let result = capture.append(true, &[0u8; 600]);

        assert!(result.is_err());
        assert!(capture.is_empty());
    }

    #[test]
    fn test_finished_detection() {
        let mut capture = Capture::default();

        // ScanLine::new leaves sum2 zeroed, which reads as no finger
        let summary = capture.append(true, &block(&[1, 2, 3, 4])).unwrap();
        assert!(summary.finished);

        let mut busy = ScanLine::new(0, [0; line::SAMPLES]);
        busy.sum2 = [200; line::SUM2_LEN];
        let mut raw = block(&[1, 2]);
        raw.extend_from_slice(&busy.encode());
        let summary = capture.append(false, &raw).unwrap();
        assert!(!summary.finished);
    }
}
