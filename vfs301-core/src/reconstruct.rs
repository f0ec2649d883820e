//! Image reconstruction
//!
//! The sensor has no notion of a frame: it streams lines for as long as
//! the finger moves, many more than are visually distinct because swipe
//! speed varies. Reconstruction keeps line 0 and then every line whose
//! samples differ enough from the last kept line.

use tracing::debug;
use vfs301_types::Image;

use crate::{
    capture::{Capture, LineWidth},
    constants::{image, line},
    error::{Error, Result},
    scanline,
};

/// Mean absolute difference between two sample windows
///
/// Integer mean, as the threshold comparison is done on whole units.
pub fn line_difference(a: &[u8], b: &[u8]) -> u32 {
    let total: u32 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| u32::from(x.abs_diff(y)))
        .sum();
    total / line::SAMPLES as u32
}

/// Build the final image from an accumulated capture
///
/// Rows have the width the capture was accumulated with.
///
/// # Errors
///
/// Returns [`Error::EmptyCapture`] if the capture holds no lines.
pub fn reconstruct(capture: &Capture) -> Result<Image> {
    let width = capture.width();
    let mut rows = capture.rows();

    let first = rows.next().ok_or(Error::EmptyCapture)?;

    let mut data = Vec::with_capacity(capture.len() * width.bytes());
    data.extend_from_slice(first);
    let mut reference = samples(width, first);

    for row in rows {
        let current = samples(width, row);
        if line_difference(reference, current) > image::LINE_DIFF_THRESHOLD {
            data.extend_from_slice(row);
            reference = current;
        }
    }

    let image = Image::new(width.bytes(), data)?;

    debug!(
        lines = capture.len(),
        rows = image.height(),
        width = image.width(),
        "Reconstructed image"
    );

    Ok(image)
}

fn samples(width: LineWidth, row: &[u8]) -> &[u8] {
    match width {
        LineWidth::Samples => row,
        LineWidth::Raw => scanline::samples(row),
    }
}
