//! Reconstructed fingerprint image

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Grayscale fingerprint image
///
/// Rows are stored top to bottom, one byte per pixel. The width is fixed
/// by the line width the capture was accumulated with; the height is only
/// known once the capture has been reconstructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    data: Vec<u8>,
    captured_at: DateTime<Utc>,
}

impl Image {
    /// Create an image from row-major pixel data
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `width` is zero, `data` is empty or
    /// `data` is not a whole number of rows.
    pub fn new(width: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 {
            return Err(Error::Validation("image width must not be zero".into()));
        }
        if data.is_empty() {
            return Err(Error::Validation("image has no rows".into()));
        }
        if data.len() % width != 0 {
            return Err(Error::Validation(format!(
                "{} bytes is not a whole number of {} byte rows",
                data.len(),
                width
            )));
        }

        Ok(Self {
            width,
            height: data.len() / width,
            data,
            captured_at: Utc::now(),
        })
    }

    /// Set the capture timestamp
    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixel data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Get row `index`
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        self.data.get(index * self.width..(index + 1) * self.width)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.width)
    }

    /// Render as binary PGM (`P5`)
    ///
    /// # Examples
    ///
    /// ```
    /// use vfs301_types::Image;
    ///
    /// let image = Image::new(2, vec![0, 255, 128, 64]).unwrap();
    /// let pgm = image.to_pgm();
    /// assert!(pgm.starts_with(b"P5\n2 2\n255\n"));
    /// assert_eq!(pgm.len(), 11 + 4);
    /// ```
    pub fn to_pgm(&self) -> Bytes {
        let header = format!("P5\n{} {}\n255\n", self.width, self.height);

        let mut buf = BytesMut::with_capacity(header.len() + self.data.len());
        buf.put_slice(header.as_bytes());
        buf.put_slice(&self.data);
        buf.freeze()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image[{}x{}, captured {}]",
            self.width,
            self.height,
            self.captured_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_dimensions() {
        let image = Image::new(3, vec![1, 2, 3, 4, 5, 6]).unwrap();

        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.row(1).unwrap(), &[4, 5, 6]);
        assert_eq!(image.row(2), None);
        assert_eq!(image.rows().count(), 2);
    }

    #[test]
    fn test_image_validation() {
        assert!(Image::new(0, vec![1]).is_err());
        assert!(Image::new(3, vec![]).is_err());
        assert!(Image::new(3, vec![1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_pgm_rendering() {
        let image = Image::new(200, vec![7; 200 * 5]).unwrap();
        let pgm = image.to_pgm();

        let header = b"P5\n200 5\n255\n";
        assert_eq!(&pgm[..header.len()], header);
        assert_eq!(pgm.len(), header.len() + 1000);
        assert!(pgm[header.len()..].iter().all(|&b| b == 7));
    }

    #[test]
    fn test_captured_at_override() {
        let when = DateTime::<Utc>::from_timestamp(1_300_000_000, 0).unwrap();
        let image = Image::new(1, vec![0]).unwrap().with_captured_at(when);

        assert_eq!(image.captured_at(), when);
        assert!(image.to_string().starts_with("Image[1x1, captured 2011-03-13"));
    }
}
