//! Output of reconstructed images

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use vfs301_types::Image;

/// Receives every image a session produces
#[cfg_attr(test, mockall::automock)]
pub trait ImageSink {
    fn accept(&mut self, image: &Image) -> io::Result<()>;
}

/// Collects images in memory
impl ImageSink for Vec<Image> {
    fn accept(&mut self, image: &Image) -> io::Result<()> {
        self.push(image.clone());
        Ok(())
    }
}

/// Writes each image as a binary PGM file
///
/// Files are named `scan_00.pgm`, `scan_01.pgm`, ... in the target
/// directory.
#[derive(Debug, Clone)]
pub struct PgmWriter {
    dir: PathBuf,
    next_index: usize,
}

impl PgmWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_index: 0,
        }
    }

    /// Continue numbering at `index`
    pub fn with_start_index(mut self, index: usize) -> Self {
        self.next_index = index;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the next image will be written to
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(format!("scan_{:02}.pgm", self.next_index))
    }
}

impl ImageSink for PgmWriter {
    fn accept(&mut self, image: &Image) -> io::Result<()> {
        let path = self.next_path();
        fs::write(&path, image.to_pgm())?;
        self.next_index += 1;

        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Wrote image"
        );
        Ok(())
    }
}
