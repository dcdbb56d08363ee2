//! Filesystem probing.
//!
//! A single `stat` (following symlinks) classifying what lives at a path.

use std::fs;
use std::io;
use std::path::Path;

/// What was found at a probed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
  Missing,
  Directory,
  Regular,
  /// Exists but is neither a directory nor a regular file (fifo, socket, device...).
  Other,
}

impl Probe {
  pub fn is_dir(self) -> bool {
    matches!(self, Probe::Directory)
  }

  pub fn is_regular(self) -> bool {
    matches!(self, Probe::Regular)
  }
}

/// Probe `path`.
///
/// `NotFound` is reported as [`Probe::Missing`]; every other I/O error is
/// returned unchanged.
pub fn probe(path: &Path) -> io::Result<Probe> {
  match fs::metadata(path) {
    Ok(meta) => {
      let ft = meta.file_type();
      if ft.is_dir() {
        Ok(Probe::Directory)
      } else if ft.is_file() {
        Ok(Probe::Regular)
      } else {
        Ok(Probe::Other)
      }
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Probe::Missing),
    Err(e) => Err(e),
  }
}
