//! The optional ReadMe and Warning files of a release.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::probe::{Probe, probe};

#[derive(Debug, Error)]
pub enum NotesError {
  #[error("{path:?} exists but it is not a regular file")]
  NotRegular { path: PathBuf },

  #[error("Couldn't open the {} file: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },
}

/// Read a notes file, giving `None` when it is absent or empty.
pub fn read_notes(path: &Path) -> Result<Option<String>, NotesError> {
  let read_err = |source| NotesError::Read {
    path: path.to_path_buf(),
    source,
  };

  match probe(path).map_err(read_err)? {
    Probe::Missing => return Ok(None),
    Probe::Regular => {}
    _ => return Err(NotesError::NotRegular { path: path.to_path_buf() }),
  }

  let content = fs::read_to_string(path).map_err(read_err)?;
  Ok(if content.is_empty() { None } else { Some(content) })
}
