//! Release name and directory checks.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use super::Release;
use crate::consts::RELEASE_ARCHIVE_DIR_NAME;
use crate::layout::Layout;
use crate::probe::{Probe, probe};

#[derive(Debug, Error)]
pub enum ReleaseError {
  #[error("the {name} directory cannot be used as a release directory")]
  Reserved { name: String },

  #[error("{name:?} is not a release name: it must be a single directory name")]
  InvalidName { name: String },

  #[error("The release directory ({}) does not exist", dir.display())]
  NotFound { dir: PathBuf },

  #[error("{} is not a directory", dir.display())]
  NotDirectory { dir: PathBuf },

  #[error("failed to examine {}: {source}", dir.display())]
  Stat { dir: PathBuf, source: io::Error },
}

fn is_single_component(name: &str) -> bool {
  let mut components = Path::new(name).components();
  matches!(
    (components.next(), components.next()),
    (Some(Component::Normal(c)), None) if c == name
  )
}

/// Check that `name` refers to an applicable release.
///
/// The reserved archive name is rejected before the filesystem is touched.
pub fn validate_release(layout: &Layout, name: &str) -> Result<Release, ReleaseError> {
  if name == RELEASE_ARCHIVE_DIR_NAME {
    return Err(ReleaseError::Reserved { name: name.to_string() });
  }
  if !is_single_component(name) {
    return Err(ReleaseError::InvalidName { name: name.to_string() });
  }

  let release = Release::new(layout, name);
  match probe(&release.dir) {
    Ok(Probe::Directory) => Ok(release),
    Ok(Probe::Missing) => Err(ReleaseError::NotFound { dir: release.dir }),
    Ok(_) => Err(ReleaseError::NotDirectory { dir: release.dir }),
    Err(source) => Err(ReleaseError::Stat {
      dir: release.dir,
      source,
    }),
  }
}

/// All releases that could be applied, sorted by name.
pub fn find_releases(layout: &Layout) -> io::Result<Vec<String>> {
  let mut releases = Vec::new();
  for entry in fs::read_dir(layout.release_base_dir())? {
    let entry = entry?;
    let name = entry.file_name().to_string_lossy().into_owned();
    if name == RELEASE_ARCHIVE_DIR_NAME || !probe(&entry.path())?.is_dir() {
      continue;
    }
    releases.push(name);
  }
  releases.sort();
  Ok(releases)
}
