//! Manifest parsing.
//!
//! The Manifest lists, one per line, the files of a release relative to the
//! release directory, in the order they must be run. Lines whose first
//! non-blank character is `#` and blank lines are ignored; every other line is
//! taken verbatim as a filename.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::Release;
use crate::consts::{MANIFEST_COMMENT_INTRO, RELEASE_MANIFEST_FILE_NAME};
use crate::probe::{Probe, probe};

/// Where a Manifest entry came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
  pub file: PathBuf,
  /// 1-based
  pub line: usize,
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.file.display(), self.line)
  }
}

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error(
    "The release directory ({}) does not contain a file called {:?}. This lists the release files to apply and the order in which they should be applied",
    dir.display(),
    RELEASE_MANIFEST_FILE_NAME
  )]
  ManifestMissing { dir: PathBuf },

  #[error(
    "The release directory ({}) contains {:?} but it is not a regular file",
    dir.display(),
    RELEASE_MANIFEST_FILE_NAME
  )]
  ManifestNotRegular { dir: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  ManifestRead { path: PathBuf, source: io::Error },

  #[error("the manifest is empty - all the lines are empty or comments")]
  Empty,

  #[error("{location}: The release directory ({}) does not contain {entry:?}", dir.display())]
  FileMissing {
    location: Location,
    dir: PathBuf,
    entry: String,
  },

  #[error(
    "{location}: The release directory ({}) contains {entry:?} but it is not a regular file",
    dir.display()
  )]
  FileNotRegular {
    location: Location,
    dir: PathBuf,
    entry: String,
  },

  #[error("{location}: {entry:?} is not a path inside the release directory")]
  OutsideRelease { location: Location, entry: String },

  #[error("{location}: {source}")]
  FileStat { location: Location, source: io::Error },

  #[error("{location}: The file is already in the manifest at: {first}")]
  Duplicate { location: Location, first: Location },

  #[error(
    "the release directory ({}) contains {name:?} which is not in the Manifest file",
    dir.display()
  )]
  Unused { dir: PathBuf, name: String },

  #[error("failed to list the release directory {}: {source}", dir.display())]
  ListDir { dir: PathBuf, source: io::Error },
}

impl ManifestError {
  /// The Manifest could not be read at all (as opposed to a bad entry).
  pub fn is_unreadable_manifest(&self) -> bool {
    matches!(
      self,
      ManifestError::ManifestMissing { .. } | ManifestError::ManifestNotRegular { .. } | ManifestError::ManifestRead { .. }
    )
  }
}

/// The result of parsing a Manifest.
///
/// `files` is the execution order. `index` is for membership tests only.
#[derive(Debug, Default)]
pub struct Manifest {
  pub index: HashMap<String, Location>,
  pub files: Vec<PathBuf>,
  pub errors: Vec<ManifestError>,
}

/// Whether `entry` stays under the release directory: no root, prefix or `..`.
fn stays_inside(entry: &str) -> bool {
  Path::new(entry)
    .components()
    .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl Manifest {
  fn add_entry(&mut self, release: &Release, entry: &str, location: Location) {
    if !stays_inside(entry) {
      self.errors.push(ManifestError::OutsideRelease {
        location,
        entry: entry.to_string(),
      });
      return;
    }
    let file = release.dir.join(entry);

    match probe(&file) {
      Ok(Probe::Regular) => {}
      Ok(Probe::Missing) => {
        self.errors.push(ManifestError::FileMissing {
          location,
          dir: release.dir.clone(),
          entry: entry.to_string(),
        });
        return;
      }
      Ok(_) => {
        self.errors.push(ManifestError::FileNotRegular {
          location,
          dir: release.dir.clone(),
          entry: entry.to_string(),
        });
        return;
      }
      Err(source) => {
        self.errors.push(ManifestError::FileStat { location, source });
        return;
      }
    }

    if let Some(first) = self.index.get(entry) {
      self.errors.push(ManifestError::Duplicate {
        location,
        first: first.clone(),
      });
      return;
    }

    debug!(entry, line = location.line, "manifest entry");
    self.index.insert(entry.to_string(), location);
    self.files.push(file);
  }
}

fn is_ignored(line: &str) -> bool {
  let trimmed = line.trim_start();
  trimmed.is_empty() || trimmed.starts_with(MANIFEST_COMMENT_INTRO)
}

/// Parse the release's Manifest.
///
/// Never stops at the first problem: every error found is collected in
/// [`Manifest::errors`] and entries with errors are left out of `files`.
pub fn parse_manifest(release: &Release) -> Manifest {
  let mut manifest = Manifest::default();
  let path = &release.manifest;

  match probe(path) {
    Ok(Probe::Regular) => {}
    Ok(Probe::Missing) => {
      manifest.errors.push(ManifestError::ManifestMissing {
        dir: release.dir.clone(),
      });
      return manifest;
    }
    Ok(_) => {
      manifest.errors.push(ManifestError::ManifestNotRegular {
        dir: release.dir.clone(),
      });
      return manifest;
    }
    Err(source) => {
      manifest.errors.push(ManifestError::ManifestRead {
        path: path.clone(),
        source,
      });
      return manifest;
    }
  }

  let reader = match File::open(path) {
    Ok(f) => BufReader::new(f),
    Err(source) => {
      manifest.errors.push(ManifestError::ManifestRead {
        path: path.clone(),
        source,
      });
      return manifest;
    }
  };

  for (idx, line) in reader.lines().enumerate() {
    let line = match line {
      Ok(line) => line,
      Err(source) => {
        manifest.errors.push(ManifestError::ManifestRead {
          path: path.clone(),
          source,
        });
        return manifest;
      }
    };
    if is_ignored(&line) {
      continue;
    }

    let location = Location {
      file: path.clone(),
      line: idx + 1,
    };
    manifest.add_entry(release, &line, location);
  }

  if manifest.files.is_empty() {
    manifest.errors.push(ManifestError::Empty);
  }

  manifest
}
