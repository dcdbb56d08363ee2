//! Releases: ordered packages of scripts and SQL files.
//!
//! A release is a directory under `releaseScripts/` holding a `Manifest`, the
//! files it names, an optional `SQL.files/` subdirectory and optional `ReadMe`
//! and `Warning` notes. Applying a release goes through:
//! 1. [`validate_release`]: the name is usable and the directory exists
//! 2. [`parse_manifest`]: the ordered file list, with every problem collected
//! 3. [`check_unused_files`]: nothing in the directory is left out of the Manifest
//! 4. [`ReleaseApplier::apply`]: each file is run in Manifest order, stopping at the first failure

mod apply;
mod manifest;
mod notes;
mod unused;
mod validate;

use std::path::PathBuf;

use tracing::info;

use crate::layout::Layout;

pub use apply::{ApplyError, ApplyReport, ReleaseApplier, StepError, StepKind};
pub use manifest::{Location, Manifest, ManifestError, parse_manifest};
pub use notes::{NotesError, read_notes};
pub use unused::check_unused_files;
pub use validate::{ReleaseError, find_releases, validate_release};

/// The paths making up one named release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
  pub name: String,
  pub dir: PathBuf,
  pub sql_dir: PathBuf,
  pub manifest: PathBuf,
  pub readme: PathBuf,
  pub warning: PathBuf,
}

impl Release {
  pub fn new(layout: &Layout, name: &str) -> Self {
    Self {
      name: name.to_string(),
      dir: layout.release_dir(name),
      sql_dir: layout.release_sql_dir(name),
      manifest: layout.release_manifest(name),
      readme: layout.release_readme(name),
      warning: layout.release_warning(name),
    }
  }
}

/// Parse the Manifest and cross-check it against the release directory.
///
/// Returns the files to run in order, or every problem found. The unused-file
/// check is skipped when the Manifest itself could not be read, since every
/// file would then be reported.
pub fn check_release(release: &Release) -> Result<Vec<PathBuf>, Vec<ManifestError>> {
  let Manifest { index, files, mut errors } = parse_manifest(release);

  if !errors.iter().any(ManifestError::is_unreadable_manifest) {
    errors.extend(check_unused_files(release, &index));
  }

  if errors.is_empty() {
    info!(release = %release.name, files = files.len(), "release is valid");
    Ok(files)
  } else {
    info!(release = %release.name, errors = errors.len(), "release is invalid");
    Err(errors)
  }
}
