//! Detecting release files that the Manifest leaves out.

use std::collections::HashMap;
use std::fs;

use super::{Location, ManifestError, Release};
use crate::consts::{
  RELEASE_MANIFEST_FILE_NAME, RELEASE_README_FILE_NAME, RELEASE_SQL_DIR_NAME, RELEASE_WARNING_FILE_NAME,
};

const IGNORED_ENTRIES: &[&str] = &[
  ".",
  "..",
  RELEASE_SQL_DIR_NAME,
  RELEASE_MANIFEST_FILE_NAME,
  RELEASE_README_FILE_NAME,
  RELEASE_WARNING_FILE_NAME,
];

/// Report every top-level entry of the release directory missing from `index`.
///
/// Not recursive: the contents of `SQL.files/` are never inspected. Errors are
/// sorted by entry name.
pub fn check_unused_files(release: &Release, index: &HashMap<String, Location>) -> Vec<ManifestError> {
  let entries = match fs::read_dir(&release.dir) {
    Ok(entries) => entries,
    Err(source) => {
      return vec![ManifestError::ListDir {
        dir: release.dir.clone(),
        source,
      }];
    }
  };

  let mut unused = Vec::new();
  for entry in entries {
    let entry = match entry {
      Ok(entry) => entry,
      Err(source) => {
        return vec![ManifestError::ListDir {
          dir: release.dir.clone(),
          source,
        }];
      }
    };
    let name = entry.file_name().to_string_lossy().into_owned();
    if IGNORED_ENTRIES.contains(&name.as_str()) || index.contains_key(&name) {
      continue;
    }
    unused.push(name);
  }
  unused.sort();

  unused
    .into_iter()
    .map(|name| ManifestError::Unused {
      dir: release.dir.clone(),
      name,
    })
    .collect()
}
