//! Checking for and creating the standard directory tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::Layout;
use crate::consts::{
  DB_SCHEMA_DIR_NAME, DBT_DIR_NAME, MACROS_DIR_NAME, RELEASE_ARCHIVE_DIR_NAME, RELEASE_SCRIPTS_BASE_NAME,
  SCHEMA_SUBDIR_FUNCS, SCHEMA_SUBDIR_TABLES, SCHEMA_SUBDIR_TRIGGERS, SCHEMA_SUBDIR_TYPES,
};
use crate::probe::{Probe, probe};

/// A directory and the subdirectories expected beneath it.
#[derive(Debug)]
pub struct DirSpec {
  pub name: &'static str,
  /// Don't descend into this directory when checking or creating.
  pub ignore_content: bool,
  pub sub_dirs: &'static [DirSpec],
}

impl DirSpec {
  const fn leaf(name: &'static str) -> Self {
    Self {
      name,
      ignore_content: true,
      sub_dirs: &[],
    }
  }
}

static DIR_HIERARCHY: &[DirSpec] = &[DirSpec {
  name: DBT_DIR_NAME,
  ignore_content: false,
  sub_dirs: &[
    DirSpec {
      name: RELEASE_SCRIPTS_BASE_NAME,
      ignore_content: false,
      sub_dirs: &[DirSpec::leaf(RELEASE_ARCHIVE_DIR_NAME)],
    },
    DirSpec::leaf(MACROS_DIR_NAME),
    DirSpec::leaf(DB_SCHEMA_DIR_NAME),
  ],
}];

static SCHEMA_DIRS: &[DirSpec] = &[
  DirSpec::leaf(SCHEMA_SUBDIR_TYPES),
  DirSpec::leaf(SCHEMA_SUBDIR_TABLES),
  DirSpec::leaf(SCHEMA_SUBDIR_FUNCS),
  DirSpec::leaf(SCHEMA_SUBDIR_TRIGGERS),
];

#[derive(Debug, Error)]
pub enum LayoutError {
  #[error("Couldn't create the directory {path:?} - it already exists and is not a directory")]
  NotADirectory { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to examine {}: {source}", path.display())]
  Stat { path: PathBuf, source: io::Error },
}

fn check_sub_dirs(base: &Path, dirs: &[DirSpec]) -> bool {
  dirs.iter().all(|d| {
    let dir = base.join(d.name);
    match probe(&dir) {
      Ok(Probe::Directory) => d.ignore_content || check_sub_dirs(&dir, d.sub_dirs),
      _ => {
        debug!(path = %dir.display(), "expected directory is missing");
        false
      }
    }
  })
}

/// Report whether the whole tree for `db_name`/`schema_name` is present.
pub fn check_dirs(layout: &Layout, db_name: &str, schema_name: &str) -> bool {
  check_sub_dirs(layout.base_dir(), DIR_HIERARCHY)
    && check_sub_dirs(&layout.schema_dir(db_name, schema_name), SCHEMA_DIRS)
}

fn make_dir_if_missing(dir: &Path) -> Result<(), LayoutError> {
  match probe(dir) {
    Ok(Probe::Directory) => Ok(()),
    Ok(Probe::Missing) => {
      create_dir(dir).map_err(|source| LayoutError::CreateDir {
        path: dir.to_path_buf(),
        source,
      })?;
      info!(path = %dir.display(), "created directory");
      Ok(())
    }
    Ok(_) => Err(LayoutError::NotADirectory { path: dir.to_path_buf() }),
    Err(source) => Err(LayoutError::Stat {
      path: dir.to_path_buf(),
      source,
    }),
  }
}

#[cfg(unix)]
fn create_dir(dir: &Path) -> io::Result<()> {
  use std::os::unix::fs::DirBuilderExt;
  fs::DirBuilder::new().mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn create_dir(dir: &Path) -> io::Result<()> {
  fs::create_dir(dir)
}

fn make_missing_sub_dirs(base: &Path, dirs: &[DirSpec]) -> Result<(), LayoutError> {
  for d in dirs {
    let dir = base.join(d.name);
    make_dir_if_missing(&dir)?;
    if !d.ignore_content {
      make_missing_sub_dirs(&dir, d.sub_dirs)?;
    }
  }
  Ok(())
}

/// Create whatever part of the tree for `db_name`/`schema_name` is missing.
///
/// Stops at the first failure, which may leave the tree partially created.
pub fn make_missing_dirs(layout: &Layout, db_name: &str, schema_name: &str) -> Result<(), LayoutError> {
  make_missing_sub_dirs(layout.base_dir(), DIR_HIERARCHY)?;
  make_dir_if_missing(&layout.schema_base_dir())?;

  let schema_dir = layout.schema_dir(db_name, schema_name);
  make_dir_if_missing(&schema_dir)?;
  make_missing_sub_dirs(&schema_dir, SCHEMA_DIRS)
}
