//! The dbtools directory tree.
//!
//! Every path the tools use is derived from a single base directory:
//!
//! ```text
//! <base>/db.postgres/
//!   releaseScripts/
//!     Archive/
//!     <release>/{SQL.files/, Manifest, ReadMe, Warning}
//!   macros/
//!   db.schema/<db>.<schema>/{types,tables,funcs,triggers}/
//! ```

mod dirs;

use std::path::{Path, PathBuf};

use crate::consts::{
  DB_SCHEMA_DIR_NAME, DBT_DIR_NAME, MACROS_DIR_NAME, RELEASE_MANIFEST_FILE_NAME, RELEASE_README_FILE_NAME,
  RELEASE_SCRIPTS_BASE_NAME, RELEASE_SQL_DIR_NAME, RELEASE_WARNING_FILE_NAME,
};

pub use dirs::{DirSpec, LayoutError, check_dirs, make_missing_dirs};

/// Path derivation rooted at the project base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  base_dir: PathBuf,
}

impl Layout {
  pub fn new(base_dir: impl Into<PathBuf>) -> Self {
    Self {
      base_dir: base_dir.into(),
    }
  }

  pub fn base_dir(&self) -> &Path {
    &self.base_dir
  }

  /// `<base>/db.postgres`
  pub fn start_dir(&self) -> PathBuf {
    self.base_dir.join(DBT_DIR_NAME)
  }

  pub fn macros_dir(&self) -> PathBuf {
    self.start_dir().join(MACROS_DIR_NAME)
  }

  pub fn schema_base_dir(&self) -> PathBuf {
    self.start_dir().join(DB_SCHEMA_DIR_NAME)
  }

  /// `<base>/db.postgres/db.schema/<db>.<schema>`
  pub fn schema_dir(&self, db_name: &str, schema_name: &str) -> PathBuf {
    self.schema_base_dir().join(format!("{}.{}", db_name, schema_name))
  }

  pub fn release_base_dir(&self) -> PathBuf {
    self.start_dir().join(RELEASE_SCRIPTS_BASE_NAME)
  }

  pub fn release_dir(&self, release: &str) -> PathBuf {
    self.release_base_dir().join(release)
  }

  pub fn release_sql_dir(&self, release: &str) -> PathBuf {
    self.release_dir(release).join(RELEASE_SQL_DIR_NAME)
  }

  pub fn release_manifest(&self, release: &str) -> PathBuf {
    self.release_dir(release).join(RELEASE_MANIFEST_FILE_NAME)
  }

  pub fn release_readme(&self, release: &str) -> PathBuf {
    self.release_dir(release).join(RELEASE_README_FILE_NAME)
  }

  pub fn release_warning(&self, release: &str) -> PathBuf {
    self.release_dir(release).join(RELEASE_WARNING_FILE_NAME)
  }
}
