//! Configuration shared by every command.
//!
//! Values come from (highest precedence first) command-line flags, `DBTOOLS_*`
//! environment variables, the JSON config file and finally built-in defaults.
//! The resolved [`DbtConfig`] is built once and passed by reference.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_PSQL_PATH, ENV_PREFIX};
use crate::layout::Layout;
use crate::platform::paths;
use crate::probe::{Probe, probe};

pub const BASE_DIR_PARAM: &str = "base-dir";
pub const PSQL_PATH_PARAM: &str = "psql-path";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse config file {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("the {} parameter must be set", BASE_DIR_PARAM)]
  MissingBaseDir,

  #[error("the {} directory ({}) does not exist", BASE_DIR_PARAM, path.display())]
  BaseDirMissing { path: PathBuf },

  #[error("the {} ({}) is not a directory", BASE_DIR_PARAM, path.display())]
  BaseDirNotDir { path: PathBuf },

  #[error("the {} ({}) does not exist or is not a regular file", PSQL_PATH_PARAM, path.display())]
  PsqlNotFound { path: PathBuf },

  #[error("failed to examine {}: {source}", path.display())]
  Stat { path: PathBuf, source: io::Error },

  #[error("{value:?} is not valid as {}", kind.description())]
  InvalidName { value: String, kind: NameKind },
}

/// Contents of the optional JSON config file.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
  pub base_dir: Option<PathBuf>,
  pub psql_path: Option<PathBuf>,
  pub db_name: Option<String>,
}

impl ConfigFile {
  /// Load the config file at `path`, which must exist.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load the config file from the platform config directory, if there is one.
  pub fn load_default() -> Result<Self, ConfigError> {
    match paths::config_file() {
      Some(path) if path.is_file() => {
        debug!(path = %path.display(), "loading config file");
        Self::load(&path)
      }
      _ => Ok(Self::default()),
    }
  }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
  pub base_dir: Option<PathBuf>,
  pub psql_path: Option<PathBuf>,
  pub db_name: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbtConfig {
  pub base_dir: PathBuf,
  pub psql_path: PathBuf,
  pub db_name: Option<String>,
}

impl DbtConfig {
  /// Merge overrides on top of the file values and check the result.
  pub fn resolve(overrides: ConfigOverrides, file: ConfigFile) -> Result<Self, ConfigError> {
    let base_dir = overrides
      .base_dir
      .or(file.base_dir)
      .ok_or(ConfigError::MissingBaseDir)?;

    match probe(&base_dir).map_err(|source| ConfigError::Stat {
      path: base_dir.clone(),
      source,
    })? {
      Probe::Directory => {}
      Probe::Missing => return Err(ConfigError::BaseDirMissing { path: base_dir }),
      _ => return Err(ConfigError::BaseDirNotDir { path: base_dir }),
    }
    let base_dir = dunce::canonicalize(&base_dir).map_err(|source| ConfigError::Stat {
      path: base_dir.clone(),
      source,
    })?;

    let psql_path = overrides
      .psql_path
      .or(file.psql_path)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_PSQL_PATH));
    // A bare command name is looked up on PATH when run.
    if psql_path.components().count() > 1 && !probe(&psql_path).is_ok_and(Probe::is_regular) {
      return Err(ConfigError::PsqlNotFound { path: psql_path });
    }

    let db_name = overrides.db_name.or(file.db_name);
    if let Some(name) = &db_name {
      validate_name(name, NameKind::Database)?;
    }

    Ok(Self {
      base_dir,
      psql_path,
      db_name,
    })
  }

  pub fn layout(&self) -> Layout {
    Layout::new(&self.base_dir)
  }

  /// Environment variables exported to every child process.
  pub fn child_env(&self) -> Vec<(String, OsString)> {
    vec![
      (env_var_name(BASE_DIR_PARAM), self.base_dir.clone().into_os_string()),
      (env_var_name(PSQL_PATH_PARAM), self.psql_path.clone().into_os_string()),
    ]
  }
}

/// `base-dir` becomes `DBTOOLS_BASE_DIR`.
pub fn env_var_name(param: &str) -> String {
  format!("{}{}", ENV_PREFIX, param.to_ascii_uppercase().replace('-', "_"))
}

/// The naming rules for the identifiers the tools accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
  Database,
  Schema,
  SchemaObject,
}

impl NameKind {
  pub fn description(self) -> &'static str {
    match self {
      NameKind::Database => {
        "a database name: a leading lowercase character followed by zero or more lowercase letters, digits or underscores"
      }
      NameKind::Schema => {
        "a schema name: a leading lowercase character followed by zero or more lowercase letters, digits or underscores"
      }
      NameKind::SchemaObject => {
        "a schema object name: a lowercase letter or underscore followed by 0 or more lowercase letters, underscores or digits"
      }
    }
  }
}

pub fn validate_name(value: &str, kind: NameKind) -> Result<(), ConfigError> {
  let mut chars = value.chars();
  let leading_ok = match chars.next() {
    Some(c) if c.is_ascii_lowercase() => true,
    Some('_') => kind == NameKind::SchemaObject,
    _ => false,
  };
  let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

  if leading_ok && rest_ok {
    Ok(())
  } else {
    Err(ConfigError::InvalidName {
      value: value.to_string(),
      kind,
    })
  }
}
