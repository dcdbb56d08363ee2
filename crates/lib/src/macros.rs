//! A small file-backed macro cache for schema SQL.
//!
//! Every file `<name><suffix>` directly inside one of the macro directories
//! defines the macro `name`; its content (less trailing newlines) replaces each
//! `${name}` in the lines it is applied to. When the same name is defined in
//! several directories the first directory wins.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::release::Location;

const MACRO_START: &str = "${";
const MACRO_END: char = '}';

#[derive(Debug, Error)]
pub enum MacroError {
  #[error("the macro directory {} does not exist or is not a directory", dir.display())]
  NoSuchDir { dir: PathBuf },

  #[error("failed to read macros from {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("{location}: unknown macro {name:?}")]
  Unknown { location: Location, name: String },

  #[error("{location}: unterminated macro reference")]
  Unterminated { location: Location },
}

#[derive(Debug, Clone)]
struct MacroDef {
  value: String,
  source: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct MacroCache {
  macros: HashMap<String, MacroDef>,
}

impl MacroCache {
  /// Load the macros from `dirs` (in priority order) with the given file suffix.
  pub fn new(dirs: &[PathBuf], suffix: &str) -> Result<Self, MacroError> {
    let mut macros = HashMap::new();

    for dir in dirs {
      if !dir.is_dir() {
        return Err(MacroError::NoSuchDir { dir: dir.clone() });
      }

      let mut found: Vec<PathBuf> = Vec::new();
      for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| MacroError::Read {
          path: e.path().map_or_else(|| dir.clone(), Path::to_path_buf),
          source: e.into(),
        })?;
        if entry.file_type().is_file() || entry.path().is_file() {
          found.push(entry.into_path());
        }
      }

      for path in found {
        let Some(name) = macro_name(&path, suffix) else {
          continue;
        };
        if macros.contains_key(&name) {
          debug!(name = %name, path = %path.display(), "macro already defined, ignoring");
          continue;
        }
        let content = fs::read_to_string(&path).map_err(|source| MacroError::Read {
          path: path.clone(),
          source,
        })?;
        let value = content.trim_end_matches(['\n', '\r']).to_string();
        debug!(name = %name, path = %path.display(), "loaded macro");
        macros.insert(name, MacroDef { value, source: path });
      }
    }

    Ok(Self { macros })
  }

  pub fn len(&self) -> usize {
    self.macros.len()
  }

  pub fn is_empty(&self) -> bool {
    self.macros.is_empty()
  }

  /// Where the macro `name` was loaded from.
  pub fn source(&self, name: &str) -> Option<&Path> {
    self.macros.get(name).map(|m| m.source.as_path())
  }

  /// Replace every `${name}` in `line`. Substituted text is not rescanned.
  pub fn substitute(&self, line: &str, location: &Location) -> Result<String, MacroError> {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(start) = rest.find(MACRO_START) {
      out.push_str(&rest[..start]);
      let after = &rest[start + MACRO_START.len()..];
      let Some(end) = after.find(MACRO_END) else {
        return Err(MacroError::Unterminated {
          location: location.clone(),
        });
      };
      let name = &after[..end];
      let def = self.macros.get(name).ok_or_else(|| MacroError::Unknown {
        location: location.clone(),
        name: name.to_string(),
      })?;
      out.push_str(&def.value);
      rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
  }
}

fn macro_name(path: &Path, suffix: &str) -> Option<String> {
  let file_name = path.file_name()?.to_str()?;
  let name = file_name.strip_suffix(suffix)?;
  (!name.is_empty()).then(|| name.to_string())
}
