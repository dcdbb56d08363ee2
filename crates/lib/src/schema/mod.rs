//! Loading schema objects into a database.
//!
//! Object definitions live under `db.schema/<db>.<schema>/` in one
//! subdirectory per kind. They are applied kind by kind (types, tables, funcs,
//! triggers), each file with macros substituted and prefixed by a
//! `SET search_path` for the schema, and piped into psql.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, NameKind, validate_name};
use crate::consts::{SCHEMA_SUBDIR_FUNCS, SCHEMA_SUBDIR_TABLES, SCHEMA_SUBDIR_TRIGGERS, SCHEMA_SUBDIR_TYPES, SQL_FILE_SUFFIX};
use crate::layout::Layout;
use crate::macros::{MacroCache, MacroError};
use crate::probe::{Probe, probe};
use crate::release::Location;
use crate::sql::{SqlError, SqlRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaObjectKind {
  Type,
  Table,
  Func,
  Trigger,
}

impl SchemaObjectKind {
  /// In the order they are applied.
  pub const ALL: [SchemaObjectKind; 4] = [
    SchemaObjectKind::Type,
    SchemaObjectKind::Table,
    SchemaObjectKind::Func,
    SchemaObjectKind::Trigger,
  ];

  pub fn subdir(self) -> &'static str {
    match self {
      SchemaObjectKind::Type => SCHEMA_SUBDIR_TYPES,
      SchemaObjectKind::Table => SCHEMA_SUBDIR_TABLES,
      SchemaObjectKind::Func => SCHEMA_SUBDIR_FUNCS,
      SchemaObjectKind::Trigger => SCHEMA_SUBDIR_TRIGGERS,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      SchemaObjectKind::Type => "type",
      SchemaObjectKind::Table => "table",
      SchemaObjectKind::Func => "func",
      SchemaObjectKind::Trigger => "trigger",
    }
  }
}

impl fmt::Display for SchemaObjectKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum SchemaError {
  #[error("the schema directory {} does not exist", dir.display())]
  SchemaDirMissing { dir: PathBuf },

  #[error("the schema directory {} is not a directory", dir.display())]
  SchemaDirNotDir { dir: PathBuf },

  #[error("You must give at least one type, table, trigger or func name")]
  NoObjects,

  #[error("Duplicate {kind}s: {name:?} appears more than once")]
  Duplicate { kind: SchemaObjectKind, name: String },

  #[error(transparent)]
  InvalidName(#[from] ConfigError),

  #[error("the {kind} file {} does not exist", path.display())]
  FileMissing { kind: SchemaObjectKind, path: PathBuf },

  #[error("the {kind} file {} is not a regular file", path.display())]
  FileNotRegular { kind: SchemaObjectKind, path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error(transparent)]
  Macro(#[from] MacroError),

  #[error("Could not apply the schema {kind} file: {}", path.display())]
  Apply {
    kind: SchemaObjectKind,
    path: PathBuf,
    #[source]
    source: SqlError,
  },
}

/// The object names requested for each kind.
#[derive(Debug, Clone, Default)]
pub struct SchemaObjects {
  pub types: Vec<String>,
  pub tables: Vec<String>,
  pub funcs: Vec<String>,
  pub triggers: Vec<String>,
}

impl SchemaObjects {
  pub fn names(&self, kind: SchemaObjectKind) -> &[String] {
    match kind {
      SchemaObjectKind::Type => &self.types,
      SchemaObjectKind::Table => &self.tables,
      SchemaObjectKind::Func => &self.funcs,
      SchemaObjectKind::Trigger => &self.triggers,
    }
  }

  pub fn is_empty(&self) -> bool {
    SchemaObjectKind::ALL.iter().all(|k| self.names(*k).is_empty())
  }

  /// Check names are well formed and not repeated within a kind.
  pub fn validate(&self) -> Vec<SchemaError> {
    if self.is_empty() {
      return vec![SchemaError::NoObjects];
    }

    let mut errors = Vec::new();
    for kind in SchemaObjectKind::ALL {
      let mut seen = HashSet::new();
      for name in self.names(kind) {
        if let Err(e) = validate_name(name.strip_suffix(SQL_FILE_SUFFIX).unwrap_or(name), NameKind::SchemaObject) {
          errors.push(e.into());
        } else if !seen.insert(name.as_str()) {
          errors.push(SchemaError::Duplicate {
            kind,
            name: name.clone(),
          });
        }
      }
    }
    errors
  }
}

/// Check that `<db>.<schema>` exists and return its directory.
pub fn check_schema_dir(layout: &Layout, db_name: &str, schema_name: &str) -> Result<PathBuf, SchemaError> {
  let dir = layout.schema_dir(db_name, schema_name);
  match probe(&dir) {
    Ok(Probe::Directory) => Ok(dir),
    Ok(Probe::Missing) => Err(SchemaError::SchemaDirMissing { dir }),
    Ok(_) => Err(SchemaError::SchemaDirNotDir { dir }),
    Err(source) => Err(SchemaError::Read { path: dir, source }),
  }
}

/// Map names of one kind to their files, adding `.sql` where it is missing.
///
/// Every missing file is reported; the files that do exist are still returned.
pub fn resolve_files(schema_dir: &Path, kind: SchemaObjectKind, names: &[String]) -> (Vec<PathBuf>, Vec<SchemaError>) {
  let dir = schema_dir.join(kind.subdir());
  let mut files = Vec::new();
  let mut errors = Vec::new();

  for name in names {
    let file_name = if name.ends_with(SQL_FILE_SUFFIX) {
      name.clone()
    } else {
      format!("{}{}", name, SQL_FILE_SUFFIX)
    };
    let path = dir.join(file_name);
    match probe(&path) {
      Ok(Probe::Regular) => files.push(path),
      Ok(Probe::Missing) => errors.push(SchemaError::FileMissing { kind, path }),
      Ok(_) => errors.push(SchemaError::FileNotRegular { kind, path }),
      Err(source) => errors.push(SchemaError::Read { path, source }),
    }
  }

  (files, errors)
}

/// The files to load, in the order they will be applied.
#[derive(Debug, Clone, Default)]
pub struct LoadPlan {
  pub files: Vec<(SchemaObjectKind, PathBuf)>,
}

impl LoadPlan {
  pub fn resolve(schema_dir: &Path, objects: &SchemaObjects) -> Result<Self, Vec<SchemaError>> {
    let mut plan = LoadPlan::default();
    let mut errors = Vec::new();

    for kind in SchemaObjectKind::ALL {
      let (files, errs) = resolve_files(schema_dir, kind, objects.names(kind));
      plan.files.extend(files.into_iter().map(|f| (kind, f)));
      errors.extend(errs);
    }

    if errors.is_empty() { Ok(plan) } else { Err(errors) }
  }
}

/// Read `path`, substituting macros, behind a `SET search_path` for `schema`.
pub fn translate_file(path: &Path, schema: &str, macros: &MacroCache) -> Result<String, SchemaError> {
  let read_err = |source| SchemaError::Read {
    path: path.to_path_buf(),
    source,
  };
  let reader = BufReader::new(File::open(path).map_err(read_err)?);

  let mut sql = format!("SET search_path TO {};\n", schema);
  for (idx, line) in reader.lines().enumerate() {
    let line = line.map_err(read_err)?;
    let location = Location {
      file: path.to_path_buf(),
      line: idx + 1,
    };
    sql.push_str(&macros.substitute(&line, &location)?);
    sql.push('\n');
  }
  Ok(sql)
}

/// Whether SQL is sent to the database or only shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
  Apply,
  DisplayOnly,
}

pub struct SchemaLoader<'a> {
  sql: &'a SqlRunner,
  macros: &'a MacroCache,
  schema: &'a str,
  mode: LoadMode,
}

impl<'a> SchemaLoader<'a> {
  pub fn new(sql: &'a SqlRunner, macros: &'a MacroCache, schema: &'a str, mode: LoadMode) -> Self {
    Self {
      sql,
      macros,
      schema,
      mode,
    }
  }

  /// Apply every file of `plan`, stopping at the first failure.
  ///
  /// In [`LoadMode::DisplayOnly`] the translated SQL is passed to `display`
  /// instead. Returns the number of files handled.
  pub async fn load(&self, plan: &LoadPlan, mut display: impl FnMut(&str)) -> Result<usize, SchemaError> {
    for (kind, path) in &plan.files {
      info!(kind = %kind, path = %path.display(), "applying schema file");
      let sql = translate_file(path, self.schema, self.macros)?;

      match self.mode {
        LoadMode::DisplayOnly => display(&sql),
        LoadMode::Apply => {
          self.sql.run_script(sql).await.map_err(|source| SchemaError::Apply {
            kind: *kind,
            path: path.clone(),
            source,
          })?;
        }
      }
    }
    Ok(plan.files.len())
  }
}
