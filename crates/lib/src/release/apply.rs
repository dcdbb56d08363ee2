//! Running the files of a release in Manifest order.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::Release;
use crate::sql::SqlRunner;

/// How a release file is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
  /// Under `SQL.files/`: handed to psql.
  Sql,
  /// Anything else: executed directly.
  Exec,
}

#[derive(Debug, Error)]
pub enum StepError {
  #[error("{0}")]
  Spawn(#[source] io::Error),

  #[error("exit status {}", code.map_or_else(|| "unknown (killed by signal)".to_string(), |c| c.to_string()))]
  Failed { code: Option<i32> },
}

#[derive(Debug, Error)]
pub enum ApplyError {
  #[error("running {}: {source}", path.display())]
  Step {
    /// Position in the file list; nothing after it was run.
    index: usize,
    path: PathBuf,
    #[source]
    source: StepError,
  },
}

#[derive(Debug)]
pub struct ApplyReport {
  pub applied: usize,
  pub elapsed: Duration,
}

pub struct ReleaseApplier<'a> {
  release: &'a Release,
  sql: &'a SqlRunner,
  env: Vec<(String, OsString)>,
}

impl<'a> ReleaseApplier<'a> {
  pub fn new(release: &'a Release, sql: &'a SqlRunner, env: Vec<(String, OsString)>) -> Self {
    Self { release, sql, env }
  }

  pub fn classify(&self, path: &Path) -> StepKind {
    if path.starts_with(&self.release.sql_dir) {
      StepKind::Sql
    } else {
      StepKind::Exec
    }
  }

  fn command(&self, path: &Path) -> Command {
    let mut command = match self.classify(path) {
      StepKind::Sql => self.sql.file_command(path),
      StepKind::Exec => Command::new(path),
    };
    command
      .envs(self.env.iter().map(|(k, v)| (k, v)))
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit());
    command
  }

  /// Run `files` one after the other, stopping at the first failure.
  ///
  /// `on_step` is called with the index and path of each file just before it
  /// is started. There is no rollback of the steps that already ran.
  pub async fn apply(
    &self,
    files: &[PathBuf],
    mut on_step: impl FnMut(usize, &Path),
  ) -> Result<ApplyReport, ApplyError> {
    info!(release = %self.release.name, files = files.len(), "applying release");
    let started = Instant::now();

    for (index, path) in files.iter().enumerate() {
      on_step(index, path);

      let kind = self.classify(path);
      debug!(index, path = %path.display(), ?kind, "running release step");

      let result = match self.command(path).status().await {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(StepError::Failed { code: status.code() }),
        Err(e) => Err(StepError::Spawn(e)),
      };

      if let Err(source) = result {
        warn!(index, path = %path.display(), error = %source, "release step failed");
        return Err(ApplyError::Step {
          index,
          path: path.clone(),
          source,
        });
      }
    }

    let elapsed = started.elapsed();
    info!(release = %self.release.name, applied = files.len(), ?elapsed, "release applied");
    Ok(ApplyReport {
      applied: files.len(),
      elapsed,
    })
  }
}
