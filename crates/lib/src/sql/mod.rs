//! Running SQL through the `psql` client.
//!
//! Two modes are provided:
//! - [`SqlRunner::file_command`] builds the command for a single SQL file; the
//!   caller decides how its output is handled (release steps inherit the
//!   terminal).
//! - [`SqlRunner::run_script`] pipes a buffer into `psql -f -` from a separate
//!   task and captures the combined output so it can be shown on failure.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::DbtConfig;

#[derive(Debug, Error)]
pub enum SqlError {
  #[error("failed to run {}: {source}", program.display())]
  Spawn { program: PathBuf, source: io::Error },

  #[error(
    "{} failed with exit code {}",
    program.display(),
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
  )]
  Failed {
    program: PathBuf,
    code: Option<i32>,
    /// stdout followed by stderr of the failed run.
    output: String,
  },

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

impl SqlError {
  /// Captured client output, if any was collected.
  pub fn output(&self) -> Option<&str> {
    match self {
      SqlError::Failed { output, .. } if !output.is_empty() => Some(output),
      _ => None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct SqlRunner {
  psql_path: PathBuf,
  db_name: Option<String>,
  env: Vec<(String, OsString)>,
}

impl SqlRunner {
  pub fn new(config: &DbtConfig) -> Self {
    Self {
      psql_path: config.psql_path.clone(),
      db_name: config.db_name.clone(),
      env: config.child_env(),
    }
  }

  pub fn psql_path(&self) -> &Path {
    &self.psql_path
  }

  /// The arguments passed to `psql` to run `file` (`-` for standard input).
  pub fn args(&self, file: &OsStr) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-v".into(), "ON_ERROR_STOP=1".into(), "-q".into()];
    if let Some(db) = &self.db_name {
      args.push("-d".into());
      args.push(db.into());
    }
    args.push("-f".into());
    args.push(file.to_os_string());
    args
  }

  /// Build the command that applies a single SQL file.
  pub fn file_command(&self, file: &Path) -> Command {
    self.command(file.as_os_str())
  }

  fn command(&self, file: &OsStr) -> Command {
    let mut command = Command::new(&self.psql_path);
    command.args(self.args(file)).envs(self.env.iter().map(|(k, v)| (k, v)));
    command
  }

  /// Pipe `sql` into the client and wait for it to finish.
  ///
  /// Returns the combined output on success. The writer task owns the child's
  /// stdin, so it is closed however the task ends.
  pub async fn run_script(&self, sql: String) -> Result<String, SqlError> {
    let mut command = self.command(OsStr::new("-"));
    command
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);

    debug!(psql = %self.psql_path.display(), bytes = sql.len(), "piping sql to client");

    let mut child = command.spawn().map_err(|source| SqlError::Spawn {
      program: self.psql_path.clone(),
      source,
    })?;

    let stdin = child.stdin.take();
    let writer = tokio::spawn(async move {
      let Some(mut stdin) = stdin else {
        return Ok(());
      };
      stdin.write_all(sql.as_bytes()).await?;
      stdin.shutdown().await
    });

    let output = child.wait_with_output().await?;

    match writer.await {
      Ok(Ok(())) => {}
      // The client may exit before reading everything; its exit status says why.
      Ok(Err(e)) => debug!(error = %e, "writing sql to client stdin failed"),
      Err(e) => warn!(error = %e, "sql writer task did not complete"),
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
      Ok(combined)
    } else {
      Err(SqlError::Failed {
        program: self.psql_path.clone(),
        code: output.status.code(),
        output: combined,
      })
    }
  }
}
