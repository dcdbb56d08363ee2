//! Implementation of the `dbt apply` command.
//!
//! Validates a release, shows its notes, asks for confirmation when it carries
//! a warning and then runs its files in Manifest order.

use anyhow::{Context, Result, anyhow, bail};
use tracing::info;

use dbtools_lib::config::DbtConfig;
use dbtools_lib::layout::Layout;
use dbtools_lib::release::{ReleaseApplier, check_release, find_releases, read_notes, validate_release};
use dbtools_lib::sql::SqlRunner;

use crate::output::{NotesKind, format_duration, print_error, print_info, print_notes, print_success};
use crate::prompts;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyFlags {
  pub quiet: bool,
  pub no_warn: bool,
}

/// The "Bad release" report, listing what could have been given instead.
fn bad_release(layout: &Layout, name: &str, reason: &dyn std::fmt::Display) -> anyhow::Error {
  let mut msg = format!("Bad release: {}\n    {}", name, reason);
  match find_releases(layout) {
    Ok(releases) if releases.is_empty() => msg.push_str("\n    There are no releases to apply"),
    Ok(releases) => {
      msg.push_str("\n    Possible releases are:");
      for release in releases {
        msg.push_str("\n        ");
        msg.push_str(&release);
      }
    }
    Err(e) => msg.push_str(&format!("\n    Couldn't find the releases: {}", e)),
  }
  anyhow!(msg)
}

/// List the releases that could be applied.
pub fn cmd_show_releases(config: &DbtConfig) -> Result<()> {
  let layout = config.layout();
  let releases = find_releases(&layout)
    .with_context(|| format!("Couldn't find the releases in {}", layout.release_base_dir().display()))?;

  if releases.is_empty() {
    print_info("There are no releases to apply");
  }
  for release in releases {
    println!("{}", release);
  }
  Ok(())
}

/// Execute the apply command.
///
/// Nothing is run unless the whole release is valid. Once running, the first
/// failing file stops the release; files already run are not undone.
pub fn cmd_apply(config: &DbtConfig, name: &str, flags: ApplyFlags) -> Result<()> {
  let layout = config.layout();
  let release = validate_release(&layout, name).map_err(|e| bad_release(&layout, name, &e))?;

  let files = match check_release(&release) {
    Ok(files) => files,
    Err(errors) => {
      for e in &errors {
        print_error(&e.to_string());
      }
      bail!("Bad release: {} ({} problem(s) found)", name, errors.len());
    }
  };

  if !flags.quiet {
    if let Some(readme) = read_notes(&release.readme)? {
      print_notes(NotesKind::ReadMe, &readme);
    }
  }
  if !flags.no_warn {
    if let Some(warning) = read_notes(&release.warning)? {
      print_notes(NotesKind::Warning, &warning);
      if !prompts::confirm("Do you want to continue", false)? {
        bail!("Release {} not applied: the warning was not accepted", name);
      }
    }
  }

  let sql = SqlRunner::new(config);
  let applier = ReleaseApplier::new(&release, &sql, config.child_env());

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(applier.apply(&files, |_, path| {
      if !flags.quiet {
        println!("running: {}", path.display());
      }
    }))
    .with_context(|| format!("Release {} failed", name))?;

  info!(release = %name, applied = report.applied, "apply complete");
  print_success(&format!(
    "Release {} applied: {} file(s) in {}",
    name,
    report.applied,
    format_duration(report.elapsed)
  ));

  Ok(())
}
