//! Implementation of the `dbt make-dirs` command.

use anyhow::{Result, bail};

use dbtools_lib::config::{DbtConfig, NameKind, validate_name};
use dbtools_lib::layout::{check_dirs, make_missing_dirs};

use crate::output::{print_info, print_success};

/// Create (or with `only_check`, look for) the directories for each schema.
pub fn cmd_make_dirs(config: &DbtConfig, db_name: &str, schemas: &[String], only_check: bool) -> Result<()> {
  for schema in schemas {
    validate_name(schema, NameKind::Schema)?;
  }

  let layout = config.layout();
  let mut missing = Vec::new();

  for schema in schemas {
    if check_dirs(&layout, db_name, schema) {
      print_info(&format!("The directories for {}.{} are all present", db_name, schema));
      continue;
    }
    if only_check {
      missing.push(schema.as_str());
      continue;
    }
    make_missing_dirs(&layout, db_name, schema)?;
    print_success(&format!("Created the directories for {}.{}", db_name, schema));
  }

  if !missing.is_empty() {
    bail!("Some directories are missing for {}: {}", db_name, missing.join(", "));
  }
  Ok(())
}
