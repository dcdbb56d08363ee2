//! Implementation of the `dbt load-schema` command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use dbtools_lib::config::{DbtConfig, NameKind, validate_name};
use dbtools_lib::consts::SQL_FILE_SUFFIX;
use dbtools_lib::macros::MacroCache;
use dbtools_lib::schema::{LoadMode, LoadPlan, SchemaError, SchemaLoader, SchemaObjects, check_schema_dir};
use dbtools_lib::sql::SqlRunner;

use crate::output::{print_error, print_error_detail, print_success};

pub struct LoadSchemaArgs {
  pub db_name: String,
  pub schema: String,
  pub objects: SchemaObjects,
  pub macro_dirs: Vec<PathBuf>,
  pub display_sql_only: bool,
}

fn report_all(errors: &[SchemaError]) {
  for e in errors {
    print_error(&e.to_string());
  }
}

pub fn cmd_load_schema(config: &DbtConfig, args: LoadSchemaArgs) -> Result<()> {
  validate_name(&args.schema, NameKind::Schema)?;

  let errors = args.objects.validate();
  if !errors.is_empty() {
    report_all(&errors);
    bail!("Bad schema objects ({} problem(s) found)", errors.len());
  }

  let layout = config.layout();
  let schema_dir = check_schema_dir(&layout, &args.db_name, &args.schema)?;

  let mut macro_dirs = args.macro_dirs;
  macro_dirs.push(layout.macros_dir());
  let macros = MacroCache::new(&macro_dirs, SQL_FILE_SUFFIX)?;

  let plan = match LoadPlan::resolve(&schema_dir, &args.objects) {
    Ok(plan) => plan,
    Err(errors) => {
      report_all(&errors);
      bail!("Bad schema files ({} problem(s) found)", errors.len());
    }
  };

  let mode = if args.display_sql_only {
    LoadMode::DisplayOnly
  } else {
    LoadMode::Apply
  };
  let sql = SqlRunner::new(config);
  let loader = SchemaLoader::new(&sql, &macros, &args.schema, mode);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  match rt.block_on(loader.load(&plan, |text| print!("{}", text))) {
    Ok(count) => {
      if mode == LoadMode::Apply {
        print_success(&format!(
          "Loaded {} file(s) into {}.{}",
          count, args.db_name, args.schema
        ));
      }
      Ok(())
    }
    Err(e) => {
      if let SchemaError::Apply { source, .. } = &e {
        print_error(&e.to_string());
        if let Some(output) = source.output() {
          for line in output.lines() {
            print_error_detail(line);
          }
        }
        bail!("{}", source);
      }
      Err(e.into())
    }
  }
}
