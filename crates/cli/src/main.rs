mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dbtools_lib::config::{ConfigFile, ConfigOverrides, DbtConfig};

use crate::output::{format_error, print_error};

/// dbt - release and schema management for PostgreSQL projects
#[derive(Parser)]
#[command(name = "dbt")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// The directory holding the db.postgres tree
  #[arg(long, global = true, env = "DBTOOLS_BASE_DIR")]
  base_dir: Option<PathBuf>,

  /// The psql client to run SQL with
  #[arg(long, global = true, env = "DBTOOLS_PSQL_PATH")]
  psql_path: Option<PathBuf>,

  /// Read settings from this JSON file instead of the default config file
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Apply a release from the releaseScripts directory
  #[command(group(ArgGroup::new("target").required(true).args(["release", "show_releases"])))]
  Apply {
    /// The name of the release to apply
    #[arg(short = 'r', long, visible_alias = "rel")]
    release: Option<String>,

    /// List the releases that could be applied
    #[arg(long)]
    show_releases: bool,

    /// Don't show the ReadMe or the files as they are run
    #[arg(short, long)]
    quiet: bool,

    /// Don't show the Warning or ask for confirmation
    #[arg(long)]
    no_warn: bool,

    /// The database SQL files are applied to
    #[arg(long, visible_alias = "db")]
    db_name: Option<String>,
  },

  /// Load schema objects into a database
  LoadSchema {
    /// The database to load into
    #[arg(long, visible_alias = "db")]
    db_name: String,

    /// The schema the objects belong to
    #[arg(long)]
    schema: String,

    /// Types to load
    #[arg(long, visible_alias = "type", value_delimiter = ',')]
    types: Vec<String>,

    /// Tables to load
    #[arg(long, visible_aliases = ["table", "tbl"], value_delimiter = ',')]
    tables: Vec<String>,

    /// Functions to load
    #[arg(long, visible_alias = "func", value_delimiter = ',')]
    funcs: Vec<String>,

    /// Triggers to load
    #[arg(long, visible_alias = "trigger", value_delimiter = ',')]
    triggers: Vec<String>,

    /// Extra macro directories, searched before the standard one
    #[arg(long, value_delimiter = ',')]
    macro_dirs: Vec<PathBuf>,

    /// Print the SQL instead of applying it
    #[arg(long, visible_aliases = ["sql-only", "debug", "dbg"])]
    display_sql_only: bool,
  },

  /// Create the standard directory tree for a database
  MakeDirs {
    /// The database name
    #[arg(long, visible_alias = "db")]
    db_name: String,

    /// The schemas to create directories for
    #[arg(long, visible_alias = "schema-names", value_delimiter = ',', required = true)]
    schemas: Vec<String>,

    /// Only report whether the directories exist
    #[arg(long)]
    only_check: bool,
  },
}

impl Commands {
  fn db_name(&self) -> Option<&str> {
    match self {
      Commands::Apply { db_name, .. } => db_name.as_deref(),
      Commands::LoadSchema { db_name, .. } | Commands::MakeDirs { db_name, .. } => Some(db_name.as_str()),
    }
  }
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<DbtConfig> {
  let file = match &cli.config {
    Some(path) => ConfigFile::load(path)?,
    None => ConfigFile::load_default()?,
  };
  let overrides = ConfigOverrides {
    base_dir: cli.base_dir.clone(),
    psql_path: cli.psql_path.clone(),
    db_name: cli.command.db_name().map(str::to_string),
  };
  Ok(DbtConfig::resolve(overrides, file)?)
}

fn run(cli: Cli) -> anyhow::Result<()> {
  let config = load_config(&cli)?;

  match cli.command {
    Commands::Apply {
      release,
      show_releases,
      quiet,
      no_warn,
      db_name: _,
    } => {
      if show_releases {
        cmd::cmd_show_releases(&config)
      } else {
        // clap's group guarantees a release when --show-releases is absent.
        let release = release.unwrap_or_default();
        cmd::cmd_apply(&config, &release, cmd::ApplyFlags { quiet, no_warn })
      }
    }
    Commands::LoadSchema {
      db_name,
      schema,
      types,
      tables,
      funcs,
      triggers,
      macro_dirs,
      display_sql_only,
    } => cmd::cmd_load_schema(
      &config,
      cmd::LoadSchemaArgs {
        db_name,
        schema,
        objects: dbtools_lib::schema::SchemaObjects {
          types,
          tables,
          funcs,
          triggers,
        },
        macro_dirs,
        display_sql_only,
      },
    ),
    Commands::MakeDirs {
      db_name,
      schemas,
      only_check,
    } => cmd::cmd_make_dirs(&config, &db_name, &schemas, only_check),
  }
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  if let Err(e) = run(cli) {
    print_error(&format_error(&e));
    std::process::exit(1);
  }
}
