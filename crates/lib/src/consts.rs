//! Names shared by every tool in the family.

pub const APP_NAME: &str = "dbtools";

/// Prefix applied to the names of environment variables exported to child processes.
pub const ENV_PREFIX: &str = "DBTOOLS_";

pub const DBT_DIR_NAME: &str = "db.postgres";

pub const RELEASE_SCRIPTS_BASE_NAME: &str = "releaseScripts";
pub const RELEASE_ARCHIVE_DIR_NAME: &str = "Archive";
pub const RELEASE_SQL_DIR_NAME: &str = "SQL.files";
pub const RELEASE_MANIFEST_FILE_NAME: &str = "Manifest";
pub const RELEASE_README_FILE_NAME: &str = "ReadMe";
pub const RELEASE_WARNING_FILE_NAME: &str = "Warning";

pub const MACROS_DIR_NAME: &str = "macros";
pub const DB_SCHEMA_DIR_NAME: &str = "db.schema";

pub const SCHEMA_SUBDIR_TYPES: &str = "types";
pub const SCHEMA_SUBDIR_TABLES: &str = "tables";
pub const SCHEMA_SUBDIR_FUNCS: &str = "funcs";
pub const SCHEMA_SUBDIR_TRIGGERS: &str = "triggers";

/// Lines of a Manifest starting with this are ignored.
pub const MANIFEST_COMMENT_INTRO: &str = "#";

pub const SQL_FILE_SUFFIX: &str = ".sql";

pub const DEFAULT_PSQL_PATH: &str = "psql";
