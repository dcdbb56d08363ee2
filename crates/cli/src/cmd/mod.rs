mod apply;
mod load_schema;
mod make_dirs;

pub use apply::{ApplyFlags, cmd_apply, cmd_show_releases};
pub use load_schema::{LoadSchemaArgs, cmd_load_schema};
pub use make_dirs::cmd_make_dirs;
