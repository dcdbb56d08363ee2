//! dbtools-lib: Core types and logic for the dbtools family
//!
//! This crate provides everything the `dbt` commands do:
//! - `release`: validating a release directory against its Manifest and applying it
//! - `schema`: loading types, tables, funcs and triggers from the schema directories
//! - `layout`: the standard directory tree under the base directory
//! - `sql`: running SQL through the `psql` client

pub mod config;
pub mod consts;
pub mod layout;
pub mod macros;
pub mod platform;
pub mod probe;
pub mod release;
pub mod schema;
pub mod sql;
pub mod util;
