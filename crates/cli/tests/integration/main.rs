//! CLI integration tests for dbt.


#[cfg(unix)]
mod apply_tests;
mod make_dirs_tests;
