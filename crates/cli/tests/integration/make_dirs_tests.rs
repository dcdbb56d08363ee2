//! Make-dirs command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn creates_the_full_tree() {
  let env = TestEnv::new();

  env
    .dbt_cmd()
    .args(["make-dirs", "--db-name", "shop", "--schemas", "sales,hr"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Created the directories for shop.sales"));

  let base = env.base_dir().join("db.postgres");
  for dir in [
    "releaseScripts/Archive",
    "macros",
    "db.schema/shop.sales/types",
    "db.schema/shop.sales/triggers",
    "db.schema/shop.hr/tables",
    "db.schema/shop.hr/funcs",
  ] {
    assert!(base.join(dir).is_dir(), "{} was not created", dir);
  }
}

#[test]
fn only_check_reports_missing_dirs() {
  let env = TestEnv::new();

  env
    .dbt_cmd()
    .args(["make-dirs", "--db-name", "shop", "--schemas", "sales", "--only-check"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Some directories are missing for shop: sales"));

  assert!(!env.base_dir().join("db.postgres").exists());
}

#[test]
fn only_check_after_creating() {
  let env = TestEnv::new();
  env
    .dbt_cmd()
    .args(["make-dirs", "--db-name", "shop", "--schemas", "sales"])
    .assert()
    .success();

  env
    .dbt_cmd()
    .args(["make-dirs", "--db-name", "shop", "--schemas", "sales", "--only-check"])
    .assert()
    .success()
    .stdout(predicate::str::contains("are all present"));
}

#[test]
fn file_in_the_way_is_an_error() {
  let env = TestEnv::new();
  env.write_file("db.postgres/macros", "not a directory");

  env
    .dbt_cmd()
    .args(["make-dirs", "--db-name", "shop", "--schemas", "sales"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn bad_names_are_rejected() {
  let env = TestEnv::new();

  env
    .dbt_cmd()
    .args(["make-dirs", "--db-name", "Shop", "--schemas", "sales"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not valid as a database name"));

  env
    .dbt_cmd()
    .args(["make-dirs", "--db-name", "shop", "--schemas", "9lives"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not valid as a schema name"));
}

#[test]
fn base_dir_is_required() {
  let env = TestEnv::new();

  env
    .dbt_cmd()
    .env_remove("DBTOOLS_BASE_DIR")
    .args(["make-dirs", "--db-name", "shop", "--schemas", "sales"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("the base-dir parameter must be set"));
}

#[test]
fn base_dir_from_config_file() {
  let env = TestEnv::new();
  let config = env.temp.path().join("dbt.json");
  std::fs::write(
    &config,
    format!("{{\"base-dir\": {:?}}}", env.base_dir().to_string_lossy()),
  )
  .unwrap();

  env
    .dbt_cmd()
    .env_remove("DBTOOLS_BASE_DIR")
    .arg("--config")
    .arg(&config)
    .args(["make-dirs", "--db-name", "shop", "--schemas", "sales"])
    .assert()
    .success();

  assert!(env.base_dir().join("db.postgres/db.schema/shop.sales").is_dir());
}
