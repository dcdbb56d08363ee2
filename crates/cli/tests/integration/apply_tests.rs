//! Apply command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

fn marker(env: &TestEnv, name: &str) -> String {
  format!("touch {}/{}.done\n", env.output_path().display(), name)
}

#[test]
fn apply_runs_scripts_and_sql_in_order() {
  let env = TestEnv::new();
  let dir = env.release("r1", "# first the script\none.sh\n\nSQL.files/two.sql\n");
  env.write_script("db.postgres/releaseScripts/r1/one.sh", &marker(&env, "one"));
  env.write_file("db.postgres/releaseScripts/r1/SQL.files/two.sql", "SELECT 1;\n");

  env
    .dbt_cmd()
    .args(["apply", "--release", "r1", "--db-name", "shop"])
    .assert()
    .success()
    .stdout(predicate::str::contains(format!("running: {}", dir.join("one.sh").display())))
    .stdout(predicate::str::contains("Release r1 applied: 2 file(s)"));

  assert!(env.output_path().join("one.done").exists());
  assert_eq!(
    env.psql_log().trim_end(),
    format!(
      "psql -v ON_ERROR_STOP=1 -q -d shop -f {}",
      dir.join("SQL.files/two.sql").display()
    )
  );
}

#[test]
fn quiet_hides_progress() {
  let env = TestEnv::new();
  env.release("r1", "one.sh\n");
  env.write_script("db.postgres/releaseScripts/r1/one.sh", "exit 0\n");
  env.write_file("db.postgres/releaseScripts/r1/ReadMe", "adds the orders table\n");

  env
    .dbt_cmd()
    .args(["apply", "-r", "r1", "--quiet"])
    .assert()
    .success()
    .stdout(predicate::str::contains("running:").not())
    .stdout(predicate::str::contains("adds the orders table").not());
}

#[test]
fn readme_is_shown() {
  let env = TestEnv::new();
  env.release("r1", "one.sh\n");
  env.write_script("db.postgres/releaseScripts/r1/one.sh", "exit 0\n");
  env.write_file("db.postgres/releaseScripts/r1/ReadMe", "adds the orders table\n");

  env
    .dbt_cmd()
    .args(["apply", "--rel", "r1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Note\n"))
    .stdout(predicate::str::contains("adds the orders table"));
}

#[test]
fn failing_step_stops_the_release() {
  let env = TestEnv::new();
  env.release("r1", "a.sh\nb.sh\nc.sh\n");
  env.write_script("db.postgres/releaseScripts/r1/a.sh", &marker(&env, "a"));
  env.write_script("db.postgres/releaseScripts/r1/b.sh", &format!("{}exit 3\n", marker(&env, "b")));
  env.write_script("db.postgres/releaseScripts/r1/c.sh", &marker(&env, "c"));

  env
    .dbt_cmd()
    .args(["apply", "-r", "r1"])
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("*** Error ***"))
    .stderr(predicate::str::contains("Release r1 failed"))
    .stderr(predicate::str::contains("exit status 3"));

  assert!(env.output_path().join("a.done").exists());
  assert!(env.output_path().join("b.done").exists());
  assert!(!env.output_path().join("c.done").exists());
}

#[test]
fn invalid_manifest_runs_nothing() {
  let env = TestEnv::new();
  env.release("r1", "a.sh\nmissing.sh\na.sh\n");
  env.write_script("db.postgres/releaseScripts/r1/a.sh", &marker(&env, "a"));
  env.write_file("db.postgres/releaseScripts/r1/stray.sql", "");

  env
    .dbt_cmd()
    .args(["apply", "-r", "r1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("does not contain \"missing.sh\""))
    .stderr(predicate::str::contains("already in the manifest"))
    .stderr(predicate::str::contains("stray.sql"))
    .stderr(predicate::str::contains("3 problem(s) found"));

  assert!(!env.output_path().join("a.done").exists());
}

#[test]
fn unknown_release_lists_the_others() {
  let env = TestEnv::new();
  env.release("r1", "a.sh\n");
  env.release("r2", "a.sh\n");

  env
    .dbt_cmd()
    .args(["apply", "-r", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Bad release: nope"))
    .stderr(predicate::str::contains("does not exist"))
    .stderr(predicate::str::contains("Possible releases are:"))
    .stderr(predicate::str::contains("r1"))
    .stderr(predicate::str::contains("r2"));
}

#[test]
fn archive_cannot_be_applied() {
  let env = TestEnv::new();
  env.release("r1", "a.sh\n");

  env
    .dbt_cmd()
    .args(["apply", "-r", "Archive"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be used as a release directory"));
}

#[test]
fn no_releases_to_apply() {
  let env = TestEnv::new();
  std::fs::create_dir_all(env.base_dir().join("db.postgres/releaseScripts/Archive")).unwrap();

  env
    .dbt_cmd()
    .args(["apply", "-r", "r1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("There are no releases to apply"));
}

#[test]
fn warning_needs_a_terminal() {
  let env = TestEnv::new();
  env.release("r1", "a.sh\n");
  env.write_script("db.postgres/releaseScripts/r1/a.sh", &marker(&env, "a"));
  env.write_file("db.postgres/releaseScripts/r1/Warning", "this locks the orders table\n");

  env
    .dbt_cmd()
    .args(["apply", "-r", "r1"])
    .assert()
    .failure()
    .stdout(predicate::str::contains("this locks the orders table"))
    .stderr(predicate::str::contains("--no-warn"));

  assert!(!env.output_path().join("a.done").exists());
}

#[test]
fn no_warn_skips_the_prompt() {
  let env = TestEnv::new();
  env.release("r1", "a.sh\n");
  env.write_script("db.postgres/releaseScripts/r1/a.sh", &marker(&env, "a"));
  env.write_file("db.postgres/releaseScripts/r1/Warning", "this locks the orders table\n");

  env
    .dbt_cmd()
    .args(["apply", "-r", "r1", "--no-warn"])
    .assert()
    .success()
    .stdout(predicate::str::contains("this locks the orders table").not());

  assert!(env.output_path().join("a.done").exists());
}

#[test]
fn scripts_see_the_base_dir() {
  let env = TestEnv::new();
  env.release("r1", "env.sh\n");
  env.write_script(
    "db.postgres/releaseScripts/r1/env.sh",
    &format!("echo \"$DBTOOLS_BASE_DIR\" > {}/env.out\n", env.output_path().display()),
  );

  env.dbt_cmd().args(["apply", "-r", "r1"]).assert().success();

  let seen = std::fs::read_to_string(env.output_path().join("env.out")).unwrap();
  assert_eq!(seen.trim_end(), env.base_dir().to_string_lossy());
}

#[test]
fn show_releases() {
  let env = TestEnv::new();
  env.release("r2", "a.sh\n");
  env.release("r1", "a.sh\n");

  env
    .dbt_cmd()
    .args(["apply", "--show-releases"])
    .assert()
    .success()
    .stdout(predicate::str::diff("r1\nr2\n"));
}

#[test]
fn absolute_manifest_entry_is_never_run() {
  let env = TestEnv::new();
  let outside = env.write_script("elsewhere/evil.sh", &marker(&env, "evil"));
  env.release("r1", &format!("{}\n", outside.display()));

  env
    .dbt_cmd()
    .args(["apply", "-r", "r1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not a path inside the release directory"));

  assert!(!env.output_path().join("evil.done").exists());
}
