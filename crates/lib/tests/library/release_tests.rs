//! Validate then apply, the way the `apply` command drives the library.

use dbtools_lib::layout::check_dirs;
use dbtools_lib::release::{ManifestError, check_release, find_releases, validate_release};

use super::common::Project;

#[test]
fn scaffolded_tree_is_complete() {
  let project = Project::new();
  assert!(check_dirs(&project.layout(), "shop", "sales"));
  assert!(!check_dirs(&project.layout(), "shop", "hr"));
  assert!(find_releases(&project.layout()).unwrap().is_empty());
}

#[test]
fn every_problem_is_reported_together() {
  let project = Project::new();
  project.write("r1", "Manifest", "a.sh\n\n# later\nmissing.sh\na.sh\nSQL.files\n");
  project.write("r1", "a.sh", "");
  project.write("r1", "SQL.files/x.sql", "");
  project.write("r1", "leftover.sh", "");

  let release = validate_release(&project.layout(), "r1").unwrap();
  let errors = check_release(&release).unwrap_err();

  let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
  assert_eq!(errors.len(), 4, "{:#?}", messages);
  assert!(matches!(errors[0], ManifestError::FileMissing { ref location, .. } if location.line == 4));
  assert!(matches!(errors[1], ManifestError::Duplicate { ref first, .. } if first.line == 1));
  assert!(matches!(errors[2], ManifestError::FileNotRegular { .. }));
  assert!(matches!(errors[3], ManifestError::Unused { ref name, .. } if name == "leftover.sh"));
}

#[cfg(unix)]
#[tokio::test]
async fn valid_release_is_applied_in_manifest_order() {
  use dbtools_lib::release::ReleaseApplier;
  use dbtools_lib::sql::SqlRunner;

  let project = Project::new();
  let log = project.out().join("order.log");
  project.write("r1", "Manifest", "second.sh\nfirst.sh\n");
  project.script("r1", "first.sh", &format!("echo first >> {}\n", log.display()));
  project.script("r1", "second.sh", &format!("echo second >> {}\n", log.display()));
  project.write("r1", "ReadMe", "order matters\n");

  let release = validate_release(&project.layout(), "r1").unwrap();
  let files = check_release(&release).unwrap();
  let sql = SqlRunner::new(&project.config);
  let report = ReleaseApplier::new(&release, &sql, project.config.child_env())
    .apply(&files, |_, _| {})
    .await
    .unwrap();

  assert_eq!(report.applied, 2);
  assert_eq!(std::fs::read_to_string(&log).unwrap(), "second\nfirst\n");
}
