//! Test utilities for dbtools-lib.
//!
//! Helpers for building release trees and stand-in executables on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::Layout;
use crate::release::Release;

/// Write an executable `/bin/sh` script called `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
  fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Create an empty release directory called `name` under `base` and return it.
pub fn make_release(base: &Path, name: &str) -> Release {
  let layout = Layout::new(base);
  fs::create_dir_all(layout.release_dir(name)).unwrap();
  fs::create_dir_all(layout.release_base_dir().join("Archive")).unwrap();
  Release::new(&layout, name)
}

/// Write `content` to `relative` inside the release directory.
pub fn write_release_file(release: &Release, relative: &str, content: &str) -> PathBuf {
  let path = release.dir.join(relative);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(&path, content).unwrap();
  path
}
