use std::fs;
use std::path::{Path, PathBuf};

use dbtools_lib::config::{ConfigFile, ConfigOverrides, DbtConfig};
use dbtools_lib::layout::{Layout, make_missing_dirs};
use tempfile::TempDir;

/// A scaffolded base directory with a resolved config.
pub struct Project {
  pub temp: TempDir,
  pub config: DbtConfig,
}

impl Project {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let config = DbtConfig::resolve(
      ConfigOverrides {
        base_dir: Some(temp.path().to_path_buf()),
        ..Default::default()
      },
      ConfigFile::default(),
    )
    .unwrap();
    make_missing_dirs(&config.layout(), "shop", "sales").unwrap();
    Self { temp, config }
  }

  pub fn layout(&self) -> Layout {
    self.config.layout()
  }

  pub fn write(&self, release: &str, relative: &str, content: &str) -> PathBuf {
    let path = self.layout().release_dir(release).join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
  }

  #[cfg(unix)]
  pub fn script(&self, release: &str, relative: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = self.write(release, relative, &format!("#!/bin/sh\n{}", body));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  pub fn out(&self) -> &Path {
    self.temp.path()
  }
}
