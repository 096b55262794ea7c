// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::config::{Config, ConfigError, ValidatedConfig};
use crate::runtime_paths::RuntimePaths;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 7080;
const DEFAULT_WORKERS: u16 = 4;

#[derive(Debug)]
pub enum BootstrapError {
    Io(io::Error),
    Config(ConfigError),
}

impl std::fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootstrapError::Io(err) => write!(f, "{}", err),
            BootstrapError::Config(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BootstrapError {}

impl From<io::Error> for BootstrapError {
    fn from(err: io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

pub struct BootstrapResult {
    pub validated_config: ValidatedConfig,
    pub runtime_paths: RuntimePaths,
    pub created_config: bool,
}

/// Prepares a runtime root for serving: seeds a default config on first run,
/// validates it, and creates the canonical directory layout.
pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, BootstrapError> {
    let created_config = ensure_config(root)?;
    let validated_config = Config::load_and_validate(root)?;
    let runtime_paths = RuntimePaths::from_root(root)?;

    Ok(BootstrapResult {
        validated_config,
        runtime_paths,
        created_config,
    })
}

pub fn ensure_config(root: &Path) -> Result<bool, BootstrapError> {
    let root_path = normalize_root(root)?;
    let config_path = root_path.join("config.yaml");

    if config_path.exists() {
        return Ok(false);
    }

    let contents = default_config_yaml();

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };

    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    log_action(format!("created config.yaml (http {})", DEFAULT_PORT));

    Ok(true)
}

fn normalize_root(root: &Path) -> Result<PathBuf, BootstrapError> {
    let root_path = if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root.to_path_buf()
    };

    if root_path.exists() {
        if !root_path.is_dir() {
            return Err(BootstrapError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Runtime root is not a directory: {}", root_path.display()),
            )));
        }
        return Ok(root_path);
    }

    fs::create_dir_all(&root_path)?;
    log_action(format!(
        "created runtime root directory {}",
        root_path.display()
    ));
    Ok(root_path)
}

fn log_action(message: String) {
    eprintln!("[bootstrap] {}", message);
}

fn default_config_yaml() -> String {
    format!(
        "server:\n  host: \"0.0.0.0\"\n  port: {port}\n  workers: {workers}\n\napp:\n  name: \"Docroot\"\n  description: \"A file-based web content management system\"\n\nlogging:\n  level: \"info\"\n\ndocroot:\n  template_ext: \"dt\"\n  script_ext: \"lua\"\n  locales: []\n  ignore_locale_prefix: false\n  strip_appended_slash: false\n  debug_scripts: false\n  forbidden:\n    enabled: true\n    extensions: [\".dt\", \".lua\"]\n    file_names: [\".htaccess\"]\n\nblog:\n  enabled: true\n  title: \"Blog\"\n",
        port = DEFAULT_PORT,
        workers = DEFAULT_WORKERS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_contains_expected_port() {
        let yaml = default_config_yaml();
        assert!(yaml.contains("port: 7080"));
    }

    #[test]
    fn bootstrap_seeds_and_validates_config() {
        let dir = tempfile::tempdir().unwrap();
        let result = bootstrap_runtime(dir.path()).expect("bootstrap");
        assert!(result.created_config);
        assert_eq!(result.validated_config.docroot.template_ext, "dt");
        assert!(result.runtime_paths.docroot_dir.is_dir());

        // Second run must leave the existing config untouched.
        let result = bootstrap_runtime(dir.path()).expect("bootstrap again");
        assert!(!result.created_config);
    }
}
