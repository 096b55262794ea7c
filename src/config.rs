// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Policy for static files that exist on disk but must never be served
/// (template sources, data scripts, web server control files).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ForbiddenStaticConfig {
    #[serde(default = "default_forbidden_enabled")]
    pub enabled: bool,
    #[serde(default = "default_forbidden_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_forbidden_file_names")]
    pub file_names: Vec<String>,
}

impl Default for ForbiddenStaticConfig {
    fn default() -> Self {
        Self {
            enabled: default_forbidden_enabled(),
            extensions: default_forbidden_extensions(),
            file_names: default_forbidden_file_names(),
        }
    }
}

fn default_forbidden_enabled() -> bool {
    true
}

fn default_forbidden_extensions() -> Vec<String> {
    vec![".dt".to_string(), ".lua".to_string()]
}

fn default_forbidden_file_names() -> Vec<String> {
    vec![".htaccess".to_string()]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DocrootConfig {
    #[serde(default = "default_template_ext")]
    pub template_ext: String,
    #[serde(default = "default_script_ext")]
    pub script_ext: String,
    /// Locale codes the site is served under (e.g. ["en", "fr"]). Empty
    /// means the site is not locale-prefixed and no stripping happens.
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default)]
    pub ignore_locale_prefix: bool,
    /// The host may have appended a trailing slash to paths that originally
    /// had none; when set, resolution also tries the slash-trimmed variant.
    #[serde(default)]
    pub strip_appended_slash: bool,
    #[serde(default)]
    pub forbidden: ForbiddenStaticConfig,
    /// Re-raise data-script load errors instead of swallowing them.
    #[serde(default)]
    pub debug_scripts: bool,
}

impl Default for DocrootConfig {
    fn default() -> Self {
        Self {
            template_ext: default_template_ext(),
            script_ext: default_script_ext(),
            locales: Vec::new(),
            ignore_locale_prefix: false,
            strip_appended_slash: false,
            forbidden: ForbiddenStaticConfig::default(),
            debug_scripts: false,
        }
    }
}

fn default_template_ext() -> String {
    "dt".to_string()
}

fn default_script_ext() -> String {
    "lua".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BlogConfig {
    #[serde(default = "default_blog_enabled")]
    pub enabled: bool,
    #[serde(default = "default_blog_title")]
    pub title: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            enabled: default_blog_enabled(),
            title: default_blog_title(),
        }
    }
}

fn default_blog_enabled() -> bool {
    true
}

fn default_blog_title() -> String {
    "Blog".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub docroot: DocrootConfig,
    #[serde(default)]
    pub blog: BlogConfig,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub docroot: DocrootConfig,
    pub blog: BlogConfig,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Config = serde_yaml::from_str(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Loads and validates configuration at startup. If validation fails, the
    /// application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let config = Self::load(root)?;

        Self::validate_server(&config.server)?;
        Self::validate_logging(&config.logging)?;
        Self::validate_docroot(&config.docroot)?;

        Ok(ValidatedConfig {
            server: config.server,
            app: config.app,
            logging: config.logging,
            docroot: config.docroot,
            blog: config.blog,
        })
    }

    fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
        if server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host cannot be empty".to_string(),
            ));
        }
        if server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        match logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::ValidationError(format!(
                "logging.level must be one of trace/debug/info/warn/error, got: {}",
                other
            ))),
        }
    }

    fn validate_docroot(docroot: &DocrootConfig) -> Result<(), ConfigError> {
        for (label, ext) in [
            ("docroot.template_ext", &docroot.template_ext),
            ("docroot.script_ext", &docroot.script_ext),
        ] {
            if ext.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} cannot be empty",
                    label
                )));
            }
            if ext.contains('.') || ext.contains('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be a bare extension without dots or slashes, got: {}",
                    label, ext
                )));
            }
        }

        if docroot.template_ext == "html" {
            return Err(ConfigError::ValidationError(
                "docroot.template_ext cannot be 'html'; templates must use a distinct suffix"
                    .to_string(),
            ));
        }

        for locale in &docroot.locales {
            if locale.trim().is_empty() || locale.contains('/') {
                return Err(ConfigError::ValidationError(format!(
                    "docroot.locales entries must be bare locale codes, got: {:?}",
                    locale
                )));
            }
        }

        for ext in &docroot.forbidden.extensions {
            if !ext.starts_with('.') {
                return Err(ConfigError::ValidationError(format!(
                    "docroot.forbidden.extensions entries must start with '.', got: {}",
                    ext
                )));
            }
        }

        Ok(())
    }
}
