//! Webman configuration loading
//!
//! Loads configuration from `~/.config/ledc/webman.toml` (or `LEDC_WEBMAN_CONFIG` env).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, WebmanError};
use crate::upload::FORBIDDEN_EXTENSIONS;

/// Root configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WebmanConfig {
    /// Debug mode reveals error messages and traces in responses
    #[serde(default)]
    pub debug: bool,

    /// Upload settings
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Upload configuration
#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Directory uploads are stored under
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Path below `base_dir`; a `YYYYMMDD` directory is appended per day
    #[serde(default = "default_relative_dir_prefix")]
    pub relative_dir_prefix: String,

    /// URL prefix for stored files
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,

    /// Accepted extensions; empty accepts anything not forbidden
    #[serde(default = "default_accept_extensions")]
    pub accept_extensions: Vec<String>,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("plugin/admin/public")
}

fn default_relative_dir_prefix() -> String {
    "upload/files".to_string()
}

fn default_url_prefix() -> String {
    "/app/admin/".to_string()
}

fn default_accept_extensions() -> Vec<String> {
    ["jpg", "jpeg", "gif", "png"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            relative_dir_prefix: default_relative_dir_prefix(),
            url_prefix: default_url_prefix(),
            accept_extensions: default_accept_extensions(),
        }
    }
}

impl WebmanConfig {
    /// Environment variable for config path override
    pub const ENV_CONFIG_PATH: &'static str = "LEDC_WEBMAN_CONFIG";

    /// Default config filename
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "webman.toml";

    /// Load configuration from file
    ///
    /// Resolution order:
    /// 1. `LEDC_WEBMAN_CONFIG` environment variable
    /// 2. `~/.config/ledc/webman.toml`
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::resolve_config_path();

        if !path.exists() {
            tracing::info!(
                path = %path.display(),
                "webman config not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WebmanError::config_with_source(
                format!("failed to read config at {}", path.display()),
                e,
            )
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let mut cfg: WebmanConfig = toml::from_str(contents)
            .map_err(|e| WebmanError::config_with_source("failed to parse config", e))?;

        cfg.normalize()?;
        Ok(cfg)
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("ledc")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    fn normalize(&mut self) -> Result<()> {
        let upload = &mut self.upload;

        for ext in &mut upload.accept_extensions {
            *ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        }
        if upload.accept_extensions.iter().any(String::is_empty) {
            return Err(WebmanError::config(
                "upload.accept_extensions must not contain empty entries",
            ));
        }

        // Forbidden extensions are rejected regardless of the accept list.
        for ext in &upload.accept_extensions {
            if FORBIDDEN_EXTENSIONS.contains(&ext.as_str()) {
                tracing::warn!(
                    extension = %ext,
                    "forbidden extension in upload.accept_extensions will still be rejected"
                );
            }
        }

        Ok(())
    }
}
