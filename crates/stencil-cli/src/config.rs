//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. Environment variables: `STENCIL_GITHUB__TOKEN`, `STENCIL_REMOTE__MIRROR`, ...
//! 2. Config file: `--config <FILE>`, else `<config dir>/stencil/config.toml`
//! 3. Built-in defaults
//!
//! `github.token` additionally falls back to `GITHUB_TOKEN`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use stencil_adapters::fetcher::DEFAULT_API_URL;
use tracing::debug;

use crate::error::{CliError, CliResult};

const ENV_PREFIX: &str = "STENCIL";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub github: GithubConfig,
    pub remote: RemoteConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Base URL of the contents API.
    pub api_url: String,
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Serve `gh://` sources from this directory instead of the network.
    pub mirror: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration from defaults, file and environment.
    ///
    /// An explicit `config_file` must exist; the default location is optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let (path, required) = match config_file {
            Some(p) => (p.clone(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "loading configuration");

        let mut cfg = Self::build(&path, required)?;

        if cfg.github.token.is_none() {
            cfg.github.token = std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|t| !t.is_empty());
        }
        Ok(cfg)
    }

    fn build(path: &Path, required: bool) -> CliResult<Self> {
        let to_cli = |e: config::ConfigError| CliError::ConfigError {
            message: format!("Failed to load configuration from '{}'", path.display()),
            source: Some(Box::new(e)),
        };

        Config::builder()
            .set_default("github.api_url", DEFAULT_API_URL)
            .map_err(to_cli)?
            .set_default("output.no_color", false)
            .map_err(to_cli)?
            .add_source(File::from(path).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(to_cli)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `stencil.config.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stencil", "stencil")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("stencil.config.toml"))
    }
}
