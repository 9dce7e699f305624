//! Configuration file support for gitpulse.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GITPULSE_`, e.g., `GITPULSE_GITHUB_TOKEN`)
//! 3. Config file (~/.config/gitpulse/config.toml or ./gitpulse.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use GITPULSE_GITHUB_TOKEN env var
//! api_url = "https://api.github.com"
//! timeout_secs = 60
//! max_concurrency = 16  # omit for unbounded
//! activity_score = false
//!
//! [server]
//! bind = "127.0.0.1:8000"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use gitpulse::ServiceOptions;
use gitpulse::github::GITHUB_API_BASE;
use serde::Deserialize;

/// Address `gitpulse serve` listens on unless configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Default access token, used when a request carries none.
    /// Can also be set via GITPULSE_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// API root. Point at `https://<host>/api/v3` for GitHub Enterprise.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum concurrent per-repository fetches.
    pub max_concurrency: Option<usize>,
    /// Include the recency activity score in aggregate metrics.
    pub activity_score: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: GITHUB_API_BASE.to_string(),
            timeout_secs: 60,
            max_concurrency: None,
            activity_score: false,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/gitpulse/config.toml)
    /// 3. Local config file (./gitpulse.toml)
    /// 4. Environment variables with GITPULSE_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("gitpulse.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./gitpulse.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., GITPULSE_GITHUB_TOKEN -> github.token
        builder = builder.add_source(env_source());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gitpulse").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default GitHub token, ignoring blank values.
    pub fn github_token(&self) -> Option<&str> {
        self.github
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Build service options from this configuration.
    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            api_base: self.github.api_url.clone(),
            timeout: Duration::from_secs(self.github.timeout_secs),
            max_concurrency: self.github.max_concurrency.filter(|n| *n > 0),
            activity_score: self.github.activity_score,
        }
    }
}

/// `GITPULSE_` environment source.
///
/// Every underscore after the prefix is a nesting separator, so only
/// single-word keys (`GITPULSE_GITHUB_TOKEN`, `GITPULSE_SERVER_BIND`) are
/// reachable from the environment. Multi-word keys go in a config file or
/// on the command line.
fn env_source() -> Environment {
    Environment::with_prefix("GITPULSE")
        .separator("_")
        .try_parsing(true)
}
