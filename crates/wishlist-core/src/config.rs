//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/wishlist/config.toml)
//! 3. Environment variables (WISHLIST_* prefix)
//!
//! Environment variables take precedence over config file values.
//!
//! Remote sync is active only when it is enabled and both the gist token
//! and gist id are set to non-empty values; otherwise the store runs in
//! local-only mode.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "WISHLIST";

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_GIST_FILENAME: &str = "wishlist-data.json";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the local cache
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Credential for the remote document backend
    #[serde(default)]
    pub gist_token: Option<String>,

    /// Identifier of the remote document
    #[serde(default)]
    pub gist_id: Option<String>,

    /// Master switch for remote sync
    #[serde(default = "default_true")]
    pub remote_enabled: bool,

    /// Base URL of the remote backend API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// File inside the gist that holds the document
    #[serde(default = "default_gist_filename")]
    pub gist_filename: String,

    /// Per-request timeout for remote calls, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log file path (default: stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Resolved settings for talking to the remote document backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub api_url: String,
    pub gist_id: String,
    pub token: String,
    pub filename: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            gist_token: None,
            gist_id: None,
            remote_enabled: true,
            api_url: default_api_url(),
            gist_filename: default_gist_filename(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (WISHLIST_DATA_DIR, WISHLIST_GIST_TOKEN, ...)
    /// 2. Config file (~/.config/wishlist/config.toml or WISHLIST_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the CLI
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            config.apply_env_overrides();
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::load_from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from TOML text, then apply environment overrides
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_GIST_TOKEN", ENV_PREFIX)) {
            self.gist_token = non_empty(val);
        }

        if let Ok(val) = std::env::var(format!("{}_GIST_ID", ENV_PREFIX)) {
            self.gist_id = non_empty(val);
        }

        if let Ok(val) = std::env::var(format!("{}_REMOTE_ENABLED", ENV_PREFIX)) {
            self.remote_enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        // Unparseable values keep the configured timeout
        if let Ok(val) = std::env::var(format!("{}_TIMEOUT_SECS", ENV_PREFIX)) {
            if let Ok(secs) = val.parse() {
                self.timeout_secs = secs;
            }
        }
    }

    /// Remote settings, or `None` when running local-only
    pub fn remote(&self) -> Option<RemoteConfig> {
        if !self.remote_enabled {
            return None;
        }

        let token = self.gist_token.as_deref().map(str::trim).unwrap_or("");
        let gist_id = self.gist_id.as_deref().map(str::trim).unwrap_or("");
        if token.is_empty() || gist_id.is_empty() {
            return None;
        }

        Some(RemoteConfig {
            api_url: self.api_url.clone(),
            gist_id: gist_id.to_string(),
            token: token.to_string(),
            filename: self.gist_filename.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        })
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with WISHLIST_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wishlist")
            .join("config.toml")
    }
}

fn non_empty(val: String) -> Option<String> {
    if val.trim().is_empty() {
        None
    } else {
        Some(val)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wishlist")
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_gist_filename() -> String {
    DEFAULT_GIST_FILENAME.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
