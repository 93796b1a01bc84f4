//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.kaiju/config.toml` (user)
//! 3. `/etc/kaiju/config.toml` (system)
//!
//! The two connection values can also come from the environment, which takes
//! precedence over the file:
//! - `KAIJU_BOOTSTRAP_SERVERS`
//! - `KAIJU_CLIENT_ID`

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::admin::AdminConfig;
use crate::manager::RefreshConfig;
use crate::{KaijuError, Result};

/// Environment override for `cluster.bootstrap_servers`.
pub const BOOTSTRAP_SERVERS_ENV: &str = "KAIJU_BOOTSTRAP_SERVERS";
/// Environment override for `cluster.client_id`.
pub const CLIENT_ID_ENV: &str = "KAIJU_CLIENT_ID";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub refresh: RefreshSection,
}

/// Remote cluster connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// Comma-separated admin endpoints. Required.
    #[serde(default)]
    pub bootstrap_servers: String,
    /// Identifier sent to the cluster. Required.
    #[serde(default)]
    pub client_id: String,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: String::new(),
            client_id: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

/// Refresh loop tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshSection {
    /// Seconds between ticks (default: 60).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Seconds shutdown waits for an in-flight tick (default: 30).
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
    /// List internal resources too (default: true).
    #[serde(default = "default_include_internal")]
    pub include_internal: bool,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            include_internal: default_include_internal(),
        }
    }
}

fn default_interval() -> u64 {
    60
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_include_internal() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard locations, apply environment
    /// overrides and validate.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.kaiju/config.toml`
    /// 3. `/etc/kaiju/config.toml`
    ///
    /// Without an explicit path and with no file present, the environment
    /// alone may supply the required values.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a single TOML file without overrides or validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            KaijuError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            KaijuError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path; `None` when no file exists.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(KaijuError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".kaiju").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/kaiju/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Overwrite connection values from the environment when set and non-empty.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(servers) = non_empty(BOOTSTRAP_SERVERS_ENV) {
            self.cluster.bootstrap_servers = servers;
        }
        if let Some(client_id) = non_empty(CLIENT_ID_ENV) {
            self.cluster.client_id = client_id;
        }
    }

    /// Check that required values are present.
    pub fn validate(&self) -> Result<()> {
        if self.cluster.bootstrap_servers.trim().is_empty() {
            return Err(KaijuError::Configuration(format!(
                "cluster.bootstrap_servers is required (or set {BOOTSTRAP_SERVERS_ENV})"
            )));
        }
        if self.cluster.client_id.trim().is_empty() {
            return Err(KaijuError::Configuration(format!(
                "cluster.client_id is required (or set {CLIENT_ID_ENV})"
            )));
        }
        if self.refresh.interval_secs == 0 {
            return Err(KaijuError::Configuration(
                "refresh.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.cluster.request_timeout_secs == 0 {
            return Err(KaijuError::Configuration(
                "cluster.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Admin client settings.
    pub fn admin_config(&self) -> AdminConfig {
        AdminConfig::new(&self.cluster.bootstrap_servers, &self.cluster.client_id)
            .request_timeout(Duration::from_secs(self.cluster.request_timeout_secs))
    }

    /// Refresh loop settings.
    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig::new()
            .interval(Duration::from_secs(self.refresh.interval_secs))
            .shutdown_timeout(Duration::from_secs(self.refresh.shutdown_timeout_secs))
            .include_internal(self.refresh.include_internal)
    }
}
