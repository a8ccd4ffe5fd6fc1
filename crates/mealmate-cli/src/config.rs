//! Configuration file management for mealmate.
//!
//! Provides a TOML-based config file at `~/.config/mealmate/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mealmate_api::GatewayConfig;
use mealmate_api::token::{config_dir, default_token_path};
use mealmate_core::NotificationCenter;

pub const API_URL_ENV: &str = "MEALMATE_API_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "MEALMATE_REQUEST_TIMEOUT_SECS";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub notifications: NotificationSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientSection {
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_timeout_secs: Option<u64>,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            api_url: GatewayConfig::DEFAULT_URL.to_string(),
            request_timeout_secs: None,
            suggestion_timeout_secs: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationSection {
    /// Seconds a notification stays visible.
    pub ttl_secs: u64,
}

impl Default for NotificationSection {
    fn default() -> Self {
        Self {
            ttl_secs: NotificationCenter::DEFAULT_TTL.as_secs(),
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the path to the mealmate config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`. A missing file is `Ok(None)`;
/// an unreadable or invalid one is an error.
pub fn load_config_from(path: &Path) -> Result<Option<ConfigFile>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read config file at {}", path.display()));
        }
    };
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

pub fn load_config() -> Result<Option<ConfigFile>> {
    load_config_from(&config_path())
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(&config_path(), config)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct MealmateConfig {
    pub gateway: GatewayConfig,
    pub notification_ttl: Duration,
    pub token_path: PathBuf,
}

impl MealmateConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API URL: `cli_api_url` > `MEALMATE_API_URL` > `client.api_url` > `GatewayConfig::DEFAULT_URL`
    /// - Request timeout: `MEALMATE_REQUEST_TIMEOUT_SECS` > `client.request_timeout_secs` > 5 s
    pub fn resolve(cli_api_url: Option<&str>) -> Result<Self> {
        let file_config = load_config()?;
        Self::resolve_with(cli_api_url, file_config)
    }

    fn resolve_with(cli_api_url: Option<&str>, file_config: Option<ConfigFile>) -> Result<Self> {
        let file_config = file_config.unwrap_or_default();

        let api_url = if let Some(url) = cli_api_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(API_URL_ENV) {
            url
        } else {
            file_config.client.api_url.clone()
        };
        let mut gateway = GatewayConfig::new(api_url);

        let request_timeout = match std::env::var(REQUEST_TIMEOUT_ENV) {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{REQUEST_TIMEOUT_ENV} is not a number of seconds: {raw:?}"))?,
            ),
            Err(_) => file_config.client.request_timeout_secs,
        };
        if let Some(secs) = request_timeout {
            gateway = gateway.with_request_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = file_config.client.suggestion_timeout_secs {
            gateway = gateway.with_suggestion_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            gateway,
            notification_ttl: Duration::from_secs(file_config.notifications.ttl_secs),
            token_path: default_token_path(),
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
