//! Configuration management for photoop

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::ApiEndpoints;
use crate::error::{ConfigError, PersistenceError, Result};

/// Redirect target handed to the provider when none is configured
pub const DEFAULT_CALLBACK_URL: &str = "photoop://oauth-callback";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth consumer (application) key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_key: Option<String>,

    /// OAuth consumer (application) secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_secret: Option<String>,

    /// Override for every endpoint host (staging, tests)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Redirect URL registered for the OAuth handshake
    #[serde(default = "default_callback_url")]
    pub callback_url: String,

    /// Permission level requested during login
    #[serde(default)]
    pub permission: Permission,

    /// Directory holding the durable settings database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings_dir: Option<PathBuf>,

    /// Capacity of the in-memory object cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// Access level requested from the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    #[default]
    Write,
    Delete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Delete => "delete",
        }
    }
}

/// User preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

fn default_callback_url() -> String {
    DEFAULT_CALLBACK_URL.to_string()
}

fn default_cache_capacity() -> usize {
    256
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".photoop").join("config.yaml"))
    }

    /// Resolve the config path from an optional override
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an optional override path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // The file carries the consumer secret
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Validate that the application credentials are present
    pub fn validate_consumer(&self) -> Result<()> {
        match (&self.consumer_key, &self.consumer_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => Ok(()),
            _ => Err(ConfigError::MissingConsumerKey.into()),
        }
    }

    /// Directory for the durable settings database
    pub fn settings_dir(&self) -> Result<PathBuf> {
        match &self.settings_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let base = dirs::data_dir().ok_or(PersistenceError::NoHome)?;
                Ok(base.join("photoop"))
            }
        }
    }

    /// Endpoint set for this configuration
    pub fn endpoints(&self) -> ApiEndpoints {
        match &self.api_host {
            Some(host) => ApiEndpoints::with_host(host),
            None => ApiEndpoints::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consumer_key: None,
            consumer_secret: None,
            api_host: None,
            callback_url: default_callback_url(),
            permission: Permission::default(),
            settings_dir: None,
            cache_capacity: default_cache_capacity(),
            timeout_secs: default_timeout_secs(),
            preferences: Preferences::default(),
        }
    }
}
