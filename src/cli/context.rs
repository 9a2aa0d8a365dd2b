//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, settings storage, session restore and client setup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::{GlobalOptions, OutputFormat};
use photoop::auth::{AuthorizationService, ConsumerKey, Credential, CredentialProvider, OAuth1Handshake};
use photoop::client::NetworkClient;
use photoop::config::Config;
use photoop::error::{AuthError, ConfigError, Result};
use photoop::store::SettingsStore;

/// Shared state for one command invocation.
///
/// - Loaded configuration with CLI overrides applied
/// - Durable settings store
/// - Authorization service with any persisted session restored
/// - Network client signing with that session
pub struct CommandContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub format: OutputFormat,
    pub store: Arc<SettingsStore>,
    pub auth: Arc<AuthorizationService>,
    pub client: Arc<NetworkClient>,
}

impl CommandContext {
    /// Load config and build every collaborator.
    ///
    /// # Errors
    /// Fails if the config is missing, lacks consumer credentials, or the
    /// settings store cannot be opened.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config_path = Config::resolve_path(opts.config_ref())?;
        let config = load_config(opts)?;
        config.validate_consumer()?;

        let consumer = consumer_key(&config)?;
        let endpoints = config.endpoints();
        let timeout = Duration::from_secs(config.timeout_secs);

        let store = Arc::new(SettingsStore::open_in(&config.settings_dir()?)?);
        let handshake = OAuth1Handshake::new(
            consumer.clone(),
            endpoints.clone(),
            config.callback_url.clone(),
            config.permission,
            timeout,
        )?;
        let auth = Arc::new(AuthorizationService::new(
            Arc::new(handshake),
            Arc::clone(&store),
            endpoints.signup.clone(),
        ));

        let credentials: Arc<dyn CredentialProvider> = auth.clone();
        let client = Arc::new(NetworkClient::new(consumer, endpoints, credentials, timeout)?);

        Ok(Self {
            format: resolve_format(opts, &config),
            config,
            config_path,
            store,
            auth,
            client,
        })
    }

    /// Current credential, or an error telling the user to log in
    pub fn require_login(&self) -> Result<Credential> {
        self.auth
            .credential()
            .ok_or_else(|| AuthError::NotLoggedIn.into())
    }
}

/// Load config from the resolved path and apply the `--api-host` override
pub fn load_config(opts: &GlobalOptions) -> Result<Config> {
    let mut config = Config::load_at(opts.config_ref())?;
    if let Some(host) = opts.api_host_ref() {
        config.api_host = Some(host.to_string());
    }
    Ok(config)
}

fn consumer_key(config: &Config) -> Result<ConsumerKey> {
    match (&config.consumer_key, &config.consumer_secret) {
        (Some(key), Some(secret)) => Ok(ConsumerKey::new(key, secret)),
        _ => Err(ConfigError::MissingConsumerKey.into()),
    }
}

/// `--format` wins, then the config preference, then table
pub fn resolve_format(opts: &GlobalOptions, config: &Config) -> OutputFormat {
    opts.format
        .or_else(|| {
            config
                .preferences
                .format
                .as_deref()
                .and_then(OutputFormat::from_preference)
        })
        .unwrap_or_default()
}
