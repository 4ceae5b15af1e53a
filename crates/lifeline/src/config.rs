//! Configuration management for lifeline.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "lifeline";

/// Environment variable prefix; sections are separated by `__`,
/// e.g. `LIFELINE_STORE__PASSWORD`.
const ENV_PREFIX: &str = "LIFELINE_";

/// Placeholder shown in place of secret values.
const REDACTED: &str = "<redacted>";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LIFELINE_`)
/// 2. TOML config file at `~/.config/lifeline/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Network capability provider configuration.
    pub provider: ProviderConfig,
    /// Document store configuration.
    pub store: StoreConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub host: String,
    /// Port to bind the HTTP listener to.
    pub port: u16,
}

/// Network capability provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the network capability API.
    pub base_url: String,
    /// API token for the provider. Requests are sent without
    /// authentication when unset.
    pub token: Option<String>,
    /// Device queried when a request names no phone number.
    pub default_phone_number: String,
    /// Callback URL handed to the provider when creating QoD sessions.
    pub notification_url: String,
    /// Auth token the provider presents on notification callbacks.
    pub notification_auth_token: String,
}

/// Document store configuration.
///
/// Username, password, and cluster are required before the store can be
/// reached; the service refuses to start without them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store username.
    pub username: String,
    /// Store password.
    pub password: String,
    /// Cluster address, e.g. `cluster0.example.mongodb.net`.
    pub cluster: String,
    /// Database name.
    pub database: String,
}

/// Which configuration variables are set, as presence booleans.
///
/// This is the only view of the configuration that may leave the process:
/// it carries no values, so it is safe to expose on diagnostics surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigPresence {
    /// Whether a provider API token is configured.
    pub provider_token: bool,
    /// Whether a store username is configured.
    pub store_username: bool,
    /// Whether a store password is configured.
    pub store_password: bool,
    /// Whether a store cluster address is configured.
    pub store_cluster: bool,
    /// Whether a store database name is configured.
    pub store_database: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://network-as-code.p-eu.rapidapi.com".to_string(),
            token: None,
            default_phone_number: "+999999301000".to_string(),
            notification_url: "https://example.com/notifications".to_string(),
            notification_auth_token: "your-auth-token".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            cluster: String::new(),
            database: "mydatabase".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `LIFELINE_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// Store credentials are deliberately not checked here; they are only
    /// required once something actually reaches for the store, via
    /// [`StoreConfig::require_credentials`].
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::validation("server.port must be greater than 0"));
        }

        if self.provider.base_url.is_empty() {
            return Err(Error::validation("provider.base_url must not be empty"));
        }

        if !self.provider.base_url.starts_with("http") {
            return Err(Error::validation(format!(
                "provider.base_url must be an http(s) URL, got {}",
                self.provider.base_url
            )));
        }

        if self.provider.default_phone_number.is_empty() {
            return Err(Error::validation(
                "provider.default_phone_number must not be empty",
            ));
        }

        Ok(())
    }

    /// Snapshot which configuration variables are set.
    #[must_use]
    pub fn presence(&self) -> ConfigPresence {
        ConfigPresence {
            provider_token: self.provider.token.as_ref().is_some_and(|t| !t.is_empty()),
            store_username: !self.store.username.is_empty(),
            store_password: !self.store.password.is_empty(),
            store_cluster: !self.store.cluster.is_empty(),
            store_database: !self.store.database.is_empty(),
        }
    }

    /// A copy of the configuration with secret values replaced, suitable
    /// for printing.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.provider.token.as_ref().is_some_and(|t| !t.is_empty()) {
            copy.provider.token = Some(REDACTED.to_string());
        }
        if !copy.store.password.is_empty() {
            copy.store.password = REDACTED.to_string();
        }
        if !copy.provider.notification_auth_token.is_empty() {
            copy.provider.notification_auth_token = REDACTED.to_string();
        }
        copy
    }
}

impl ServerConfig {
    /// The address the HTTP listener binds to, as `host:port`.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    /// Require that all store credentials are present.
    ///
    /// # Errors
    ///
    /// Returns an error naming every missing credential.
    pub fn require_credentials(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.username.is_empty() {
            missing.push("store.username");
        }
        if self.password.is_empty() {
            missing.push("store.password");
        }
        if self.cluster.is_empty() {
            missing.push("store.cluster");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "store credentials are not set: {}",
                missing.join(", ")
            )))
        }
    }

    /// The store connection string. Credentials are supplied separately,
    /// never embedded in the URI.
    #[must_use]
    pub fn connection_string(&self) -> String {
        format!(
            "mongodb+srv://{}/?retryWrites=true&w=majority",
            self.cluster
        )
    }
}
