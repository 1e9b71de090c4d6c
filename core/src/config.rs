//! Client configuration: OAuth credentials, vendor base URLs and transport
//! settings.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::pkce::DEFAULT_VERIFIER_LEN;

pub const DEFAULT_REDIRECT_URI: &str = "https://localhost:5001/";
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://auth.dodois.io/connect";
pub const DEFAULT_AUTH_BASE_URL: &str = "https://api.dodois.io/auth";
pub const DEFAULT_API_BASE_URL: &str = "https://api.dodois.io/dodopizza/ru";
pub const DEFAULT_MARKETPLACE_BASE_URL: &str = "https://api.dodois.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

const API_HOST: &str = "https://api.dodois.io";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything `DodoIsApi` needs to talk to DodoIS.
///
/// Deserializable so it can live in an application's config file; omitted
/// fields take the production defaults.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct DodoIsConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_marketplace_base_url")]
    pub marketplace_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_pkce_verifier_length")]
    pub pkce_verifier_length: usize,
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

fn default_oauth_base_url() -> String {
    DEFAULT_OAUTH_BASE_URL.to_string()
}

fn default_auth_base_url() -> String {
    DEFAULT_AUTH_BASE_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_marketplace_base_url() -> String {
    DEFAULT_MARKETPLACE_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_pkce_verifier_length() -> usize {
    DEFAULT_VERIFIER_LEN
}

impl std::fmt::Debug for DodoIsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DodoIsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("oauth_base_url", &self.oauth_base_url)
            .field("auth_base_url", &self.auth_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("marketplace_base_url", &self.marketplace_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("pkce_verifier_length", &self.pkce_verifier_length)
            .finish()
    }
}

impl DodoIsConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: default_redirect_uri(),
            oauth_base_url: default_oauth_base_url(),
            auth_base_url: default_auth_base_url(),
            api_base_url: default_api_base_url(),
            marketplace_base_url: default_marketplace_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            pkce_verifier_length: DEFAULT_VERIFIER_LEN,
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Point the core API at another brand/country, e.g. `drinkit`/`kz`.
    pub fn with_api_region(mut self, brand: &str, country: &str) -> Self {
        self.api_base_url = format!("{API_HOST}/{brand}/{country}");
        self
    }

    /// Serve every section from one host, keeping the production path
    /// layout. Used for proxies and local stand-ins.
    pub fn with_host(mut self, host: &str) -> Self {
        let host = host.trim_end_matches('/');
        self.oauth_base_url = format!("{host}/connect");
        self.auth_base_url = format!("{host}/auth");
        self.api_base_url = format!("{host}/dodopizza/ru");
        self.marketplace_base_url = host.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read `DODOIS_CLIENT_ID` and `DODOIS_CLIENT_SECRET`, plus the optional
    /// `DODOIS_REDIRECT_URI`, `DODOIS_HOST` and `DODOIS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let mut config = Self::new(required("DODOIS_CLIENT_ID")?, required("DODOIS_CLIENT_SECRET")?);
        if let Some(redirect_uri) = lookup("DODOIS_REDIRECT_URI") {
            config = config.with_redirect_uri(redirect_uri);
        }
        if let Some(host) = lookup("DODOIS_HOST") {
            config = config.with_host(&host);
        }
        if let Some(raw) = lookup("DODOIS_TIMEOUT_SECS") {
            config.timeout_secs = raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "DODOIS_TIMEOUT_SECS",
                reason: e.to_string(),
            })?;
        }
        Ok(config)
    }
}
