//! Refresh grant configuration.
//!
//! The grant itself only needs an access token lifetime, exposed through the
//! [`ServerConfig`] trait. [`AuthConfig`] is the deserializable form that a
//! server loads from its configuration file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server settings consulted while rotating a refresh token.
///
/// Implemented by [`OAuthConfig`]; callers embedding the grant into a larger
/// server can implement it on their own configuration type instead.
pub trait ServerConfig: Send + Sync {
    /// Lifetime of access tokens issued by the grant.
    fn access_token_lifetime(&self) -> Duration;

    /// Lifetime of access tokens in whole seconds.
    fn access_token_lifetime_seconds(&self) -> u64 {
        self.access_token_lifetime().as_secs()
    }

    /// URI of a human-readable page describing token endpoint errors.
    fn error_uri(&self) -> Option<&str> {
        None
    }
}

/// Root configuration.
///
/// # Example (TOML)
///
/// ```toml
/// issuer = "https://auth.example.com"
///
/// [oauth]
/// access_token_lifetime = "2h"
/// error_uri = "https://auth.example.com/docs/errors"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Authorization server issuer URL.
    pub issuer: String,

    /// OAuth 2.0 token settings.
    pub oauth: OAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            oauth: OAuthConfig::default(),
        }
    }
}

/// OAuth 2.0 token settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Optional `error_uri` attached to token error responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(2 * 3600), // 2 hours
            error_uri: None,
        }
    }
}

impl ServerConfig for OAuthConfig {
    fn access_token_lifetime(&self) -> Duration {
        self.access_token_lifetime
    }

    fn error_uri(&self) -> Option<&str> {
        self.error_uri.as_deref()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl AuthConfig {
    /// Parses and validates a TOML configuration document.
    ///
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document is not valid TOML for
    /// this structure, or any error reported by [`AuthConfig::validate`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the issuer is empty and
    /// `ConfigError::InvalidValue` if the access token lifetime is shorter
    /// than one second or the error URI is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Missing("issuer".to_string()));
        }

        if self.oauth.access_token_lifetime.as_secs() == 0 {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be at least 1s".to_string(),
            ));
        }

        if let Some(uri) = &self.oauth.error_uri
            && uri.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue(
                "error_uri cannot be blank".to_string(),
            ));
        }

        Ok(())
    }
}
