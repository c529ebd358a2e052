//! Client credentials presented at the token endpoint.
//!
//! Credentials can arrive in two places (RFC 6749 Section 2.3.1):
//!
//! - `Authorization: Basic base64(client_id:client_secret)` header
//! - `client_id` and `client_secret` request body parameters
//!
//! The header takes precedence. A pair with a blank id or secret counts as
//! no credentials at all, which lets public clients refresh without
//! re-presenting a secret.

use std::fmt;

/// A `client_id`/`client_secret` pair.
///
/// Never persisted. The secret is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth client identifier.
    pub client_id: String,

    /// Plaintext client secret.
    pub client_secret: String,
}

impl Credentials {
    /// Creates credentials, returning `None` if either part is blank.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Option<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return None;
        }

        Some(Self {
            client_id,
            client_secret,
        })
    }

    /// Parses an HTTP Basic `Authorization` header value.
    ///
    /// Returns `None` for other schemes, malformed base64, non-UTF-8
    /// payloads, a missing colon, or blank parts.
    #[must_use]
    pub fn from_basic_auth(header_value: &str) -> Option<Self> {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;

        let encoded = header_value.trim().strip_prefix("Basic ")?;
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;

        // Split on first colon (secret may contain colons)
        let (client_id, client_secret) = decoded.split_once(':')?;

        Self::new(client_id, client_secret)
    }

    /// Builds credentials from `client_id`/`client_secret` body parameters.
    #[must_use]
    pub fn from_params(client_id: Option<&str>, client_secret: Option<&str>) -> Option<Self> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Self::new(id, secret),
            _ => None,
        }
    }

    /// Extracts credentials from a token request.
    ///
    /// The Basic header wins over body parameters when both yield a pair.
    #[must_use]
    pub fn from_request(
        authorization_header: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> Option<Self> {
        authorization_header
            .and_then(Self::from_basic_auth)
            .or_else(|| Self::from_params(client_id, client_secret))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}
