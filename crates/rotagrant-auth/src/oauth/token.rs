//! Token endpoint payloads.
//!
//! This module holds the request parameters the refresh grant reads and the
//! two response shapes it produces: a [`TokenResponse`] on success and a
//! [`TokenError`] on failure (RFC 6749 Sections 5.1 and 5.2). Serializing
//! them to JSON is left to the HTTP layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::AccessToken;

/// Token request parameters for `grant_type=refresh_token`.
///
/// Clients may authenticate with HTTP Basic auth (not in this struct) or
/// with `client_id` + `client_secret` in the body. Public clients send
/// neither.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type. Must be "refresh_token".
    pub grant_type: String,

    /// The refresh token being exchanged.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Requested scope; must be a subset of the original grant.
    #[serde(default)]
    pub scope: Option<String>,

    /// Client ID (for client_secret_post).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for client_secret_post).
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "2YotnFZFEjr1zCsicMWpAA",
///   "token_type": "Bearer",
///   "expires_in": 7200,
///   "scope": "read",
///   "refresh_token": "tGzv3JOkF0XG5Qx2TlKWIA",
///   "created_at": 1760860800
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Replacement refresh token, present when the refresh was rotated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Unix timestamp of token creation.
    pub created_at: i64,
}

impl TokenResponse {
    /// Creates a new token response with required fields.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64, scope: String, created_at: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            scope,
            refresh_token: None,
            created_at,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }

    /// Builds the response for a newly issued access token.
    #[must_use]
    pub fn from_access_token(token: &AccessToken) -> Self {
        let response = Self::new(
            token.token.clone(),
            token.expires_in,
            token.scopes.to_string(),
            token.created_at.unix_timestamp(),
        );

        match &token.refresh_token {
            Some(refresh) => response.with_refresh_token(refresh.clone()),
            None => response,
        }
    }
}

/// Token error response.
///
/// # Example Response
///
/// ```json
/// {
///   "error": "invalid_scope",
///   "error_description": "The requested scope is invalid, unknown, or malformed."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenError {
    /// OAuth 2.0 error code.
    pub error: TokenErrorCode,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// URI of a page with more information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

impl TokenError {
    /// Creates a new token error with description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
            error_uri: None,
        }
    }

    /// Creates a token error carrying the code's default description.
    #[must_use]
    pub fn from_code(error: TokenErrorCode) -> Self {
        Self::with_description(error, error.default_description())
    }

    /// Sets the error URI.
    #[must_use]
    pub fn with_error_uri(mut self, uri: impl Into<String>) -> Self {
        self.error_uri = Some(uri.into());
        self
    }

    /// Creates an unsupported_grant_type error.
    #[must_use]
    pub fn unsupported_grant_type(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::UnsupportedGrantType, description)
    }
}

/// OAuth 2.0 token error codes used by the refresh grant.
///
/// Defined in RFC 6749 Section 5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter or the refresh token is
    /// missing, expired, or revoked.
    InvalidRequest,

    /// Client credentials were supplied but client authentication failed.
    InvalidClient,

    /// The refresh token was issued to another client.
    InvalidGrant,

    /// The requested scope exceeds the scope granted by the resource owner.
    InvalidScope,

    /// The authorization grant type is not supported by this endpoint.
    UnsupportedGrantType,
}

impl TokenErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::InvalidScope => "invalid_scope",
            Self::UnsupportedGrantType => "unsupported_grant_type",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient => 401,
            Self::InvalidRequest
            | Self::InvalidGrant
            | Self::InvalidScope
            | Self::UnsupportedGrantType => 400,
        }
    }

    /// Returns the description used when none is supplied.
    #[must_use]
    pub fn default_description(&self) -> &'static str {
        match self {
            Self::InvalidRequest => {
                "The request is missing a required parameter, includes an unsupported parameter value, or is otherwise malformed."
            }
            Self::InvalidClient => {
                "Client authentication failed due to unknown client, no client authentication included, or unsupported authentication method."
            }
            Self::InvalidGrant => {
                "The provided authorization grant is invalid, expired, revoked, or was issued to another client."
            }
            Self::InvalidScope => "The requested scope is invalid, unknown, or malformed.",
            Self::UnsupportedGrantType => {
                "The authorization grant type is not supported by the authorization server."
            }
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a refresh token grant, ready for the HTTP layer.
///
/// Serializes to the bare success or error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GrantResponse {
    /// A new access token was issued.
    Token(TokenResponse),
    /// The request was rejected.
    Error(TokenError),
}

impl GrantResponse {
    /// Returns `true` if a token was issued.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Token(_))
    }

    /// Returns the HTTP status code for this response.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Token(_) => 200,
            Self::Error(error) => error.error.http_status(),
        }
    }

    /// Returns the error code, if this is an error response.
    #[must_use]
    pub fn error_code(&self) -> Option<TokenErrorCode> {
        match self {
            Self::Token(_) => None,
            Self::Error(error) => Some(error.error),
        }
    }

    /// Returns the token response, if a token was issued.
    #[must_use]
    pub fn token(&self) -> Option<&TokenResponse> {
        match self {
            Self::Token(token) => Some(token),
            Self::Error(_) => None,
        }
    }
}

impl From<TokenResponse> for GrantResponse {
    fn from(response: TokenResponse) -> Self {
        Self::Token(response)
    }
}

impl From<TokenError> for GrantResponse {
    fn from(error: TokenError) -> Self {
        Self::Error(error)
    }
}
