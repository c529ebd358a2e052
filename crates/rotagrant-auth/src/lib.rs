//! # rotagrant-auth
//!
//! OAuth 2.0 refresh token grant (RFC 6749 Section 6) with token rotation.
//!
//! A client presents a refresh token (and optionally its credentials and a
//! narrower scope). If the request passes validation, the presented refresh
//! token is revoked and a new access token, carrying a new refresh token, is
//! issued in its place.
//!
//! ## Modules
//!
//! - [`config`] - Grant configuration
//! - [`error`] - Error types
//! - [`oauth`] - Scopes, validation, the grant and its response types
//! - [`storage`] - Collaborator traits implemented by the server
//! - [`types`] - Clients, credentials and token records

pub mod config;
pub mod error;
pub mod oauth;
pub mod storage;
pub mod types;

pub use config::{AuthConfig, ConfigError, OAuthConfig, ServerConfig};
pub use error::{AuthError, ErrorCategory};
pub use oauth::{
    GrantResponse, GrantState, RefreshGrant, RefreshTokenRequest, ScopeSet, TokenError,
    TokenErrorCode, TokenRequest, TokenResponse, ValidationError,
};
pub use storage::{AccessTokenFactory, ClientAuthenticator, RefreshTokenStorage};
pub use types::{AccessToken, Client, Credentials, NewAccessToken, RefreshToken};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use rotagrant_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError, OAuthConfig, ServerConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::oauth::{
        GrantResponse, GrantState, RefreshGrant, RefreshTokenRequest, ScopeSet, TokenError,
        TokenErrorCode, TokenRequest, TokenResponse, ValidationError,
    };
    pub use crate::storage::{AccessTokenFactory, ClientAuthenticator, RefreshTokenStorage};
    pub use crate::types::{AccessToken, Client, Credentials, NewAccessToken, RefreshToken};
}
