//! Access token issuance collaborator.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{AccessToken, NewAccessToken};

/// Mints and persists access tokens.
///
/// [`AccessToken::mint`] generates token values for a request; implementors
/// usually call it and then store the result.
#[async_trait]
pub trait AccessTokenFactory: Send + Sync {
    /// Creates an access token with the requested fields.
    ///
    /// When `request.issues_refresh_token` is set, the returned token must
    /// carry a new refresh token value and the matching refresh token
    /// record must be stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted.
    async fn create(&self, request: &NewAccessToken) -> AuthResult<AccessToken>;
}
