//! Refresh token storage collaborator.
//!
//! # Security Considerations
//!
//! - Tokens are stored as SHA-256 hashes only
//! - Revocation must be durable and immediately visible to concurrent
//!   lookups, otherwise a token could be exchanged twice

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::RefreshToken;

/// Storage trait for refresh tokens.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Finds a refresh token by its hash.
    ///
    /// Returns tokens regardless of expiration/revocation status; the grant
    /// checks those itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Revokes a refresh token if it is not revoked yet.
    ///
    /// Sets the `revoked_at` timestamp to the current time only when the
    /// stored record is still unrevoked, as a single compare-and-set. Once
    /// this returns, any lookup of the token must observe it as revoked.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if this call revoked the token
    /// - `Ok(false)` if the stored record was already revoked, for example
    ///   by a concurrent exchange of the same token
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not found or the operation fails.
    async fn revoke(&self, token: &RefreshToken) -> AuthResult<bool>;
}
