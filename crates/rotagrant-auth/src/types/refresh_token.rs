//! Refresh token record.
//!
//! # Security
//!
//! - Only the SHA-256 of a token value is kept
//! - A revoked token can never be exchanged again

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::oauth::scope::ScopeSet;
use crate::types::client::{ApplicationId, ResourceOwnerId};

/// Refresh token as loaded from storage.
///
/// The plaintext value is handed to the client once and never stored. To
/// find the record for a presented token:
///
/// 1. Hash the incoming token with [`RefreshToken::hash_token`]
/// 2. Look up by hash
/// 3. Let the grant check revocation and expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// Record id, reported when a rotation fails part way.
    pub id: Uuid,

    /// Hex SHA-256 of the plaintext value.
    pub token_hash: String,

    /// Application the token was issued to.
    pub application_id: ApplicationId,

    /// Resource owner that authorized the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_owner_id: Option<ResourceOwnerId>,

    /// Scopes granted with the original authorization.
    #[serde(rename = "scope")]
    pub scopes: ScopeSet,

    /// Issue time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Expiry, if the token has one.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,

    /// Set once the token has been exchanged or revoked.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshToken {
    /// Creates an unrevoked, non-expiring record for a plaintext token value.
    #[must_use]
    pub fn new(
        token_value: &str,
        application_id: ApplicationId,
        resource_owner_id: Option<ResourceOwnerId>,
        scopes: ScopeSet,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash: Self::hash_token(token_value),
            application_id,
            resource_owner_id,
            scopes,
            created_at: OffsetDateTime::now_utc(),
            expires_at: None,
            revoked_at: None,
        }
    }

    /// Returns `true` once `expires_at` has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| OffsetDateTime::now_utc() > exp)
            .unwrap_or(false)
    }

    /// Returns `true` if `revoked_at` is set.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Hex SHA-256 of a plaintext token, the key stored records are found by.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
