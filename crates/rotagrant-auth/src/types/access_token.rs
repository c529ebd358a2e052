//! Access tokens minted by a refresh.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::oauth::scope::ScopeSet;
use crate::types::client::{ApplicationId, ResourceOwnerId};

/// Fields the grant asks an [`AccessTokenFactory`] to mint.
///
/// [`AccessTokenFactory`]: crate::storage::AccessTokenFactory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccessToken {
    /// Copied from the refresh token being exchanged.
    pub application_id: ApplicationId,

    /// Copied from the refresh token being exchanged.
    pub resource_owner_id: Option<ResourceOwnerId>,

    /// Resolved scopes, stored in canonical string form.
    pub scopes: ScopeSet,

    /// Lifetime in seconds, from the server configuration.
    pub expires_in: u64,

    /// Whether the new access token carries its own refresh token.
    pub issues_refresh_token: bool,
}

/// Access token returned by an [`AccessTokenFactory`].
///
/// [`AccessTokenFactory`]: crate::storage::AccessTokenFactory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Unique identifier for this access token record.
    pub id: Uuid,

    /// Bearer token value handed to the client.
    pub token: String,

    /// Application the token was issued to.
    pub application_id: ApplicationId,

    /// Resource owner the token acts for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_owner_id: Option<ResourceOwnerId>,

    /// Granted scopes.
    #[serde(rename = "scope")]
    pub scopes: ScopeSet,

    /// Lifetime in seconds.
    pub expires_in: u64,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Plaintext refresh token issued alongside, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl AccessToken {
    /// Builds an access token from a creation request, generating fresh
    /// token values.
    ///
    /// Storage backends typically call this inside their
    /// [`AccessTokenFactory::create`](crate::storage::AccessTokenFactory::create)
    /// before persisting the record.
    #[must_use]
    pub fn mint(request: &NewAccessToken) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: Self::generate_value(),
            application_id: request.application_id,
            resource_owner_id: request.resource_owner_id,
            scopes: request.scopes.clone(),
            expires_in: request.expires_in,
            created_at: OffsetDateTime::now_utc(),
            refresh_token: request.issues_refresh_token.then(Self::generate_value),
        }
    }

    /// Generate a cryptographically secure random token value.
    ///
    /// Returns a 256-bit random value encoded as base64url (43 characters).
    #[must_use]
    pub fn generate_value() -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
