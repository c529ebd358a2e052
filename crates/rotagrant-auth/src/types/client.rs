//! OAuth 2.0 client as seen by the token endpoint.

use serde::{Deserialize, Serialize};

/// Identifier of a registered application.
pub type ApplicationId = i64;

/// Identifier of the resource owner (user) that authorized a token.
pub type ResourceOwnerId = i64;

/// An authenticated OAuth 2.0 client.
///
/// Produced by a [`ClientAuthenticator`](crate::storage::ClientAuthenticator)
/// once a `client_id`/`client_secret` pair has been verified. The grant only
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Public client identifier used in OAuth flows.
    pub client_id: String,

    /// Application this client belongs to. Refresh tokens record the
    /// application they were issued to.
    pub application_id: ApplicationId,

    /// Human-readable display name.
    pub name: String,
}

impl Client {
    /// Creates a client record.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        application_id: ApplicationId,
        name: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            application_id,
            name: name.into(),
        }
    }

    /// Returns `true` if this client belongs to `application_id`.
    #[must_use]
    pub fn owns(&self, application_id: ApplicationId) -> bool {
        self.application_id == application_id
    }
}
