//! Client authentication collaborator.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Verifies client credentials presented at the token endpoint.
///
/// # Example
///
/// ```ignore
/// use rotagrant_auth::storage::ClientAuthenticator;
///
/// async fn example(authenticator: &impl ClientAuthenticator) {
///     match authenticator.authenticate("my-app", "s3cr3t").await? {
///         Some(client) => println!("application {}", client.application_id),
///         None => println!("bad credentials"),
///     }
/// }
/// ```
#[async_trait]
pub trait ClientAuthenticator: Send + Sync {
    /// Authenticates a `client_id`/`client_secret` pair.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(client))` if the client exists and the secret matches
    /// - `Ok(None)` if the client is unknown or the secret is wrong
    ///
    /// Implementations should not distinguish the two `None` cases to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lookup itself fails.
    async fn authenticate(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> AuthResult<Option<Client>>;
}
