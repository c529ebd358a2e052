//! Refresh token grant (RFC 6749 Section 6).
//!
//! [`RefreshGrant`] owns the server configuration and the storage
//! collaborators. Each incoming request becomes a [`RefreshTokenRequest`]
//! that lives for one call to [`RefreshTokenRequest::authorize`]:
//!
//! ```text
//! Unvalidated ──validate──> Invalid(error)
//!      │
//!      └──────────────────> Validated ──revoke + issue──> Rotated
//!                                                   └───> Failed
//! ```
//!
//! Rotation revokes the presented refresh token before asking the factory
//! for a new access token (which carries its own refresh token). The revoke
//! is a compare-and-set: if another request revoked the same token first,
//! this one ends in `Invalid` with `invalid_request` and nothing is issued.
//! If issuance fails after the revoke, the request ends in `Failed` and the
//! caller gets [`AuthError::TokenIssuance`].
//!
//! # Usage
//!
//! ```ignore
//! use rotagrant_auth::oauth::RefreshGrant;
//!
//! let grant = RefreshGrant::new(config, authenticator, refresh_tokens, access_tokens);
//! let response = grant.handle(&token_request, authorization_header).await?;
//! ```

use std::sync::{Arc, OnceLock};

use time::OffsetDateTime;

use crate::AuthResult;
use crate::config::ServerConfig;
use crate::error::AuthError;
use crate::oauth::scope::ScopeSet;
use crate::oauth::token::{GrantResponse, TokenError, TokenErrorCode, TokenRequest, TokenResponse};
use crate::oauth::validation::{self, GrantFacts, ValidationError};
use crate::storage::{AccessTokenFactory, ClientAuthenticator, RefreshTokenStorage};
use crate::types::{AccessToken, Client, Credentials, NewAccessToken, RefreshToken};

/// `grant_type` value handled by this module.
pub const GRANT_TYPE: &str = "refresh_token";

/// Refresh token grant service.
pub struct RefreshGrant {
    /// Server settings (access token lifetime, error URI).
    config: Arc<dyn ServerConfig>,

    /// Verifies client credentials.
    authenticator: Arc<dyn ClientAuthenticator>,

    /// Finds and revokes refresh tokens.
    refresh_tokens: Arc<dyn RefreshTokenStorage>,

    /// Mints replacement access tokens.
    access_tokens: Arc<dyn AccessTokenFactory>,
}

impl RefreshGrant {
    /// Creates a new refresh grant service.
    #[must_use]
    pub fn new(
        config: Arc<dyn ServerConfig>,
        authenticator: Arc<dyn ClientAuthenticator>,
        refresh_tokens: Arc<dyn RefreshTokenStorage>,
        access_tokens: Arc<dyn AccessTokenFactory>,
    ) -> Self {
        Self {
            config,
            authenticator,
            refresh_tokens,
            access_tokens,
        }
    }

    /// Gets the server configuration.
    #[must_use]
    pub fn config(&self) -> &dyn ServerConfig {
        self.config.as_ref()
    }

    /// Starts a refresh token request.
    ///
    /// If `credentials` are present they are authenticated right away; a
    /// failed authentication is remembered and reported as `invalid_client`
    /// by [`RefreshTokenRequest::authorize`]. A blank `scope` counts as no
    /// scope requested.
    ///
    /// # Errors
    ///
    /// Returns an error only if the client authenticator itself fails.
    pub async fn request(
        &self,
        refresh_token: Option<RefreshToken>,
        credentials: Option<Credentials>,
        scope: Option<&str>,
    ) -> AuthResult<RefreshTokenRequest<'_>> {
        let client = match &credentials {
            Some(creds) => {
                self.authenticator
                    .authenticate(&creds.client_id, &creds.client_secret)
                    .await?
            }
            None => None,
        };

        let requested_scopes = scope
            .map(ScopeSet::parse)
            .filter(|scopes| !scopes.is_empty());

        Ok(RefreshTokenRequest {
            grant: self,
            refresh_token,
            credentials,
            client,
            requested_scopes,
            scopes: OnceLock::new(),
            error: None,
            access_token: None,
            state: GrantState::Unvalidated,
        })
    }

    /// Handles a token endpoint request end to end.
    ///
    /// Rejects grant types other than `refresh_token`, extracts client
    /// credentials from the `Authorization` header or the body, looks up
    /// the presented token by hash, and runs the grant.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator fails, including the fatal
    /// [`AuthError::TokenIssuance`]. Protocol rejections are `Ok` with a
    /// [`GrantResponse::Error`].
    pub async fn handle(
        &self,
        request: &TokenRequest,
        authorization_header: Option<&str>,
    ) -> AuthResult<GrantResponse> {
        if request.grant_type != GRANT_TYPE {
            tracing::debug!(grant_type = %request.grant_type, "Unsupported grant type");
            let error = TokenError::unsupported_grant_type(format!(
                "Grant type '{}' is not supported",
                request.grant_type
            ));
            return Ok(self.with_error_uri(error).into());
        }

        let credentials = Credentials::from_request(
            authorization_header,
            request.client_id.as_deref(),
            request.client_secret.as_deref(),
        );

        let presented = request
            .refresh_token
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let refresh_token = match presented {
            Some(value) => {
                self.refresh_tokens
                    .find_by_hash(&RefreshToken::hash_token(value))
                    .await?
            }
            None => None,
        };

        let mut grant_request = self
            .request(refresh_token, credentials, request.scope.as_deref())
            .await?;
        grant_request.authorize().await
    }

    fn with_error_uri(&self, error: TokenError) -> TokenError {
        match self.config.error_uri() {
            Some(uri) => error.with_error_uri(uri),
            None => error,
        }
    }
}

/// Lifecycle of a [`RefreshTokenRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantState {
    /// Created, `authorize` not yet called.
    Unvalidated,
    /// Rejected by the validation pipeline. Nothing was revoked.
    Invalid(ValidationError),
    /// Passed validation; rotation in progress.
    Validated,
    /// Old refresh token revoked and new access token issued.
    Rotated,
    /// Rotation failed part way.
    Failed,
}

/// A single refresh token request.
///
/// Holds no state beyond one `authorize` call. Created by
/// [`RefreshGrant::request`].
#[derive(Debug)]
pub struct RefreshTokenRequest<'a> {
    grant: &'a RefreshGrant,
    refresh_token: Option<RefreshToken>,
    credentials: Option<Credentials>,
    client: Option<Client>,
    requested_scopes: Option<ScopeSet>,
    scopes: OnceLock<ScopeSet>,
    error: Option<ValidationError>,
    access_token: Option<AccessToken>,
    state: GrantState,
}

impl std::fmt::Debug for RefreshGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshGrant")
            .field(
                "access_token_lifetime",
                &self.config.access_token_lifetime(),
            )
            .finish_non_exhaustive()
    }
}

impl RefreshTokenRequest<'_> {
    /// Validates the request and, if valid, rotates the token pair.
    ///
    /// Can be called once per request. If another request revokes the same
    /// token between validation and rotation, the result is
    /// `invalid_request` and nothing is issued.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Internal`] if called a second time
    /// - [`AuthError::Storage`] if revoking the old token fails (nothing
    ///   was issued)
    /// - [`AuthError::TokenIssuance`] if issuing the new token fails after
    ///   the old one was revoked
    pub async fn authorize(&mut self) -> AuthResult<GrantResponse> {
        if self.state != GrantState::Unvalidated {
            return Err(AuthError::internal(
                "refresh token request has already been authorized",
            ));
        }

        let outcome = validation::validate(&self.facts());
        if let Err(error) = outcome {
            return Ok(self.reject(error));
        }

        self.state = GrantState::Validated;

        let Some(refresh_token) = self.refresh_token.as_ref() else {
            self.state = GrantState::Failed;
            return Err(AuthError::internal("validated request has no refresh token"));
        };

        let new_token = NewAccessToken {
            application_id: refresh_token.application_id,
            resource_owner_id: refresh_token.resource_owner_id,
            scopes: self.scopes().clone(),
            expires_in: self.grant.config.access_token_lifetime_seconds(),
            issues_refresh_token: true,
        };

        match revoke_and_create_access_token(self.grant, refresh_token, &new_token).await {
            Ok(Rotation::AlreadyRevoked) => Ok(self.reject(ValidationError {
                check: "token",
                code: TokenErrorCode::InvalidRequest,
                reason: "refresh token was revoked by a concurrent request",
            })),
            Ok(Rotation::Rotated(access_token)) => {
                if let Some(token) = self.refresh_token.as_mut() {
                    token.revoked_at = Some(OffsetDateTime::now_utc());
                }
                let response = TokenResponse::from_access_token(&access_token);
                self.access_token = Some(access_token);
                self.state = GrantState::Rotated;
                Ok(response.into())
            }
            Err(e) => {
                tracing::debug!(
                    category = %e.category(),
                    error = %e,
                    "Refresh token rotation failed"
                );
                self.state = GrantState::Failed;
                Err(e)
            }
        }
    }

    fn reject(&mut self, error: ValidationError) -> GrantResponse {
        tracing::debug!(
            check = error.check,
            error = %error.code,
            reason = error.reason,
            client_id = self.credentials.as_ref().map(|c| c.client_id.as_str()),
            "Refresh token request rejected"
        );
        self.error = Some(error);
        self.state = GrantState::Invalid(error);
        self.grant.with_error_uri(error.to_token_error()).into()
    }

    /// Scopes the new access token will carry.
    ///
    /// The explicitly requested scopes when a non-blank scope was sent,
    /// otherwise the scopes of the presented refresh token. Computed once.
    pub fn scopes(&self) -> &ScopeSet {
        self.scopes.get_or_init(|| match (&self.requested_scopes, &self.refresh_token) {
            (Some(requested), _) => requested.clone(),
            (None, Some(token)) => token.scopes.clone(),
            (None, None) => ScopeSet::new(),
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> GrantState {
        self.state
    }

    /// First failed validation, once `authorize` has run.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Returns `true` if validation ran and found no error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(
            self.state,
            GrantState::Unvalidated | GrantState::Invalid(_)
        )
    }

    /// The client authenticated from the request's credentials.
    #[must_use]
    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// The presented refresh token record.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    /// The access token issued by a successful rotation.
    #[must_use]
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    fn facts(&self) -> GrantFacts<'_> {
        GrantFacts {
            refresh_token: self.refresh_token.as_ref(),
            credentials_supplied: self.credentials.is_some(),
            client: self.client.as_ref(),
            requested_scopes: self.requested_scopes.as_ref(),
        }
    }
}

/// Outcome of a rotation attempt that did not fail outright.
enum Rotation {
    Rotated(AccessToken),
    /// Another request revoked the token first; nothing was issued.
    AlreadyRevoked,
}

async fn revoke_and_create_access_token(
    grant: &RefreshGrant,
    refresh_token: &RefreshToken,
    new_token: &NewAccessToken,
) -> AuthResult<Rotation> {
    if !grant.refresh_tokens.revoke(refresh_token).await? {
        return Ok(Rotation::AlreadyRevoked);
    }

    match grant.access_tokens.create(new_token).await {
        Ok(access_token) => {
            tracing::info!(
                application_id = refresh_token.application_id,
                revoked_token_id = %refresh_token.id,
                access_token_id = %access_token.id,
                scope = %access_token.scopes,
                "Refresh token rotated"
            );
            Ok(Rotation::Rotated(access_token))
        }
        Err(e) => {
            tracing::error!(
                application_id = refresh_token.application_id,
                revoked_token_id = %refresh_token.id,
                error = %e,
                "Access token issuance failed after refresh token was revoked"
            );
            Err(AuthError::token_issuance(refresh_token.id, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthConfig;
    use std::collections::HashMap;
    use std::sync::RwLock;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock client authenticator for testing.
    struct MockClientAuthenticator {
        clients: RwLock<HashMap<String, (Client, String)>>, // client_id -> (client, secret)
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl MockClientAuthenticator {
        fn new() -> Self {
            Self {
                clients: RwLock::new(HashMap::new()),
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }

        fn add_client(&self, client: Client, secret: &str) {
            self.clients
                .write()
                .unwrap()
                .insert(client.client_id.clone(), (client, secret.to_string()));
        }
    }

    #[async_trait::async_trait]
    impl ClientAuthenticator for MockClientAuthenticator {
        async fn authenticate(
            &self,
            client_id: &str,
            client_secret: &str,
        ) -> AuthResult<Option<Client>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(AuthError::storage("client store unavailable"));
            }
            Ok(self
                .clients
                .read()
                .unwrap()
                .get(client_id)
                .filter(|(_, secret)| secret == client_secret)
                .map(|(client, _)| client.clone()))
        }
    }

    /// Mock refresh token storage for testing.
    struct MockRefreshTokenStorage {
        tokens: RwLock<HashMap<String, RefreshToken>>,
        revocations: AtomicUsize,
        fail_revoke: AtomicBool,
    }

    impl MockRefreshTokenStorage {
        fn new() -> Self {
            Self {
                tokens: RwLock::new(HashMap::new()),
                revocations: AtomicUsize::new(0),
                fail_revoke: AtomicBool::new(false),
            }
        }

        fn insert(&self, token: RefreshToken) {
            self.tokens
                .write()
                .unwrap()
                .insert(token.token_hash.clone(), token);
        }

        fn get(&self, token_hash: &str) -> Option<RefreshToken> {
            self.tokens.read().unwrap().get(token_hash).cloned()
        }
    }

    #[async_trait::async_trait]
    impl RefreshTokenStorage for MockRefreshTokenStorage {
        async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
            Ok(self.get(token_hash))
        }

        async fn revoke(&self, token: &RefreshToken) -> AuthResult<bool> {
            if self.fail_revoke.load(Ordering::SeqCst) {
                return Err(AuthError::storage("revoke failed"));
            }
            let mut tokens = self.tokens.write().unwrap();
            match tokens.get_mut(&token.token_hash) {
                Some(stored) if stored.is_revoked() => Ok(false),
                Some(stored) => {
                    stored.revoked_at = Some(OffsetDateTime::now_utc());
                    self.revocations.fetch_add(1, Ordering::SeqCst);
                    Ok(true)
                }
                None => Err(AuthError::storage("refresh token not found")),
            }
        }
    }

    /// Mock access token factory for testing.
    struct MockAccessTokenFactory {
        created: RwLock<Vec<NewAccessToken>>,
        fail: AtomicBool,
    }

    impl MockAccessTokenFactory {
        fn new() -> Self {
            Self {
                created: RwLock::new(Vec::new()),
                fail: AtomicBool::new(false),
            }
        }

        fn created(&self) -> Vec<NewAccessToken> {
            self.created.read().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl AccessTokenFactory for MockAccessTokenFactory {
        async fn create(&self, request: &NewAccessToken) -> AuthResult<AccessToken> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AuthError::storage("insert failed"));
            }
            self.created.write().unwrap().push(request.clone());
            Ok(AccessToken::mint(request))
        }
    }

    struct Fixture {
        grant: RefreshGrant,
        authenticator: Arc<MockClientAuthenticator>,
        refresh_tokens: Arc<MockRefreshTokenStorage>,
        access_tokens: Arc<MockAccessTokenFactory>,
    }

    fn create_fixture() -> Fixture {
        let authenticator = Arc::new(MockClientAuthenticator::new());
        authenticator.add_client(Client::new("app-one", 1, "App One"), "secret-one");
        authenticator.add_client(Client::new("app-two", 2, "App Two"), "secret-two");

        let refresh_tokens = Arc::new(MockRefreshTokenStorage::new());
        let access_tokens = Arc::new(MockAccessTokenFactory::new());

        let config = OAuthConfig {
            access_token_lifetime: Duration::from_secs(900),
            error_uri: None,
        };

        let grant = RefreshGrant::new(
            Arc::new(config),
            authenticator.clone(),
            refresh_tokens.clone(),
            access_tokens.clone(),
        );

        Fixture {
            grant,
            authenticator,
            refresh_tokens,
            access_tokens,
        }
    }

    fn stored_token(fixture: &Fixture, value: &str, scope: &str) -> RefreshToken {
        let token = RefreshToken::new(value, 1, Some(42), ScopeSet::parse(scope));
        fixture.refresh_tokens.insert(token.clone());
        token
    }

    fn creds(id: &str, secret: &str) -> Option<Credentials> {
        Credentials::new(id, secret)
    }

    #[tokio::test]
    async fn test_authorize_success() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-1", "read write");

        let mut request = fixture
            .grant
            .request(Some(token.clone()), creds("app-one", "secret-one"), None)
            .await
            .unwrap();
        assert_eq!(request.state(), GrantState::Unvalidated);
        assert_eq!(request.client().map(|c| c.application_id), Some(1));

        let response = request.authorize().await.unwrap();
        let token_response = response.token().unwrap();
        assert_eq!(token_response.scope, "read write");
        assert_eq!(token_response.expires_in, 900);
        assert!(token_response.refresh_token.is_some());

        assert_eq!(request.state(), GrantState::Rotated);
        assert!(request.is_valid());
        assert!(request.error().is_none());
        assert!(request.refresh_token().unwrap().is_revoked());
        assert_eq!(
            request.access_token().unwrap().token,
            token_response.access_token
        );

        let created = fixture.access_tokens.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].application_id, 1);
        assert_eq!(created[0].resource_owner_id, Some(42));
        assert_eq!(created[0].expires_in, 900);
        assert!(created[0].issues_refresh_token);

        assert_eq!(fixture.refresh_tokens.revocations.load(Ordering::SeqCst), 1);
        assert!(
            fixture
                .refresh_tokens
                .get(&token.token_hash)
                .unwrap()
                .is_revoked()
        );
    }

    #[tokio::test]
    async fn test_authorize_narrowed_scope() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-2", "read write");

        let mut request = fixture
            .grant
            .request(Some(token), None, Some("write"))
            .await
            .unwrap();

        let response = request.authorize().await.unwrap();
        assert_eq!(response.token().unwrap().scope, "write");
        assert_eq!(fixture.access_tokens.created()[0].scopes.to_string(), "write");
    }

    #[tokio::test]
    async fn test_blank_scope_reuses_granted_scope() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-3", "read");

        let mut request = fixture
            .grant
            .request(Some(token), None, Some("   "))
            .await
            .unwrap();

        let response = request.authorize().await.unwrap();
        assert_eq!(response.token().unwrap().scope, "read");
    }

    #[tokio::test]
    async fn test_missing_token_is_invalid_request() {
        let fixture = create_fixture();

        let mut request = fixture
            .grant
            .request(None, creds("app-one", "secret-one"), Some("read"))
            .await
            .unwrap();

        let response = request.authorize().await.unwrap();
        assert_eq!(response.error_code(), Some(TokenErrorCode::InvalidRequest));
        assert!(!request.is_valid());
        assert_eq!(request.error().unwrap().check, "token");
        assert!(matches!(request.state(), GrantState::Invalid(_)));
        assert_eq!(fixture.refresh_tokens.revocations.load(Ordering::SeqCst), 0);
        assert!(fixture.access_tokens.created().is_empty());
    }

    #[tokio::test]
    async fn test_bad_credentials_is_invalid_client() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-4", "read");

        let mut request = fixture
            .grant
            .request(Some(token), creds("app-one", "wrong"), None)
            .await
            .unwrap();
        assert!(request.client().is_none());

        let response = request.authorize().await.unwrap();
        assert_eq!(response.error_code(), Some(TokenErrorCode::InvalidClient));
        assert_eq!(response.http_status(), 401);
        assert_eq!(fixture.refresh_tokens.revocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_application_is_invalid_grant() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-5", "read");

        let mut request = fixture
            .grant
            .request(Some(token), creds("app-two", "secret-two"), None)
            .await
            .unwrap();

        let response = request.authorize().await.unwrap();
        assert_eq!(response.error_code(), Some(TokenErrorCode::InvalidGrant));
        assert_eq!(fixture.refresh_tokens.revocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scope_escalation_is_invalid_scope() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-6", "read");

        let mut request = fixture
            .grant
            .request(Some(token.clone()), None, Some("read admin"))
            .await
            .unwrap();

        let response = request.authorize().await.unwrap();
        assert_eq!(response.error_code(), Some(TokenErrorCode::InvalidScope));
        assert!(
            !fixture
                .refresh_tokens
                .get(&token.token_hash)
                .unwrap()
                .is_revoked()
        );
    }

    #[tokio::test]
    async fn test_error_uri_from_config() {
        let authenticator = Arc::new(MockClientAuthenticator::new());
        let config = OAuthConfig {
            access_token_lifetime: Duration::from_secs(60),
            error_uri: Some("https://auth.example.com/errors".to_string()),
        };
        let grant = RefreshGrant::new(
            Arc::new(config),
            authenticator,
            Arc::new(MockRefreshTokenStorage::new()),
            Arc::new(MockAccessTokenFactory::new()),
        );

        let mut request = grant.request(None, None, None).await.unwrap();
        let response = request.authorize().await.unwrap();
        match response {
            GrantResponse::Error(error) => assert_eq!(
                error.error_uri.as_deref(),
                Some("https://auth.example.com/errors")
            ),
            GrantResponse::Token(_) => panic!("expected an error response"),
        }
    }

    #[tokio::test]
    async fn test_authorize_twice_is_rejected() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-7", "read");

        let mut request = fixture.grant.request(Some(token), None, None).await.unwrap();
        assert!(request.authorize().await.unwrap().is_success());

        let second = request.authorize().await;
        assert!(matches!(second, Err(AuthError::Internal { .. })));
        assert_eq!(fixture.refresh_tokens.revocations.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.access_tokens.created().len(), 1);
    }

    #[tokio::test]
    async fn test_scopes_is_memoized() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-8", "read write");

        let request = fixture
            .grant
            .request(Some(token), creds("app-one", "secret-one"), None)
            .await
            .unwrap();
        let calls_before = fixture.authenticator.calls.load(Ordering::SeqCst);

        let first = request.scopes().clone();
        let second = request.scopes().clone();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "read write");
        assert!(std::ptr::eq(request.scopes(), request.scopes()));

        assert_eq!(fixture.authenticator.calls.load(Ordering::SeqCst), calls_before);
        assert_eq!(fixture.refresh_tokens.revocations.load(Ordering::SeqCst), 0);
        assert!(fixture.access_tokens.created().is_empty());
    }

    #[tokio::test]
    async fn test_authenticator_failure_propagates() {
        let fixture = create_fixture();
        fixture.authenticator.fail.store(true, Ordering::SeqCst);

        let result = fixture
            .grant
            .request(None, creds("app-one", "secret-one"), None)
            .await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_revoke_failure_issues_nothing() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-9", "read");
        fixture.refresh_tokens.fail_revoke.store(true, Ordering::SeqCst);

        let mut request = fixture.grant.request(Some(token), None, None).await.unwrap();
        let result = request.authorize().await;

        assert!(matches!(result, Err(AuthError::Storage { .. })));
        assert_eq!(request.state(), GrantState::Failed);
        assert!(fixture.access_tokens.created().is_empty());
        assert!(!request.refresh_token().unwrap().is_revoked());
    }

    #[tokio::test]
    async fn test_issuance_failure_after_revoke_is_fatal() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-10", "read");
        fixture.access_tokens.fail.store(true, Ordering::SeqCst);

        let mut request = fixture
            .grant
            .request(Some(token.clone()), None, None)
            .await
            .unwrap();
        let result = request.authorize().await;

        match result {
            Err(AuthError::TokenIssuance {
                revoked_token_id, ..
            }) => assert_eq!(revoked_token_id, token.id),
            other => panic!("expected TokenIssuance, got {other:?}"),
        }
        assert_eq!(request.state(), GrantState::Failed);
        assert!(request.access_token().is_none());
        assert!(
            fixture
                .refresh_tokens
                .get(&token.token_hash)
                .unwrap()
                .is_revoked()
        );
    }

    #[tokio::test]
    async fn test_same_snapshot_rotates_once() {
        let fixture = create_fixture();
        let token = stored_token(&fixture, "refresh-11", "read");

        // Both requests see the token as unrevoked when they are built
        let mut first = fixture
            .grant
            .request(Some(token.clone()), None, None)
            .await
            .unwrap();
        let mut second = fixture.grant.request(Some(token), None, None).await.unwrap();

        assert!(first.authorize().await.unwrap().is_success());

        let response = second.authorize().await.unwrap();
        assert_eq!(response.error_code(), Some(TokenErrorCode::InvalidRequest));
        assert!(matches!(second.state(), GrantState::Invalid(_)));
        assert_eq!(second.error().unwrap().check, "token");
        assert!(second.access_token().is_none());

        assert_eq!(fixture.refresh_tokens.revocations.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.access_tokens.created().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_looks_up_by_hash() {
        let fixture = create_fixture();
        stored_token(&fixture, "plain-refresh-value", "read");

        let request = TokenRequest {
            grant_type: "refresh_token".to_string(),
            refresh_token: Some("plain-refresh-value".to_string()),
            scope: None,
            client_id: Some("app-one".to_string()),
            client_secret: Some("secret-one".to_string()),
        };

        let response = fixture.grant.handle(&request, None).await.unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_handle_unknown_token() {
        let fixture = create_fixture();

        let request = TokenRequest {
            grant_type: "refresh_token".to_string(),
            refresh_token: Some("never-issued".to_string()),
            scope: None,
            client_id: None,
            client_secret: None,
        };

        let response = fixture.grant.handle(&request, None).await.unwrap();
        assert_eq!(response.error_code(), Some(TokenErrorCode::InvalidRequest));
    }

    #[tokio::test]
    async fn test_handle_unsupported_grant_type() {
        let fixture = create_fixture();

        let request = TokenRequest {
            grant_type: "authorization_code".to_string(),
            refresh_token: Some("anything".to_string()),
            scope: None,
            client_id: Some("app-one".to_string()),
            client_secret: Some("secret-one".to_string()),
        };

        let response = fixture.grant.handle(&request, None).await.unwrap();
        assert_eq!(
            response.error_code(),
            Some(TokenErrorCode::UnsupportedGrantType)
        );
        assert_eq!(fixture.authenticator.calls.load(Ordering::SeqCst), 0);
    }
}
