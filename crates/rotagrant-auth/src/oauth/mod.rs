//! OAuth 2.0 refresh token grant.
//!
//! - [`scope`] - space-delimited scope sets
//! - [`token`] - token endpoint request, success and error bodies
//! - [`validation`] - ordered checks applied before rotation
//! - [`refresh`] - the grant itself, with token rotation
//!
//! # Example
//!
//! ```ignore
//! use rotagrant_auth::oauth::{GrantResponse, RefreshGrant, TokenRequest};
//!
//! let grant = RefreshGrant::new(config, authenticator, refresh_tokens, access_tokens);
//!
//! match grant.handle(&token_request, authorization_header).await? {
//!     GrantResponse::Token(token) => println!("issued, expires in {}s", token.expires_in),
//!     GrantResponse::Error(error) => println!("rejected: {}", error.error),
//! }
//! ```

pub mod refresh;
pub mod scope;
pub mod token;
pub mod validation;

// Grant service
pub use refresh::{GRANT_TYPE, GrantState, RefreshGrant, RefreshTokenRequest};

// Scope handling
pub use scope::ScopeSet;

// Token endpoint types
pub use token::{GrantResponse, TokenError, TokenErrorCode, TokenRequest, TokenResponse};

// Validation pipeline
pub use validation::{
    CheckResult, GrantFacts, REFRESH_TOKEN_VALIDATIONS, Validation, ValidationError, validate,
};
