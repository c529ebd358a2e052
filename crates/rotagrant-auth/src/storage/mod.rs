//! Collaborator interfaces for the refresh token grant.
//!
//! This crate owns no storage. The grant talks to three collaborators:
//!
//! - [`ClientAuthenticator`] - verifies client credentials
//! - [`RefreshTokenStorage`] - finds and revokes refresh tokens
//! - [`AccessTokenFactory`] - mints and persists new access tokens
//!
//! Implementations live with the server's persistence layer.

pub mod access_token;
pub mod client;
pub mod refresh_token;

pub use access_token::AccessTokenFactory;
pub use client::ClientAuthenticator;
pub use refresh_token::RefreshTokenStorage;
