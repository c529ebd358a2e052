//! Domain types read and produced by the refresh token grant.
//!
//! None of these are persisted by this crate. Records come from the storage
//! collaborators in [`crate::storage`]; [`Credentials`] live only for the
//! duration of a single token request.

pub mod access_token;
pub mod client;
pub mod credentials;
pub mod refresh_token;

pub use access_token::{AccessToken, NewAccessToken};
pub use client::{ApplicationId, Client, ResourceOwnerId};
pub use credentials::Credentials;
pub use refresh_token::RefreshToken;
