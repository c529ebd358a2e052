//! Validation pipeline for refresh token requests.
//!
//! The checks run in a fixed order and stop at the first failure:
//!
//! | # | check          | error             |
//! |---|----------------|-------------------|
//! | 1 | `token`        | `invalid_request` |
//! | 2 | `client`       | `invalid_client`  |
//! | 3 | `client_match` | `invalid_grant`   |
//! | 4 | `scope`        | `invalid_scope`   |
//!
//! A missing or revoked token is reported before anything about the client,
//! and a client/token ownership mismatch surfaces as `invalid_grant` so the
//! response does not reveal whether a client id is registered.

use std::fmt;

use crate::oauth::scope::ScopeSet;
use crate::oauth::token::{TokenError, TokenErrorCode};
use crate::types::{Client, RefreshToken};

/// Borrowed view of the request state the checks inspect.
#[derive(Debug, Clone, Copy)]
pub struct GrantFacts<'a> {
    /// The presented refresh token, if one was found.
    pub refresh_token: Option<&'a RefreshToken>,

    /// Whether the request carried client credentials.
    pub credentials_supplied: bool,

    /// The client authenticated from those credentials.
    pub client: Option<&'a Client>,

    /// Explicitly requested (non-blank) scopes.
    pub requested_scopes: Option<&'a ScopeSet>,
}

/// Outcome of a single check: `Err` carries a reason for logs.
pub type CheckResult = Result<(), &'static str>;

/// A named validation rule.
#[derive(Clone, Copy)]
pub struct Validation {
    /// Rule name, used in logs.
    pub name: &'static str,

    /// Error reported when the rule fails.
    pub error: TokenErrorCode,

    /// The rule itself.
    pub check: fn(&GrantFacts<'_>) -> CheckResult,
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("name", &self.name)
            .field("error", &self.error)
            .finish()
    }
}

/// Rules applied to every refresh token request, in protocol order.
pub const REFRESH_TOKEN_VALIDATIONS: [Validation; 4] = [
    Validation {
        name: "token",
        error: TokenErrorCode::InvalidRequest,
        check: validate_token,
    },
    Validation {
        name: "client",
        error: TokenErrorCode::InvalidClient,
        check: validate_client,
    },
    Validation {
        name: "client_match",
        error: TokenErrorCode::InvalidGrant,
        check: validate_client_match,
    },
    Validation {
        name: "scope",
        error: TokenErrorCode::InvalidScope,
        check: validate_scope,
    },
];

/// First failed rule of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the failed rule.
    pub check: &'static str,

    /// Error code reported to the client.
    pub code: TokenErrorCode,

    /// Why the rule failed. Not sent to the client.
    pub reason: &'static str,
}

impl ValidationError {
    /// Converts the failure into a wire error with the code's default
    /// description.
    #[must_use]
    pub fn to_token_error(&self) -> TokenError {
        TokenError::from_code(self.code)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} check failed ({}): {}", self.check, self.code, self.reason)
    }
}

/// Runs [`REFRESH_TOKEN_VALIDATIONS`] and returns the first failure.
///
/// # Errors
///
/// Returns the first rule that fails, later rules are not evaluated.
pub fn validate(facts: &GrantFacts<'_>) -> Result<(), ValidationError> {
    run(&REFRESH_TOKEN_VALIDATIONS, facts)
}

fn run(validations: &[Validation], facts: &GrantFacts<'_>) -> Result<(), ValidationError> {
    for validation in validations {
        if let Err(reason) = (validation.check)(facts) {
            return Err(ValidationError {
                check: validation.name,
                code: validation.error,
                reason,
            });
        }
    }
    Ok(())
}

fn validate_token(facts: &GrantFacts<'_>) -> CheckResult {
    match facts.refresh_token {
        None => Err("refresh token not found"),
        Some(token) if token.is_revoked() => Err("refresh token has been revoked"),
        Some(token) if token.is_expired() => Err("refresh token has expired"),
        Some(_) => Ok(()),
    }
}

fn validate_client(facts: &GrantFacts<'_>) -> CheckResult {
    match (facts.credentials_supplied, facts.client) {
        (true, None) => Err("client credentials could not be authenticated"),
        _ => Ok(()),
    }
}

fn validate_client_match(facts: &GrantFacts<'_>) -> CheckResult {
    match (facts.client, facts.refresh_token) {
        (None, _) => Ok(()),
        (Some(client), Some(token)) if client.owns(token.application_id) => Ok(()),
        (Some(_), Some(_)) => Err("refresh token was issued to another application"),
        (Some(_), None) => Err("no refresh token to match the client against"),
    }
}

fn validate_scope(facts: &GrantFacts<'_>) -> CheckResult {
    match (facts.requested_scopes, facts.refresh_token) {
        (None, _) => Ok(()),
        (Some(requested), Some(token)) if requested.is_subset_of(&token.scopes) => Ok(()),
        (Some(_), Some(_)) => Err("requested scope exceeds the original grant"),
        (Some(_), None) => Err("no refresh token to compare scopes against"),
    }
}
