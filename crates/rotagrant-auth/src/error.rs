//! Error types for the refresh token grant.
//!
//! Protocol rejections (a revoked token, a scope escalation attempt) are not
//! errors at this level: they are rendered as [`TokenError`] payloads by the
//! grant itself. [`AuthError`] is reserved for failures the caller has to
//! act on, such as a storage backend going away or a token issuance failing
//! after the presented refresh token was already revoked.
//!
//! [`TokenError`]: crate::oauth::token::TokenError

use std::fmt;

use uuid::Uuid;

/// Errors that can occur while processing a refresh token grant.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A new access token could not be issued after the presented refresh
    /// token had already been revoked.
    ///
    /// The resource owner has to re-authorize the application.
    #[error("Token issuance failed after revoking refresh token {revoked_token_id}: {message}")]
    TokenIssuance {
        /// Record id of the refresh token that was revoked.
        revoked_token_id: Uuid,
        /// Description of the issuance failure.
        message: String,
    },

    /// A collaborator failed to read or write grant data.
    #[error("Storage error: {message}")]
    Storage {
        /// Backend error message.
        message: String,
    },

    /// A bug or misuse, such as authorizing a request twice.
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl AuthError {
    /// Shorthand for [`AuthError::TokenIssuance`].
    #[must_use]
    pub fn token_issuance(revoked_token_id: Uuid, message: impl Into<String>) -> Self {
        Self::TokenIssuance {
            revoked_token_id,
            message: message.into(),
        }
    }

    /// Shorthand for [`AuthError::Storage`].
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Shorthand for [`AuthError::Internal`].
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the error left a revoked refresh token without a
    /// replacement access token.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TokenIssuance { .. })
    }

    /// Groups the error for log fields and metrics labels.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TokenIssuance { .. } => ErrorCategory::Rotation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of grant errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Failures during the revoke-then-issue transition.
    Rotation,
    /// Collaborator or backend failures.
    Infrastructure,
    /// Bugs and misuse.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rotation => write!(f, "rotation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
