//! Credential error types.

use thiserror::Error;

/// Errors that can occur while obtaining or refreshing the upstream credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Nothing cached and nothing stored - authorization required.
    #[error("No upstream credential available - authorization required")]
    NoCredential,

    /// Missing refresh token - re-authorization required.
    #[error("Missing refresh token - re-authorization required")]
    MissingRefreshToken,

    /// The token endpoint answered with a non-success status.
    #[error("Upstream rejected token request ({status}): {body}")]
    UpstreamRejected { status: u16, body: String },

    /// Refresh failed.
    #[error("Refresh failed: {0}")]
    RefreshFailed(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CredentialError {
    /// Check if this error can only be resolved by a new authorization code.
    pub fn requires_reauthorization(&self) -> bool {
        match self {
            Self::NoCredential | Self::MissingRefreshToken | Self::RefreshFailed(_) => true,
            Self::UpstreamRejected { status, .. } => !is_transient_status(*status),
            _ => false,
        }
    }

    /// Check if this error is transient and may be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::UpstreamRejected { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }
}

fn is_transient_status(status: u16) -> bool {
    status == 429 || status >= 500
}

impl From<crate::Error> for CredentialError {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::DatabaseSqlx(e) => CredentialError::Database(e),
            other => CredentialError::Internal(other.to_string()),
        }
    }
}
