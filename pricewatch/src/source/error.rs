//! Fetch error types.

use thiserror::Error;

use crate::credentials::CredentialError;

/// Errors produced while resolving a listing to a [`super::FetchResult`].
///
/// None of these are fatal to a pipeline cycle; callers count and skip.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure or retry budget exhausted.
    #[error("Source unreachable for {url} after {attempts} attempt(s): {reason}")]
    Unreachable {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// Response decoded but is missing a title or a positive price.
    #[error("Invalid upstream data: {0}")]
    InvalidUpstreamData(String),

    #[error("No item identifier in URL: {0}")]
    MissingItemId(String),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FetchError {
    pub fn unreachable(url: impl Into<String>, attempts: u32, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            url: url.into(),
            attempts,
            reason: reason.into(),
        }
    }
}
