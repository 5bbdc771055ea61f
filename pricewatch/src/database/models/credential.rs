//! Upstream OAuth credential model.

use sqlx::FromRow;

/// Durable mirror of the single upstream credential, keyed by account id.
#[derive(Debug, Clone, FromRow)]
pub struct UpstreamCredentialDbModel {
    pub account_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    /// Unix epoch milliseconds (UTC).
    pub expires_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
