//! Credential types.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::database::models::UpstreamCredentialDbModel;
use crate::database::time::{datetime_to_ms, ms_to_datetime};

/// Account key used when the token endpoint does not report one.
pub const DEFAULT_ACCOUNT_ID: &str = "default";

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 6 * 60 * 60;

/// The single upstream OAuth credential of this deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamCredential {
    pub account_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UpstreamCredential {
    /// True when the token expires before `now + horizon`.
    pub fn is_expiring_within(&self, now: DateTime<Utc>, horizon: Duration) -> bool {
        self.expires_at <= now + horizon
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn state(&self, now: DateTime<Utc>, horizon: Duration) -> CredentialState {
        if self.is_expiring_within(now, horizon) {
            CredentialState::ExpiringSoon
        } else {
            CredentialState::Valid
        }
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl From<UpstreamCredentialDbModel> for UpstreamCredential {
    fn from(model: UpstreamCredentialDbModel) -> Self {
        Self {
            account_id: model.account_id,
            access_token: model.access_token,
            refresh_token: model.refresh_token,
            token_type: model.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at: ms_to_datetime(model.expires_at),
            created_at: ms_to_datetime(model.created_at),
            updated_at: ms_to_datetime(model.updated_at),
        }
    }
}

impl From<&UpstreamCredential> for UpstreamCredentialDbModel {
    fn from(cred: &UpstreamCredential) -> Self {
        Self {
            account_id: cred.account_id.clone(),
            access_token: cred.access_token.clone(),
            refresh_token: cred.refresh_token.clone(),
            token_type: Some(cred.token_type.clone()),
            expires_at: datetime_to_ms(cred.expires_at),
            created_at: datetime_to_ms(cred.created_at),
            updated_at: datetime_to_ms(cred.updated_at),
        }
    }
}

/// Credential lifecycle as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CredentialState {
    Absent,
    Valid,
    ExpiringSoon,
}

/// Token endpoint response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Numeric on the real endpoint; accepted as any JSON scalar.
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
}

impl TokenResponse {
    /// Build a credential from this response.
    ///
    /// `previous` supplies the refresh token (when the response rotates none)
    /// and the original creation time.
    pub fn into_credential(
        self,
        previous: Option<&UpstreamCredential>,
        now: DateTime<Utc>,
    ) -> UpstreamCredential {
        let account_id = match self.user_id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => previous
                .map(|p| p.account_id.clone())
                .unwrap_or_else(|| DEFAULT_ACCOUNT_ID.to_string()),
        };
        let lifetime = self
            .expires_in
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        UpstreamCredential {
            account_id,
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .filter(|t| !t.is_empty())
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at: now + Duration::seconds(lifetime),
            created_at: previous.map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
        }
    }
}
