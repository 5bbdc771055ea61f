//! Credential store repository (SQLx).
//!
//! Database-backed persistence for the credentials subsystem. One row per
//! upstream account, overwritten on every exchange or refresh.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::credentials::{CredentialError, CredentialStore, UpstreamCredential};
use crate::database::models::UpstreamCredentialDbModel;

/// SQLx-backed credential store.
pub struct SqlxCredentialStore {
    pool: SqlitePool,
}

impl SqlxCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for SqlxCredentialStore {
    async fn load(&self) -> Result<Option<UpstreamCredential>, CredentialError> {
        let row = sqlx::query_as::<_, UpstreamCredentialDbModel>(
            "SELECT * FROM upstream_credentials ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UpstreamCredential::from))
    }

    #[instrument(skip(self, credential), fields(account_id = %credential.account_id))]
    async fn save(&self, credential: &UpstreamCredential) -> Result<(), CredentialError> {
        let model = UpstreamCredentialDbModel::from(credential);
        debug!("Persisting upstream credential");

        sqlx::query(
            r#"
            INSERT INTO upstream_credentials (
                account_id, access_token, refresh_token, token_type,
                expires_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(account_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                token_type = excluded.token_type,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&model.account_id)
        .bind(&model.access_token)
        .bind(&model.refresh_token)
        .bind(&model.token_type)
        .bind(model.expires_at)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
