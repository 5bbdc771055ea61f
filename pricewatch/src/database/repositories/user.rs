//! User repository.
//!
//! Accounts are managed elsewhere; the pipeline only reads them to resolve
//! notification preferences.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::UserDbModel;
use crate::{Error, Result};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<UserDbModel>;
    async fn create_user(&self, user: &UserDbModel) -> Result<()>;
}

pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn get_user(&self, id: &str) -> Result<UserDbModel> {
        sqlx::query_as::<_, UserDbModel>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("User", id))
    }

    async fn create_user(&self, user: &UserDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, full_name, email_notifications_enabled,
                telegram_chat_id, telegram_enabled, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.email_notifications_enabled)
        .bind(&user.telegram_chat_id)
        .bind(user.telegram_enabled)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
