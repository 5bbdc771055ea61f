//! In-app notification feed repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::FeedEntryDbModel;

#[async_trait]
pub trait FeedRepository: Send + Sync {
    async fn insert_entry(&self, entry: &FeedEntryDbModel) -> Result<()>;
    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<FeedEntryDbModel>>;
}

/// SQLx implementation of FeedRepository.
pub struct SqlxFeedRepository {
    pool: SqlitePool,
}

impl SqlxFeedRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedRepository for SqlxFeedRepository {
    async fn insert_entry(&self, entry: &FeedEntryDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, item_id, kind, title, message,
                old_price, new_price, is_read, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.item_id)
        .bind(&entry.kind)
        .bind(&entry.title)
        .bind(&entry.message)
        .bind(entry.old_price)
        .bind(entry.new_price)
        .bind(entry.is_read)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<FeedEntryDbModel>> {
        let entries = sqlx::query_as::<_, FeedEntryDbModel>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
