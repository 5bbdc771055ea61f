//! Monitored item repository.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use crate::database::models::{ItemStatus, MonitoredItemDbModel};
use crate::database::retry::retry_on_sqlite_busy;
use crate::{Error, Result};

/// Monitored item repository trait.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn get_item(&self, id: &str) -> Result<MonitoredItemDbModel>;
    async fn list_items(&self) -> Result<Vec<MonitoredItemDbModel>>;
    async fn list_items_for_user(&self, user_id: &str) -> Result<Vec<MonitoredItemDbModel>>;
    async fn find_by_user_and_url(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<Option<MonitoredItemDbModel>>;
    async fn create_item(&self, item: &MonitoredItemDbModel) -> Result<()>;
    async fn delete_item(&self, id: &str) -> Result<bool>;
}

/// SQLx implementation of ItemRepository.
pub struct SqlxItemRepository {
    pool: SqlitePool,
    write_pool: SqlitePool,
}

impl SqlxItemRepository {
    pub fn new(pool: SqlitePool, write_pool: SqlitePool) -> Self {
        Self { pool, write_pool }
    }
}

#[async_trait]
impl ItemRepository for SqlxItemRepository {
    async fn get_item(&self, id: &str) -> Result<MonitoredItemDbModel> {
        sqlx::query_as::<_, MonitoredItemDbModel>("SELECT * FROM monitored_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("MonitoredItem", id))
    }

    async fn list_items(&self) -> Result<Vec<MonitoredItemDbModel>> {
        let items = sqlx::query_as::<_, MonitoredItemDbModel>(
            "SELECT * FROM monitored_items ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn list_items_for_user(&self, user_id: &str) -> Result<Vec<MonitoredItemDbModel>> {
        let items = sqlx::query_as::<_, MonitoredItemDbModel>(
            "SELECT * FROM monitored_items WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn find_by_user_and_url(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<Option<MonitoredItemDbModel>> {
        let item = sqlx::query_as::<_, MonitoredItemDbModel>(
            "SELECT * FROM monitored_items WHERE user_id = ? AND url = ?",
        )
        .bind(user_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn create_item(&self, item: &MonitoredItemDbModel) -> Result<()> {
        retry_on_sqlite_busy("create_item", || async {
            sqlx::query(
                r#"
                INSERT INTO monitored_items (
                    id, user_id, url, name, image_url, current_price, previous_price,
                    original_price, discount_percent, notify_on_drop, notify_on_increase,
                    status, last_checked_at, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.user_id)
            .bind(&item.url)
            .bind(&item.name)
            .bind(&item.image_url)
            .bind(item.current_price)
            .bind(item.previous_price)
            .bind(item.original_price)
            .bind(item.discount_percent)
            .bind(item.notify_on_drop)
            .bind(item.notify_on_increase)
            .bind(&item.status)
            .bind(item.last_checked_at)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&self.write_pool)
            .await?;
            Ok(())
        })
        .await
    }

    async fn delete_item(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM monitored_items WHERE id = ?")
            .bind(id)
            .execute(&self.write_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Price columns of one item row.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct StoredPrices {
    pub current_price: Option<f64>,
    pub previous_price: Option<f64>,
}

/// Fields written by one price check.
#[derive(Debug, Clone)]
pub struct PriceCheckUpdate<'a> {
    pub name: &'a str,
    pub image_url: Option<&'a str>,
    pub current_price: f64,
    pub previous_price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount_percent: Option<i64>,
    pub checked_at: i64,
}

/// Transactional operations for monitored items.
///
/// These methods operate within an existing transaction and do NOT commit.
pub struct ItemTxOps;

impl ItemTxOps {
    /// Current and previous price as stored, read inside the transaction.
    ///
    /// Returns `None` when the item no longer exists.
    pub async fn get_prices(
        tx: &mut SqliteConnection,
        item_id: &str,
    ) -> Result<Option<StoredPrices>> {
        let prices = sqlx::query_as::<_, StoredPrices>(
            "SELECT current_price, previous_price FROM monitored_items WHERE id = ?",
        )
        .bind(item_id)
        .fetch_optional(tx)
        .await?;
        Ok(prices)
    }

    /// Write the outcome of a successful price check and mark the item active.
    ///
    /// Optional display fields keep their stored value when the fetch did not
    /// provide one.
    pub async fn apply_price_check(
        tx: &mut SqliteConnection,
        item_id: &str,
        update: &PriceCheckUpdate<'_>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE monitored_items
            SET name = ?,
                image_url = COALESCE(?, image_url),
                current_price = ?,
                previous_price = ?,
                original_price = COALESCE(?, original_price),
                discount_percent = COALESCE(?, discount_percent),
                status = ?,
                last_checked_at = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.name)
        .bind(update.image_url)
        .bind(update.current_price)
        .bind(update.previous_price)
        .bind(update.original_price)
        .bind(update.discount_percent)
        .bind(ItemStatus::Active.as_ref())
        .bind(update.checked_at)
        .bind(update.checked_at)
        .bind(item_id)
        .execute(tx)
        .await?;

        Ok(result.rows_affected())
    }
}
