//! Price history repository.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::Result;
use crate::database::models::{PriceSampleDbModel, SampleStepDbModel};

/// Maximum number of ids bound into one DELETE statement.
pub const DELETE_BATCH_SIZE: usize = 1000;

/// Price sample repository trait.
#[async_trait]
pub trait PriceSampleRepository: Send + Sync {
    /// Most recent samples for an item, newest first.
    async fn recent_samples(&self, item_id: &str, limit: i64) -> Result<Vec<PriceSampleDbModel>>;
    /// All samples ordered by item then time, for history compaction.
    async fn list_all_ordered(&self) -> Result<Vec<PriceSampleDbModel>>;
    async fn count_for_item(&self, item_id: &str) -> Result<i64>;
    /// Delete the given samples in batches; returns the number removed.
    async fn delete_samples(&self, ids: &[i64]) -> Result<u64>;
    /// Samples of every item owned by `user_id` recorded at or after
    /// `since_ms`, oldest first. The prior price looks back past `since_ms`.
    async fn steps_for_user_since(
        &self,
        user_id: &str,
        since_ms: i64,
    ) -> Result<Vec<SampleStepDbModel>>;
}

/// SQLx implementation of PriceSampleRepository.
pub struct SqlxPriceSampleRepository {
    pool: SqlitePool,
    write_pool: SqlitePool,
}

impl SqlxPriceSampleRepository {
    pub fn new(pool: SqlitePool, write_pool: SqlitePool) -> Self {
        Self { pool, write_pool }
    }
}

#[async_trait]
impl PriceSampleRepository for SqlxPriceSampleRepository {
    async fn recent_samples(&self, item_id: &str, limit: i64) -> Result<Vec<PriceSampleDbModel>> {
        let samples = sqlx::query_as::<_, PriceSampleDbModel>(
            r#"
            SELECT * FROM price_samples
            WHERE item_id = ?
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(item_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(samples)
    }

    async fn list_all_ordered(&self) -> Result<Vec<PriceSampleDbModel>> {
        let samples = sqlx::query_as::<_, PriceSampleDbModel>(
            "SELECT * FROM price_samples ORDER BY item_id, recorded_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(samples)
    }

    async fn count_for_item(&self, item_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM price_samples WHERE item_id = ?")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_samples(&self, ids: &[i64]) -> Result<u64> {
        let mut removed = 0u64;
        for chunk in ids.chunks(DELETE_BATCH_SIZE) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM price_samples WHERE id IN (");
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");

            let result = builder.build().execute(&self.write_pool).await?;
            removed += result.rows_affected();
        }
        Ok(removed)
    }

    async fn steps_for_user_since(
        &self,
        user_id: &str,
        since_ms: i64,
    ) -> Result<Vec<SampleStepDbModel>> {
        let steps = sqlx::query_as::<_, SampleStepDbModel>(
            r#"
            SELECT item_id, item_name, price, prior_price, recorded_at FROM (
                SELECT s.item_id AS item_id,
                       i.name AS item_name,
                       s.price AS price,
                       s.recorded_at AS recorded_at,
                       s.id AS sample_id,
                       LAG(s.price) OVER (
                           PARTITION BY s.item_id ORDER BY s.recorded_at, s.id
                       ) AS prior_price
                FROM price_samples s
                JOIN monitored_items i ON i.id = s.item_id
                WHERE i.user_id = ?
            )
            WHERE recorded_at >= ?
            ORDER BY recorded_at, sample_id
            "#,
        )
        .bind(user_id)
        .bind(since_ms)
        .fetch_all(&self.pool)
        .await?;
        Ok(steps)
    }
}

/// Transactional operations for price samples.
pub struct PriceSampleTxOps;

impl PriceSampleTxOps {
    /// Whether the item has any sample recorded at or after `since_ms`.
    pub async fn exists_since(
        tx: &mut SqliteConnection,
        item_id: &str,
        since_ms: i64,
    ) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM price_samples WHERE item_id = ? AND recorded_at >= ?)",
        )
        .bind(item_id)
        .bind(since_ms)
        .fetch_one(tx)
        .await?;
        Ok(exists != 0)
    }

    pub async fn insert(
        tx: &mut SqliteConnection,
        item_id: &str,
        price: f64,
        recorded_at: i64,
    ) -> Result<()> {
        sqlx::query("INSERT INTO price_samples (item_id, price, recorded_at) VALUES (?, ?, ?)")
            .bind(item_id)
            .bind(price)
            .bind(recorded_at)
            .execute(tx)
            .await?;
        Ok(())
    }
}
