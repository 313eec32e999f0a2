//! Inventory Ledger
//!
//! Atomic reserve/release of product stock. `reserve` is a single guarded
//! UPDATE (compare-and-decrement), so two callers racing for the last unit
//! can never both succeed: there is no read-then-write window. The CHECK
//! constraint on `available_units` backs this up at the schema level.

use super::{RepoError, RepoResult};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
}

impl InventoryLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Reserve `quantity` units of a product.
    pub async fn reserve(&self, product_id: i64, quantity: i64) -> RepoResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::reserve_with(&mut conn, product_id, quantity).await
    }

    /// Reserve on an existing connection/transaction.
    ///
    /// The decrement and the stock check are one statement; 0 rows affected
    /// means the product is gone or the stock is short, disambiguated by a
    /// follow-up probe on the same connection.
    pub async fn reserve_with(
        conn: &mut SqliteConnection,
        product_id: i64,
        quantity: i64,
    ) -> RepoResult<()> {
        if quantity < 1 {
            return Err(RepoError::Validation(format!(
                "reserve quantity must be at least 1, got {quantity}"
            )));
        }

        let result = sqlx::query(
            "UPDATE products SET available_units = available_units - ?1 \
             WHERE id = ?2 AND is_active = 1 AND available_units >= ?1",
        )
        .bind(quantity)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Lost: either the product vanished or the stock is short
        let available: Option<i64> =
            sqlx::query_scalar("SELECT available_units FROM products WHERE id = ?1 AND is_active = 1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?;

        match available {
            Some(available) => Err(RepoError::OutOfStock {
                product_id,
                available,
                requested: quantity,
            }),
            None => Err(RepoError::NotFound(format!("Product {product_id}"))),
        }
    }

    /// Release `quantity` units back to a product (compensation).
    pub async fn release(&self, product_id: i64, quantity: i64) -> RepoResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::release_with(&mut conn, product_id, quantity).await
    }

    /// Release on an existing connection/transaction.
    ///
    /// Tolerates a concurrently deleted product: restocking something that
    /// no longer exists is a logged no-op, not an error.
    pub async fn release_with(
        conn: &mut SqliteConnection,
        product_id: i64,
        quantity: i64,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE products SET available_units = available_units + ?1 WHERE id = ?2",
        )
        .bind(quantity)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(
                product_id,
                quantity,
                "Release on missing product ignored (deleted concurrently)"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::util::{now_millis, snowflake_id};

    async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("shop.db");
        let db = DbService::new(db_path.to_str().unwrap()).await.unwrap();
        (dir, db.pool)
    }

    async fn seed_product(pool: &SqlitePool, units: i64) -> i64 {
        let id = snowflake_id();
        sqlx::query(
            "INSERT INTO products (id, name, description, price, available_units, is_active, created_at) \
             VALUES (?1, 'Widget', '', 10000, ?2, 1, ?3)",
        )
        .bind(id)
        .bind(units)
        .bind(now_millis())
        .execute(pool)
        .await
        .unwrap();
        id
    }

    async fn units(pool: &SqlitePool, id: i64) -> i64 {
        sqlx::query_scalar("SELECT available_units FROM products WHERE id = ?1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reserve_decrements() {
        let (_dir, pool) = test_pool().await;
        let id = seed_product(&pool, 5).await;
        let ledger = InventoryLedger::new(pool.clone());

        ledger.reserve(id, 2).await.unwrap();
        assert_eq!(units(&pool, id).await, 3);
    }

    #[tokio::test]
    async fn test_reserve_fails_when_short() {
        let (_dir, pool) = test_pool().await;
        let id = seed_product(&pool, 1).await;
        let ledger = InventoryLedger::new(pool.clone());

        let err = ledger.reserve(id, 2).await.unwrap_err();
        match err {
            RepoError::OutOfStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, id);
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("expected OutOfStock, got {other:?}"),
        }
        // Nothing was decremented
        assert_eq!(units(&pool, id).await, 1);
    }

    #[tokio::test]
    async fn test_reserve_missing_product() {
        let (_dir, pool) = test_pool().await;
        let ledger = InventoryLedger::new(pool.clone());

        let err = ledger.reserve(12345, 1).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reserve_rejects_zero_quantity() {
        let (_dir, pool) = test_pool().await;
        let id = seed_product(&pool, 5).await;
        let ledger = InventoryLedger::new(pool.clone());

        let err = ledger.reserve(id, 0).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_release_restores_stock() {
        let (_dir, pool) = test_pool().await;
        let id = seed_product(&pool, 5).await;
        let ledger = InventoryLedger::new(pool.clone());

        ledger.reserve(id, 3).await.unwrap();
        ledger.release(id, 3).await.unwrap();
        assert_eq!(units(&pool, id).await, 5);
    }

    #[tokio::test]
    async fn test_release_on_missing_product_is_noop() {
        let (_dir, pool) = test_pool().await;
        let ledger = InventoryLedger::new(pool.clone());

        // Deleted-product release must not error
        ledger.release(99999, 4).await.unwrap();
    }
}
