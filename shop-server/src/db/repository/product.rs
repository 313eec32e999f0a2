//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::product::Product;
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

/// Raw product row
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: i64,
    image: Option<String>,
    available_units: i64,
    is_active: bool,
    created_at: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            image: row.image,
            available_units: row.available_units,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Name + price snapshot captured at order-placement time
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub name: String,
    pub price: i64,
}

/// Fields accepted by [`ProductRepository::create`]
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    /// Minor units, already parsed and validated
    pub price: i64,
    pub image: Option<String>,
    pub available_units: i64,
}

/// Fields accepted by [`ProductRepository::update`] (None = unchanged)
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image: Option<String>,
    pub available_units: Option<i64>,
    pub is_active: Option<bool>,
}

const SELECT_COLUMNS: &str =
    "id, name, description, price, image, available_units, is_active, created_at";

#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find all active products with stock (the storefront listing)
    pub async fn find_available(&self) -> RepoResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products \
             WHERE is_active = 1 AND available_units > 0 ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Find all products regardless of stock (the operator listing)
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Product>> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Product::from))
    }

    /// Read the name + unit price snapshot inside the caller's transaction.
    ///
    /// Placement totals are computed from this snapshot, in the same
    /// transaction as the reservation, so a concurrent price edit cannot
    /// split an order between old and new prices.
    pub async fn snapshot_with(
        conn: &mut SqliteConnection,
        product_id: i64,
    ) -> RepoResult<ProductSnapshot> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, price FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?;
        row.map(|(name, price)| ProductSnapshot { name, price })
            .ok_or_else(|| RepoError::NotFound(format!("Product {product_id}")))
    }

    /// Create a new product
    pub async fn create(&self, data: NewProduct) -> RepoResult<Product> {
        if data.available_units < 0 {
            return Err(RepoError::Validation(
                "available_units must not be negative".into(),
            ));
        }

        let id = snowflake_id();
        let created_at = now_millis();
        sqlx::query(
            "INSERT INTO products (id, name, description, price, image, available_units, is_active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.price)
        .bind(&data.image)
        .bind(data.available_units)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product (COALESCE keeps unset fields unchanged)
    pub async fn update(&self, id: i64, changes: ProductChanges) -> RepoResult<Product> {
        let result = sqlx::query(
            "UPDATE products SET \
                name = COALESCE(?1, name), \
                description = COALESCE(?2, description), \
                price = COALESCE(?3, price), \
                image = COALESCE(?4, image), \
                available_units = COALESCE(?5, available_units), \
                is_active = COALESCE(?6, is_active) \
             WHERE id = ?7",
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(&changes.image)
        .bind(changes.available_units)
        .bind(changes.is_active)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Product {id}")));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {id}")))
    }

    /// Hard delete a product
    ///
    /// Historical order items keep their snapshots; an in-flight release on
    /// the deleted row degrades to a logged no-op in the ledger.
    pub async fn delete(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Product {id}")));
        }
        Ok(())
    }
}
