//! Repository Module
//!
//! CRUD and the two storage primitives every correctness guarantee hangs on:
//! the inventory ledger's compare-and-decrement and the order store's
//! guarded status transition. Everything here is either a single SQL
//! statement or runs inside a caller-supplied transaction.

pub mod inventory;
pub mod order;
pub mod product;

// Re-exports
pub use inventory::InventoryLedger;
pub use order::{NewOrderItem, OrderRepository, TransitionFields};
pub use product::{NewProduct, ProductChanges, ProductRepository, ProductSnapshot};

use shared::error::AppError;
use shared::models::order::{OrderStatus, PaymentStatus};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Product {product_id} out of stock: {available} unit(s) available, {requested} requested")]
    OutOfStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    #[error("Order {order_id} transition rejected: current status {status:?}/{payment_status:?}")]
    TransitionConflict {
        order_id: i64,
        status: OrderStatus,
        payment_status: PaymentStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::OutOfStock { product_id, .. } => AppError::out_of_stock(product_id),
            RepoError::TransitionConflict { order_id, .. } => {
                AppError::transition_conflict(order_id)
            }
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
