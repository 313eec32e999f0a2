//! Shared types for the shop order engine
//!
//! Common types used across crates: domain models, the unified error
//! system, monetary helpers, and utility functions.

pub mod error;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::order::{Order, OrderItem, OrderStatus, PaymentStatus};
pub use models::product::Product;
