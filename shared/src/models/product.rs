//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Unit price in minor units
    pub price: i64,
    /// Image reference (path or URL, storage is external)
    pub image: Option<String>,
    /// Units available for reservation (never negative)
    pub available_units: i64,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create product payload
///
/// `price` is a decimal string ("125.50"); it is parsed into minor units
/// before hitting storage so operator typos are rejected, not rounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub available_units: i64,
    pub image: Option<String>,
}

/// Update product payload (None = leave unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub available_units: Option<i64>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}
