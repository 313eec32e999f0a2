//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品管理接口 (运营方)
//! - [`orders`] - 下单、查询、取消接口 (店面)
//! - [`verify`] - 支付网关回调

pub mod health;
pub mod orders;
pub mod products;
pub mod verify;

// Re-export common types for handlers
pub use shared::error::{AppError, AppResult};
