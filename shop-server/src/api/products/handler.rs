//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::{NewProduct, ProductChanges};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::product::{Product, ProductCreate, ProductUpdate};
use shared::money;

fn parse_price(value: &str) -> AppResult<i64> {
    money::parse_units(value).map_err(|e| {
        AppError::new(ErrorCode::ProductInvalidPrice).with_detail("price", e.to_string())
    })
}

/// GET /api/products - 获取所有商品 (运营方视图)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.product_repository().find_all().await?;
    Ok(Json(products))
}

/// GET /api/products/available - 获取有库存的商品 (店面列表)
pub async fn list_available(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.product_repository().find_available().await?;
    Ok(Json(products))
}

/// GET /api/products/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = state
        .product_repository()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id))?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    if payload.available_units < 0 {
        return Err(AppError::validation("available_units must not be negative"));
    }

    let price = parse_price(&payload.price)?;
    let product = state
        .product_repository()
        .create(NewProduct {
            name: payload.name,
            description: payload.description.unwrap_or_default(),
            price,
            image: payload.image,
            available_units: payload.available_units,
        })
        .await?;

    tracing::info!(product_id = product.id, "Product created");
    Ok(Json(product))
}

/// PUT /api/products/:id - 更新商品
///
/// Price edits never touch existing orders: totals are snapshots taken at
/// placement time.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    if payload.available_units.is_some_and(|u| u < 0) {
        return Err(AppError::validation("available_units must not be negative"));
    }

    let price = payload.price.as_deref().map(parse_price).transpose()?;
    let product = state
        .product_repository()
        .update(
            id,
            ProductChanges {
                name: payload.name,
                description: payload.description,
                price,
                image: payload.image,
                available_units: payload.available_units,
                is_active: payload.is_active,
            },
        )
        .await
        .map_err(map_not_found)?;

    Ok(Json(product))
}

/// DELETE /api/products/:id - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state
        .product_repository()
        .delete(id)
        .await
        .map_err(map_not_found)?;
    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(true))
}

fn map_not_found(e: crate::db::repository::RepoError) -> AppError {
    match e {
        crate::db::repository::RepoError::NotFound(msg) => {
            AppError::with_message(ErrorCode::ProductNotFound, format!("{msg} not found"))
        }
        other => other.into(),
    }
}
