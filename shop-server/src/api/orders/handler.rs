//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::orders;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::order::{Order, OrderDetail, PlaceOrderRequest};

/// POST /api/orders response; the storefront redirects to `payment_url`
#[derive(Debug, Serialize, Deserialize)]
pub struct PlacedOrderResponse {
    pub order_id: i64,
    pub total_amount: i64,
    pub payment_url: String,
}

/// POST /api/orders - 下单并请求支付
pub async fn place(
    State(state): State<ServerState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<PlacedOrderResponse>> {
    let placed = orders::place_order(&state, payload).await?;
    Ok(Json(PlacedOrderResponse {
        order_id: placed.order.id,
        total_amount: placed.order.total_amount,
        payment_url: placed.payment_url,
    }))
}

/// GET /api/orders/:id - 获取订单详情 (含条目)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state
        .order_repository()
        .find_detail(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id))?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub customer_ref: String,
}

/// GET /api/orders?customer_ref=... - 某客户的订单列表 (新单在前)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state
        .order_repository()
        .list_by_customer(&query.customer_ref)
        .await?;
    Ok(Json(orders))
}

/// POST /api/orders/:id/cancel - 取消订单并回补库存
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = orders::cancel_order(&state, id).await?;
    Ok(Json(order))
}
