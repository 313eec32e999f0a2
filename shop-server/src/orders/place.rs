//! Place order
//!
//! Reservation and order creation run in one SQLite transaction: either the
//! whole order exists with its stock decremented, or nothing does. The
//! gateway request happens after commit (a network call never holds a
//! write transaction open), and a gateway failure compensates by cancelling
//! the order and releasing every reservation.

use crate::core::ServerState;
use crate::db::repository::{
    InventoryLedger, NewOrderItem, OrderRepository, ProductRepository, RepoError, TransitionFields,
};
use crate::orders::cancel;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::order::{Order, OrderStatus, PaymentStatus, PlaceOrderRequest};
use shared::money::MAX_QUANTITY;

/// Result of a successful placement
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub payment_url: String,
}

/// Place an order against finite inventory and request payment for it.
///
/// After this returns Ok, the order is `AWAITING_PAYMENT` with its stock
/// reserved. After any Err, no reservation is held: validation and
/// reservation failures roll back the transaction, gateway failures leave
/// the order `CANCELLED` with the stock released. No other state is
/// observable.
pub async fn place_order(state: &ServerState, request: PlaceOrderRequest) -> AppResult<PlacedOrder> {
    validate(&request)?;

    // Phase 1: reserve stock and create the order atomically.
    // Price snapshots are read inside the same transaction, so a concurrent
    // price edit cannot produce a mixed total.
    let mut tx = state.pool.begin().await.map_err(db_err)?;

    let mut items = Vec::with_capacity(request.items.len());
    for line in &request.items {
        InventoryLedger::reserve_with(&mut tx, line.product_id, line.quantity)
            .await
            .map_err(|e| map_product_err(e, line.product_id))?;
        let snapshot = ProductRepository::snapshot_with(&mut tx, line.product_id)
            .await
            .map_err(|e| map_product_err(e, line.product_id))?;
        items.push(NewOrderItem {
            product_id: line.product_id,
            name: snapshot.name,
            unit_price: snapshot.price,
            quantity: line.quantity,
        });
    }

    let order = OrderRepository::create_with(&mut tx, request.customer_ref.clone(), &items).await?;
    tx.commit().await.map_err(db_err)?;

    tracing::info!(
        order_id = order.id,
        total = order.total_amount,
        items = items.len(),
        "Order created, requesting payment"
    );

    // Phase 2: obtain a payment authority. Bounded timeout and one retry
    // live inside the adapter; any failure here must not leave the order in
    // PENDING or the stock reserved.
    let description = payment_description(&order, &items);
    let payment = match state
        .gateway
        .request_payment(order.total_amount, &description, order.id)
        .await
    {
        Ok(payment) => payment,
        Err(gateway_err) => {
            tracing::warn!(
                order_id = order.id,
                error = %gateway_err,
                "Payment request failed, rolling back reservation"
            );
            cancel::abort_pending(state, order.id).await;
            return Err(gateway_err);
        }
    };

    // Phase 3: the order is now waiting for the gateway's callback
    let repo = OrderRepository::new(state.pool.clone());
    let order = repo
        .transition(
            order.id,
            &[OrderStatus::Pending],
            OrderStatus::AwaitingPayment,
            Some(PaymentStatus::AwaitingVerification),
            TransitionFields {
                authority: Some(payment.authority.clone()),
                gateway_ref: None,
            },
        )
        .await?;

    tracing::info!(
        order_id = order.id,
        authority = %payment.authority,
        "Order awaiting payment"
    );

    Ok(PlacedOrder {
        order,
        payment_url: payment.url,
    })
}

fn validate(request: &PlaceOrderRequest) -> AppResult<()> {
    if request.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    let mut seen = std::collections::HashSet::new();
    for line in &request.items {
        if line.quantity < 1 {
            return Err(AppError::validation(format!(
                "quantity must be at least 1, got {}",
                line.quantity
            ))
            .with_detail("product_id", line.product_id));
        }
        if line.quantity > MAX_QUANTITY {
            return Err(AppError::validation(format!(
                "quantity exceeds maximum allowed ({MAX_QUANTITY})"
            ))
            .with_detail("product_id", line.product_id));
        }
        if !seen.insert(line.product_id) {
            return Err(AppError::validation("duplicate product in order")
                .with_detail("product_id", line.product_id));
        }
    }
    Ok(())
}

/// Human-readable description sent to the gateway, one line per item
fn payment_description(order: &Order, items: &[NewOrderItem]) -> String {
    let mut description = format!("Order #{}\n", order.id);
    for item in items {
        description.push_str(&format!("{} ({}x)\n", item.name, item.quantity));
    }
    description
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::database(e.to_string())
}

/// A vanished product during placement is PRODUCT_NOT_FOUND to the caller
fn map_product_err(e: RepoError, product_id: i64) -> AppError {
    match e {
        RepoError::NotFound(_) => {
            AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", product_id)
        }
        other => other.into(),
    }
}
