//! Cancel order
//!
//! Cancellation is a guarded transition plus the compensating stock
//! release, both in one transaction. Only non-terminal, unpaid orders can
//! be cancelled; a paid order is rejected with ALREADY_PAID.

use crate::core::ServerState;
use crate::db::repository::{
    InventoryLedger, OrderRepository, RepoError, TransitionFields,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::order::{Order, OrderStatus, PaymentStatus};

/// Cancel an order on behalf of the customer or operator.
///
/// Restores `available_units` for every line item. Terminal orders are
/// rejected: `ALREADY_PAID` for confirmed/paid orders, `ALREADY_CANCELLED`
/// for orders already cancelled.
pub async fn cancel_order(state: &ServerState, order_id: i64) -> AppResult<Order> {
    let order = cancel_with_expected(
        state,
        order_id,
        &[OrderStatus::Pending, OrderStatus::AwaitingPayment],
        None,
    )
    .await
    .map_err(|e| match e {
        RepoError::TransitionConflict {
            order_id,
            status,
            payment_status,
        } => {
            if status == OrderStatus::Confirmed || payment_status == PaymentStatus::Paid {
                AppError::already_paid(order_id)
            } else if status == OrderStatus::Cancelled {
                AppError::already_cancelled(order_id)
            } else {
                AppError::transition_conflict(order_id)
            }
        }
        RepoError::NotFound(_) => {
            AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
        }
        other => other.into(),
    })?;

    tracing::info!(order_id = order.id, "Order cancelled, stock released");
    state.notifier.order_cancelled(&order).await;
    Ok(order)
}

/// Roll back a freshly created order after a failed payment request.
///
/// Best effort: the placement call already reports GATEWAY_UNAVAILABLE to
/// the customer; a failure here is logged for operator attention instead
/// of masking that error.
pub(crate) async fn abort_pending(state: &ServerState, order_id: i64) {
    let result = cancel_with_expected(
        state,
        order_id,
        &[OrderStatus::Pending],
        Some(PaymentStatus::Failed),
    )
    .await;
    if let Err(e) = result {
        tracing::error!(
            order_id,
            error = %e,
            "Failed to roll back order after gateway failure"
        );
    }
}

/// Transition to CANCELLED and release every line item, atomically.
async fn cancel_with_expected(
    state: &ServerState,
    order_id: i64,
    expected: &[OrderStatus],
    new_payment: Option<PaymentStatus>,
) -> Result<Order, RepoError> {
    let mut tx = state.pool.begin().await?;

    let order = OrderRepository::transition_with(
        &mut tx,
        order_id,
        expected,
        OrderStatus::Cancelled,
        new_payment,
        TransitionFields::default(),
    )
    .await?;

    let items = OrderRepository::items_with(&mut tx, order_id).await?;
    for item in &items {
        InventoryLedger::release_with(&mut tx, item.product_id, item.quantity).await?;
    }

    tx.commit().await?;
    Ok(order)
}
