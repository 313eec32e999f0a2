//! Reconcile gateway callbacks
//!
//! The gateway delivers its callback at least once: late, out of order, or
//! replayed. Safety comes from the order store's guarded transition: only
//! one caller can move an order out of AWAITING_PAYMENT, every other
//! attempt observes AlreadyReconciled and performs no side effects, and the
//! customer is notified exactly once per outcome.

use crate::core::ServerState;
use crate::db::repository::{
    InventoryLedger, OrderRepository, RepoError, TransitionFields,
};
use crate::gateway::Verification;
use shared::error::AppResult;
use shared::models::order::{Order, OrderStatus, PaymentStatus};

/// Outcome of one callback delivery
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// Payment verified, order confirmed
    Confirmed(Order),
    /// Payment aborted by the customer or rejected by verification
    Failed { order: Order, reason: String },
    /// The order already left AWAITING_PAYMENT (replayed or stale callback)
    AlreadyReconciled { status: OrderStatus },
    /// Unknown order id
    NotFound,
}

impl ReconcileOutcome {
    /// User-facing status string shown on the callback landing page
    pub fn user_message(&self) -> String {
        match self {
            Self::Confirmed(order) => format!(
                "Payment completed successfully. Your order #{} is confirmed. You can return to the shop.",
                order.id
            ),
            Self::Failed { order, .. } => format!(
                "Payment for order #{} was not completed. You can return to the shop and try again.",
                order.id
            ),
            Self::AlreadyReconciled { .. } => {
                "This order has already been processed.".to_string()
            }
            Self::NotFound => "Order not found.".to_string(),
        }
    }
}

/// Handle one delivery of the gateway's verification callback.
///
/// `ok` carries the gateway's two-valued status flag (`Status=OK`);
/// anything else is an abort. Safe to invoke any number of times with
/// identical arguments.
pub async fn handle_callback(
    state: &ServerState,
    authority: &str,
    ok: bool,
    order_id: i64,
) -> AppResult<ReconcileOutcome> {
    let repo = OrderRepository::new(state.pool.clone());

    let Some(order) = repo.find_by_id(order_id).await? else {
        tracing::warn!(order_id, "Callback for unknown order");
        return Ok(ReconcileOutcome::NotFound);
    };

    // Fast path for replays: the guard below would catch this anyway, but
    // skipping the verify call avoids hitting the gateway again.
    if order.status != OrderStatus::AwaitingPayment {
        tracing::debug!(
            order_id,
            status = order.status.as_str(),
            "Callback for already-reconciled order"
        );
        return Ok(ReconcileOutcome::AlreadyReconciled {
            status: order.status,
        });
    }

    // Customer aborted at the gateway
    if !ok {
        return fail_order(state, order_id, "payment was cancelled".to_string()).await;
    }

    // Verify against the gateway with the amount fixed on the order. A
    // transport failure propagates as an error response so the gateway
    // retries the delivery; the order stays AWAITING_PAYMENT.
    match state.gateway.verify(authority, order.total_amount).await? {
        Verification::Verified { ref_id } => {
            let result = repo
                .transition(
                    order_id,
                    &[OrderStatus::AwaitingPayment],
                    OrderStatus::Confirmed,
                    Some(PaymentStatus::Paid),
                    TransitionFields {
                        authority: None,
                        gateway_ref: Some(ref_id.clone()),
                    },
                )
                .await;
            match result {
                Ok(order) => {
                    tracing::info!(order_id, ref_id = %ref_id, "Payment confirmed");
                    state.notifier.order_confirmed(&order).await;
                    Ok(ReconcileOutcome::Confirmed(order))
                }
                Err(RepoError::TransitionConflict { status, .. }) => {
                    // A concurrent delivery won the transition; no re-notify
                    Ok(ReconcileOutcome::AlreadyReconciled { status })
                }
                Err(e) => Err(e.into()),
            }
        }
        Verification::Rejected { reason } => {
            tracing::info!(order_id, reason = %reason, "Payment verification rejected");
            fail_order(state, order_id, reason).await
        }
    }
}

/// Guarded transition to FAILED/FAILED plus the configured restock policy.
///
/// Restocking happens inside the same transaction as the transition, so a
/// replayed callback (whose transition loses the guard) can never restock a
/// second time.
async fn fail_order(
    state: &ServerState,
    order_id: i64,
    reason: String,
) -> AppResult<ReconcileOutcome> {
    let result: Result<Order, RepoError> = async {
        let mut tx = state.pool.begin().await?;
        let order = OrderRepository::transition_with(
            &mut tx,
            order_id,
            &[OrderStatus::AwaitingPayment],
            OrderStatus::Failed,
            Some(PaymentStatus::Failed),
            TransitionFields::default(),
        )
        .await?;

        // Default policy keeps the stock committed to the failed order for
        // manual review; the switch restocks immediately instead.
        if state.config.restock_on_payment_failure {
            let items = OrderRepository::items_with(&mut tx, order_id).await?;
            for item in &items {
                InventoryLedger::release_with(&mut tx, item.product_id, item.quantity).await?;
            }
        }

        tx.commit().await?;
        Ok(order)
    }
    .await;

    match result {
        Ok(order) => {
            tracing::info!(order_id, reason = %reason, "Order failed");
            state.notifier.payment_failed(&order, &reason).await;
            Ok(ReconcileOutcome::Failed { order, reason })
        }
        Err(RepoError::TransitionConflict { status, .. }) => {
            Ok(ReconcileOutcome::AlreadyReconciled { status })
        }
        Err(e) => Err(e.into()),
    }
}
