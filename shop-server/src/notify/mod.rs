//! Notifier
//!
//! Delivers user-facing status messages. Fire-and-forget from the engine's
//! perspective: a notification failure never rolls back an order transition,
//! and the reconcile action only notifies after a transition it actually
//! won, so a replayed callback cannot re-notify.

pub mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use shared::models::order::Order;
use shared::money;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Payment verified, order confirmed
    async fn order_confirmed(&self, order: &Order);

    /// Payment was aborted or failed verification
    async fn payment_failed(&self, order: &Order, reason: &str);

    /// Order cancelled before payment
    async fn order_cancelled(&self, order: &Order);
}

pub fn confirmed_message(order: &Order) -> String {
    format!(
        "✅ Payment received\nOrder #{}\nReference: {}\nAmount: {}",
        order.id,
        order.gateway_ref.as_deref().unwrap_or("-"),
        money::format_units(order.total_amount)
    )
}

pub fn failed_message(order: &Order, reason: &str) -> String {
    format!("❌ Payment for order #{} failed: {}", order.id, reason)
}

pub fn cancelled_message(order: &Order) -> String {
    format!("Order #{} has been cancelled.", order.id)
}

/// Notifier that only writes to the log (default when no channel is configured)
#[derive(Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn order_confirmed(&self, order: &Order) {
        tracing::info!(
            order_id = order.id,
            customer = order.customer_ref.as_deref().unwrap_or("-"),
            "{}",
            confirmed_message(order)
        );
    }

    async fn payment_failed(&self, order: &Order, reason: &str) {
        tracing::info!(
            order_id = order.id,
            customer = order.customer_ref.as_deref().unwrap_or("-"),
            "{}",
            failed_message(order, reason)
        );
    }

    async fn order_cancelled(&self, order: &Order) {
        tracing::info!(
            order_id = order.id,
            customer = order.customer_ref.as_deref().unwrap_or("-"),
            "{}",
            cancelled_message(order)
        );
    }
}
