//! Telegram notifier
//!
//! Sends order status messages to the customer's chat via the Bot API.
//! The customer reference on an order is the chat id; anonymous orders are
//! skipped. Delivery errors are logged and swallowed.

use super::{Notifier, cancelled_message, confirmed_message, failed_message};
use async_trait::async_trait;
use shared::models::order::Order;

pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token,
        }
    }

    async fn send(&self, order: &Order, text: String) {
        let Some(chat_id) = order.customer_ref.as_deref() else {
            tracing::debug!(order_id = order.id, "Anonymous order, no notification sent");
            return;
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let body = serde_json::json!({ "chat_id": chat_id, "text": text });

        match self.client.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(order_id = order.id, chat_id, "Notification delivered");
            }
            Ok(resp) => {
                tracing::warn!(
                    order_id = order.id,
                    chat_id,
                    status = %resp.status(),
                    "Telegram rejected notification"
                );
            }
            Err(e) => {
                tracing::warn!(order_id = order.id, chat_id, error = %e, "Notification failed");
            }
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn order_confirmed(&self, order: &Order) {
        self.send(order, confirmed_message(order)).await;
    }

    async fn payment_failed(&self, order: &Order, reason: &str) {
        self.send(order, failed_message(order, reason)).await;
    }

    async fn order_cancelled(&self, order: &Order) {
        self.send(order, cancelled_message(order)).await;
    }
}
