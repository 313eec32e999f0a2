//! Order Model
//!
//! Order lifecycle states and the parallel payment status. Transitions are
//! enforced by the order store's guarded UPDATE; the enums here only encode
//! which states exist and which of them are terminal.

use serde::{Deserialize, Serialize};

/// Order status
///
/// `PENDING` is the creation state (no payment requested yet); a successful
/// gateway request moves the order to `AWAITING_PAYMENT`. `CONFIRMED`,
/// `FAILED` and `CANCELLED` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    AwaitingPayment,
    Confirmed,
    Failed,
    Cancelled,
}

impl OrderStatus {
    /// No transition is permitted out of a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed | Self::Cancelled)
    }

    /// Cancellation is only allowed before the order reaches a terminal state
    pub fn can_cancel(&self) -> bool {
        matches!(self, Self::Pending | Self::AwaitingPayment)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::AwaitingPayment => "AWAITING_PAYMENT",
            Self::Confirmed => "CONFIRMED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "AWAITING_PAYMENT" => Some(Self::AwaitingPayment),
            "CONFIRMED" => Some(Self::Confirmed),
            "FAILED" => Some(Self::Failed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Payment status, tracked in parallel with [`OrderStatus`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    NotPaid,
    AwaitingVerification,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotPaid => "NOT_PAID",
            Self::AwaitingVerification => "AWAITING_VERIFICATION",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NOT_PAID" => Some(Self::NotPaid),
            "AWAITING_VERIFICATION" => Some(Self::AwaitingVerification),
            "PAID" => Some(Self::Paid),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Owning customer reference (None for anonymous web orders).
    /// For the Telegram storefront this is the chat id.
    pub customer_ref: Option<String>,
    /// Total in minor units, fixed at creation from line-item snapshots
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Gateway authority token, set when payment is requested
    pub authority: Option<String>,
    /// Gateway reference id, set only on confirmed payment
    pub gateway_ref: Option<String>,
    pub created_at: i64,
}

/// Order line item (immutable after creation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: i64,
    pub product_id: i64,
    /// Product name snapshot, used for the gateway payment description
    pub name: String,
    /// Unit price snapshot in minor units
    pub unit_price: i64,
    pub quantity: i64,
}

/// Order with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Requested order line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub product_id: i64,
    pub quantity: i64,
}

/// Place-order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_ref: Option<String>,
    pub items: Vec<LineItemInput>,
}
