//! Payment Gateway Adapter
//!
//! The gateway is an unreliable, at-least-once-delivering collaborator:
//! requests can time out, and the verification callback can arrive late or
//! more than once. The adapter keeps transport concerns (timeout, one
//! retry) on its side of the seam; the reconcile action owns the state
//! machine.

pub mod mock;
pub mod zarinpal;

pub use mock::MockGateway;
pub use zarinpal::ZarinpalGateway;

use async_trait::async_trait;
use shared::error::AppResult;

/// Result of a successful payment request
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// URL the customer is redirected to
    pub url: String,
    /// Opaque token identifying this payment attempt
    pub authority: String,
}

/// Result of a verification call that reached the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified { ref_id: String },
    Rejected { reason: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Request a payment authority for `amount` minor units.
    ///
    /// Any failure (transport, timeout after the retry, explicit gateway
    /// rejection) surfaces as `GatewayUnavailable`; the caller's rollback
    /// path is identical in all cases.
    async fn request_payment(
        &self,
        amount: i64,
        description: &str,
        order_id: i64,
    ) -> AppResult<PaymentRequest>;

    /// Verify a payment attempt against the amount fixed on the order.
    ///
    /// An amount mismatch or unknown authority comes back as
    /// [`Verification::Rejected`], never silently corrected. `Err` means
    /// the gateway could not be reached at all.
    async fn verify(&self, authority: &str, amount: i64) -> AppResult<Verification>;
}
