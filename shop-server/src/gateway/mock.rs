//! Scriptable in-memory gateway for tests and local development
//!
//! Defaults to the happy path: every request yields an authority and every
//! verify succeeds. Failure modes are toggled per scenario.

use super::{PaymentGateway, PaymentRequest, Verification};
use async_trait::async_trait;
use shared::error::{AppError, AppResult};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockGateway {
    fail_requests: AtomicBool,
    fail_verify_transport: AtomicBool,
    reject_verify: Mutex<Option<String>>,
    request_count: AtomicUsize,
    verify_count: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `request_payment` fail as if the gateway were unreachable
    pub fn fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// Make `verify` fail at the transport level
    pub fn fail_verify_transport(&self, fail: bool) {
        self.fail_verify_transport.store(fail, Ordering::SeqCst);
    }

    /// Make `verify` come back as an explicit rejection
    pub fn reject_verify(&self, reason: impl Into<String>) {
        *self.reject_verify.lock().unwrap() = Some(reason.into());
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn verify_count(&self) -> usize {
        self.verify_count.load(Ordering::SeqCst)
    }

    /// The authority this mock issues for a given order
    pub fn authority_for(order_id: i64) -> String {
        format!("A{order_id}")
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn request_payment(
        &self,
        _amount: i64,
        _description: &str,
        order_id: i64,
    ) -> AppResult<PaymentRequest> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(AppError::gateway_unavailable("mock gateway down"));
        }
        let authority = Self::authority_for(order_id);
        Ok(PaymentRequest {
            url: format!("https://gateway.invalid/StartPay/{authority}"),
            authority,
        })
    }

    async fn verify(&self, authority: &str, _amount: i64) -> AppResult<Verification> {
        self.verify_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_verify_transport.load(Ordering::SeqCst) {
            return Err(AppError::gateway_unavailable("mock gateway down"));
        }
        if let Some(reason) = self.reject_verify.lock().unwrap().clone() {
            return Ok(Verification::Rejected { reason });
        }
        Ok(Verification::Verified {
            ref_id: format!("REF-{authority}"),
        })
    }
}
