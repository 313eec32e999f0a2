//! Payment callback handler
//!
//! GET /verify?Authority=...&Status=OK&order_id=...
//!
//! The gateway redirects the customer here and may retry the delivery.
//! Every reconcile outcome, including already-reconciled and unknown
//! orders, answers HTTP 200 with a user-facing status string, so a retry
//! is never mistaken for a delivery failure. Only a transient verification
//! outage answers with an error status, which makes the gateway try again.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::core::ServerState;
use crate::orders;

/// Callback query parameters (the gateway capitalizes its own keys)
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "Authority", alias = "authority")]
    pub authority: String,
    #[serde(rename = "Status", alias = "status")]
    pub status: String,
    pub order_id: i64,
}

pub async fn verify(
    State(state): State<ServerState>,
    Query(query): Query<VerifyQuery>,
) -> (StatusCode, String) {
    // The status flag is two-valued: "OK" proceeds, anything else aborts
    let ok = query.status == "OK";

    match orders::handle_callback(&state, &query.authority, ok, query.order_id).await {
        Ok(outcome) => (StatusCode::OK, outcome.user_message()),
        Err(e) => {
            tracing::warn!(
                order_id = query.order_id,
                error = %e,
                "Callback handling failed, gateway will retry"
            );
            (
                e.http_status(),
                "Payment verification is temporarily unavailable. Please try again shortly."
                    .to_string(),
            )
        }
    }
}
