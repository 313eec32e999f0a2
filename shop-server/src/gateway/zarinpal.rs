//! Zarinpal gateway integration via REST API (no SDK dependency)
//!
//! Request/verify flow: `request.json` issues an authority token and the
//! customer is redirected to `StartPay/{authority}`; after the callback we
//! call `verify.json` with the amount fixed on the order. Code 100 means
//! success; anything else on verify is an explicit rejection.

use super::{PaymentGateway, PaymentRequest, Verification};
use crate::core::GatewayConfig;
use async_trait::async_trait;
use shared::error::{AppError, AppResult};
use std::time::Duration;

const PRODUCTION_BASE: &str = "https://api.zarinpal.com/pg";
const SANDBOX_BASE: &str = "https://sandbox.zarinpal.com/pg";

/// Backoff before the single transport retry
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

pub struct ZarinpalGateway {
    client: reqwest::Client,
    merchant_id: String,
    base_url: String,
    callback_url: String,
}

impl ZarinpalGateway {
    pub fn new(config: &GatewayConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| {
                AppError::with_message(
                    shared::error::ErrorCode::ConfigError,
                    format!("Failed to build gateway HTTP client: {e}"),
                )
            })?;

        let base_url = if config.sandbox {
            SANDBOX_BASE
        } else {
            PRODUCTION_BASE
        };

        Ok(Self {
            client,
            merchant_id: config.merchant_id.clone(),
            base_url: base_url.to_string(),
            callback_url: config.callback_url.clone(),
        })
    }

    async fn post_once(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, reqwest::Error> {
        self.client.post(url).json(body).send().await?.json().await
    }

    /// One retry with a short backoff on transport faults, then give up.
    async fn post_with_retry(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> AppResult<serde_json::Value> {
        match self.post_once(url, body).await {
            Ok(value) => Ok(value),
            Err(first) => {
                tracing::warn!(error = %first, url, "Gateway request failed, retrying once");
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.post_once(url, body).await.map_err(|e| {
                    AppError::gateway_unavailable(format!("payment gateway unreachable: {e}"))
                })
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for ZarinpalGateway {
    async fn request_payment(
        &self,
        amount: i64,
        description: &str,
        order_id: i64,
    ) -> AppResult<PaymentRequest> {
        let body = serde_json::json!({
            "merchant_id": self.merchant_id,
            "amount": amount,
            "description": description,
            "callback_url": format!("{}?order_id={}", self.callback_url, order_id),
        });

        let resp = self
            .post_with_retry(&format!("{}/v4/payment/request.json", self.base_url), &body)
            .await?;

        let code = resp["data"]["code"].as_i64().unwrap_or(i64::MIN);
        if code != 100 {
            let message = resp["errors"]["message"].as_str().unwrap_or("unknown error");
            return Err(AppError::gateway_unavailable(format!(
                "payment request rejected (code {code}): {message}"
            )));
        }

        let authority = resp["data"]["authority"]
            .as_str()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                AppError::gateway_unavailable("payment request response missing authority")
            })?
            .to_string();

        Ok(PaymentRequest {
            url: format!("{}/StartPay/{}", self.base_url, authority),
            authority,
        })
    }

    async fn verify(&self, authority: &str, amount: i64) -> AppResult<Verification> {
        let body = serde_json::json!({
            "merchant_id": self.merchant_id,
            "amount": amount,
            "authority": authority,
        });

        let resp = self
            .post_with_retry(&format!("{}/v4/payment/verify.json", self.base_url), &body)
            .await?;

        let code = resp["data"]["code"].as_i64().unwrap_or(i64::MIN);
        if code == 100 {
            // ref_id comes back as a number
            let ref_id = match &resp["data"]["ref_id"] {
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::String(s) => s.clone(),
                _ => {
                    return Err(AppError::gateway_unavailable(
                        "verify response missing ref_id",
                    ));
                }
            };
            return Ok(Verification::Verified { ref_id });
        }

        let error_code = resp["errors"]["code"].as_i64().unwrap_or(code);
        Ok(Verification::Rejected {
            reason: reason_for_code(error_code),
        })
    }
}

/// English rendering of the gateway's error codes
fn reason_for_code(code: i64) -> String {
    match code {
        -9 => "invalid payment information".to_string(),
        -10 => "invalid merchant id or IP".to_string(),
        -11 => "merchant id is not active".to_string(),
        -12 => "too many attempts, try again later".to_string(),
        -50 => "paid amount differs from the verified amount".to_string(),
        -51 => "payment was unsuccessful".to_string(),
        -53 => "authority does not belong to this merchant".to_string(),
        -54 => "invalid authority".to_string(),
        other => format!("gateway error ({other})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_for_known_codes() {
        assert_eq!(
            reason_for_code(-50),
            "paid amount differs from the verified amount"
        );
        assert_eq!(reason_for_code(-54), "invalid authority");
    }

    #[test]
    fn test_reason_for_unknown_code() {
        assert_eq!(reason_for_code(-99), "gateway error (-99)");
    }
}
