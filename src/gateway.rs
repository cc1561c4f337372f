//! Client for the QR payment aggregator.
//!
//! Creating a payment is two sequential calls: `create_pay` registers the
//! intent and returns an `id_pay`, `detail_pay` returns the PromptPay QR
//! image and the exact satang amount the payer must transfer. Both respond
//! with `status: 1` on success and a `msg` otherwise.

use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::constants::GATEWAY_QR_TYPE;
use crate::error::{AppError, Result};
use crate::models::money::{format_baht, parse_satang, Satang};

/// Payment intent created by the gateway
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id_pay: String,
}

/// QR payment details for a created intent
#[derive(Debug, Clone)]
pub struct PaymentDetail {
    /// PNG image, base64 encoded (no data-URI prefix)
    pub qr_image_base64: String,
    /// Exact amount to transfer, in satang
    pub amount_check: Satang,
    /// Seconds until the QR expires
    pub time_out: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    id_pay: Option<Value>,
    #[serde(default)]
    qr_image_base64: Option<String>,
    #[serde(default)]
    amount_check: Option<Value>,
    #[serde(default)]
    time_out: Option<Value>,
}

impl GatewayResponse {
    fn reject_msg(&self, fallback: &str) -> AppError {
        AppError::GatewayRejected(self.msg.clone().unwrap_or_else(|| fallback.to_string()))
    }
}

/// The gateway is loose with types: ids and numbers arrive as either JSON
/// strings or numbers depending on the endpoint.
fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Payment gateway client
#[derive(Clone)]
pub struct PaymentGateway {
    http: reqwest::Client,
    api_url: String,
    username: String,
    password: String,
    con_id: String,
    promptpay_id: String,
}

impl PaymentGateway {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            api_url: config.gateway_api_url.clone(),
            username: config.gateway_username.clone(),
            password: config.gateway_password.clone(),
            con_id: config.gateway_con_id.clone(),
            promptpay_id: config.gateway_promptpay_id.clone(),
        }
    }

    /// Step 1: register a payment intent for `amount` satang.
    /// `ref1` is echoed back in the webhook and carries our reference.
    pub async fn create_pay(&self, amount: Satang, ref1: &str) -> Result<PaymentIntent> {
        tracing::info!("Gateway create_pay: {} satang, ref1={}", amount, ref1);

        let res: GatewayResponse = self
            .http
            .get(&self.api_url)
            .query(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
                ("amount", format_baht(amount).as_str()),
                ("ref1", ref1),
                ("con_id", self.con_id.as_str()),
                ("method", "create_pay"),
                ("ip", "127.0.0.1"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if res.status != 1 {
            tracing::warn!("Gateway create_pay failed: {:?}", res.msg);
            return Err(res.reject_msg("Create Pay Failed (External API)"));
        }

        let id_pay = res
            .id_pay
            .as_ref()
            .and_then(value_to_string)
            .ok_or_else(|| AppError::GatewayRejected("Gateway returned no id_pay".to_string()))?;

        Ok(PaymentIntent { id_pay })
    }

    /// Step 2: fetch the PromptPay QR image and the exact transfer amount
    pub async fn detail_pay(&self, id_pay: &str) -> Result<PaymentDetail> {
        tracing::info!("Gateway detail_pay: id_pay={}", id_pay);

        let res: GatewayResponse = self
            .http
            .get(&self.api_url)
            .query(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
                ("con_id", self.con_id.as_str()),
                ("id_pay", id_pay),
                ("type", GATEWAY_QR_TYPE),
                ("promptpay_id", self.promptpay_id.as_str()),
                ("method", "detail_pay"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if res.status != 1 {
            tracing::warn!("Gateway detail_pay failed: {:?}", res.msg);
            return Err(res.reject_msg("Get QR Failed (External API)"));
        }

        let qr_image_base64 = res
            .qr_image_base64
            .clone()
            .ok_or_else(|| AppError::GatewayRejected("Gateway returned no QR image".to_string()))?;

        // amount_check arrives as raw satang ("1901")
        let amount_check = res
            .amount_check
            .as_ref()
            .and_then(value_to_string)
            .ok_or_else(|| {
                AppError::GatewayRejected("Gateway returned no amount_check".to_string())
            })
            .and_then(|s| {
                parse_satang(&s).map_err(|e| {
                    AppError::GatewayRejected(format!("Bad amount_check from gateway: {}", e))
                })
            })?;

        let time_out = res.time_out.as_ref().and_then(value_to_i64);

        Ok(PaymentDetail {
            qr_image_base64,
            amount_check,
            time_out,
        })
    }
}
