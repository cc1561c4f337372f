use axum::{extract::State, Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::wallet;
use crate::models::money::{format_baht, value_to_satang, Satang};
use crate::security::verify_gateway_signature;
use crate::AppState;

/// Webhooks always answer 200: `status: 1` tells the gateway we are done
/// with the event (including "unknown/already processed", so it stops
/// retrying), `status: 0` that it should try again later.
fn ack() -> Json<Value> {
    Json(json!({ "status": 1 }))
}

fn ack_msg(msg: &str) -> Json<Value> {
    Json(json!({ "status": 1, "msg": msg }))
}

fn nack(msg: &str) -> Json<Value> {
    Json(json!({ "status": 0, "msg": msg }))
}

// =============================================================================
// Signed form variant (QR gateway)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignedWebhookForm {
    /// Raw JSON payload, signed as-is
    pub data: Option<String>,
    /// hex MD5 of "<data>:<api_key>"
    pub signature: Option<String>,
}

/// Payload inside the signed `data` field
#[derive(Debug, Deserialize)]
pub struct SignedWebhookData {
    pub id_pay: Value,
    #[serde(default)]
    pub ref1: Option<String>,
    pub amount: Value,
}

/// Parse the signed payload into (id_pay, ref1, satang amount)
pub fn parse_signed_payload(data: &str) -> Result<(String, Option<String>, Satang), String> {
    let parsed: SignedWebhookData =
        serde_json::from_str(data).map_err(|e| format!("Bad webhook payload: {}", e))?;

    let id_pay = match &parsed.id_pay {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(format!("Bad id_pay: {}", other)),
    };

    let amount = value_to_satang(&parsed.amount)?;

    Ok((id_pay, parsed.ref1, amount))
}

/// Signed QR gateway webhook: form-encoded `data` + `signature`.
///
/// A matching pending topup is flipped to success and the wallet credited
/// with loyalty points, all in one transaction keyed on the status flip,
/// so redelivered webhooks are no-ops.
pub async fn gateway_webhook(
    State(state): State<AppState>,
    Form(form): Form<SignedWebhookForm>,
) -> Json<Value> {
    let (Some(data), Some(signature)) = (form.data, form.signature) else {
        return nack("Missing data");
    };

    if !verify_gateway_signature(&data, &signature, &state.config.gateway_api_key) {
        tracing::error!("Webhook signature mismatch");
        return nack("Invalid Signature");
    }

    let (id_pay, ref1, amount) = match parse_signed_payload(&data) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!("Webhook payload error: {}", e);
            return nack(&e);
        }
    };

    // The gateway's dashboard test fires with a "test-" reference;
    // acknowledge it without touching the ledger
    if ref1.as_deref().is_some_and(|r| r.starts_with("test-")) {
        tracing::info!("Gateway webhook test received");
        return ack();
    }

    match wallet::settle_by_external_id(&state.pool, &id_pay, amount).await {
        Ok(Some(topup)) => {
            tracing::info!(
                "Topup settled via webhook: user {}, {} satang",
                topup.user_id,
                amount
            );
            state.notifier.send_detached(format!(
                "<b>Wallet credited (QR)</b>\nAmount: {} baht\nUser: <code>{}</code>",
                format_baht(amount),
                topup.user_id
            ));
            ack()
        }
        Ok(None) => {
            tracing::warn!("Webhook for unknown or settled payment: {}", id_pay);
            ack_msg("Transaction not found or already processed")
        }
        Err(e) => {
            tracing::error!("Webhook settlement error: {:?}", e);
            nack("Internal error")
        }
    }
}

// =============================================================================
// JSON variant (second gateway)
// =============================================================================

/// Normalized payment event from the JSON webhook variant
#[derive(Debug, PartialEq)]
pub struct PaymentEvent {
    pub ref_no: String,
    pub amount: Satang,
    pub completed: bool,
}

/// Normalize the JSON webhook body. The payload sits either at the top
/// level or nested under `data`; the reference is `ref1` or `trans_id`;
/// success is `payment_status`/`status` of "completed" or "1"/1.
pub fn normalize_payment_event(body: &Value) -> Result<PaymentEvent, String> {
    let data = body.get("data").unwrap_or(body);

    let ref_no = data
        .get("ref1")
        .or_else(|| data.get("trans_id"))
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .ok_or_else(|| "Missing ref1/trans_id".to_string())?;

    let status = data
        .get("payment_status")
        .or_else(|| data.get("status"))
        .ok_or_else(|| "Missing payment status".to_string())?;

    let completed = match status {
        Value::String(s) => s == "completed" || s == "1",
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    };

    let amount = data
        .get("amount")
        .map(value_to_satang)
        .transpose()?
        .unwrap_or(0);

    Ok(PaymentEvent {
        ref_no,
        amount,
        completed,
    })
}

/// JSON payment webhook: settles the pending topup matching the event's
/// reference. Non-completed events are acknowledged and ignored.
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    tracing::info!("Payment webhook: {}", body);

    let event = match normalize_payment_event(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Webhook payload error: {}", e);
            return nack(&e);
        }
    };

    if !event.completed {
        return ack();
    }

    if event.amount <= 0 {
        tracing::error!("Completed payment with non-positive amount: {:?}", event);
        return nack("Bad amount");
    }

    match wallet::settle_by_transaction_id(&state.pool, &event.ref_no, event.amount).await {
        Ok(Some(topup)) => {
            state.notifier.send_detached(format!(
                "<b>Wallet credited (auto)</b>\nAmount: {} baht\nUser: <code>{}</code>",
                format_baht(event.amount),
                topup.user_id
            ));
            ack()
        }
        Ok(None) => ack_msg("Transaction not found or already processed"),
        Err(e) => {
            tracing::error!("Webhook settlement error: {:?}", e);
            nack("Internal error")
        }
    }
}
