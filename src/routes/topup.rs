use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants::{ERR_INVALID_TOPUP_AMOUNT, ERR_INVALID_USER_ID};
use crate::error::{AppError, Result};
use crate::models::money::BahtAmount;
use crate::models::{Profile, Topup};
use crate::routes::validation::{signed_payload, validate_signed_request};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateQrRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Top-up amount in baht (string or number)
    pub amount: BahtAmount,
    pub signature: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateQrResponse {
    pub success: bool,
    /// data-URI PNG, ready for an <img> tag
    pub qr_image: String,
    /// Exact amount to transfer, in satang. The gateway salts the satang
    /// digits so it can match the incoming transfer to this payment.
    pub amount_check: i64,
    /// Seconds until the QR expires
    pub time_out: Option<i64>,
    pub transaction_id: String,
}

/// Create a QR top-up: pending ledger row first, then the two gateway
/// calls, then the gateway ids written back to the row.
///
/// The row stays `pending` until the gateway webhook (or an admin)
/// settles it; creating a QR never touches the wallet balance.
pub async fn create_topup_qr(
    State(state): State<AppState>,
    Json(payload): Json<CreateQrRequest>,
) -> Result<Json<CreateQrResponse>> {
    if !Profile::validate_id(&payload.user_id) {
        return Err(AppError::InvalidInput(ERR_INVALID_USER_ID.to_string()));
    }

    let amount = payload
        .amount
        .to_satang()
        .map_err(AppError::InvalidInput)?;
    if !Topup::validate_amount(amount) {
        return Err(AppError::InvalidInput(ERR_INVALID_TOPUP_AMOUNT.to_string()));
    }

    validate_signed_request(
        &signed_payload(&payload.user_id, amount, payload.timestamp),
        &payload.signature,
        payload.timestamp,
        &state.config.app_secret_key,
    )?;

    // The profile must exist before we hand out a QR in its name
    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM profiles WHERE id = $1")
        .bind(&payload.user_id)
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::UserNotFound);
    }

    tracing::info!(
        "Starting topup for user {}: {} satang",
        payload.user_id,
        amount
    );

    let transaction_id = Topup::transaction_id_at(Utc::now());

    let topup: Topup = sqlx::query_as(
        "INSERT INTO topups (user_id, transaction_id, amount, status)
         VALUES ($1, $2, $3, 'pending')
         RETURNING id, user_id, transaction_id, external_id, amount, amount_check, status, created_at",
    )
    .bind(&payload.user_id)
    .bind(&transaction_id)
    .bind(amount)
    .fetch_one(&state.pool)
    .await?;

    // Two sequential gateway calls: payment intent, then the QR image.
    // On failure the pending row is left behind for reconciliation; it can
    // never be credited without a gateway settlement.
    let intent = state.gateway.create_pay(amount, &payload.user_id).await?;
    let detail = state.gateway.detail_pay(&intent.id_pay).await?;

    sqlx::query("UPDATE topups SET external_id = $2, amount_check = $3 WHERE id = $1")
        .bind(topup.id)
        .bind(&intent.id_pay)
        .bind(detail.amount_check)
        .execute(&state.pool)
        .await?;

    tracing::info!(
        "Topup {} ready: id_pay={}, amount_check={}",
        transaction_id,
        intent.id_pay,
        detail.amount_check
    );

    Ok(Json(CreateQrResponse {
        success: true,
        qr_image: format!("data:image/png;base64,{}", detail.qr_image_base64),
        amount_check: detail.amount_check,
        time_out: detail.time_out,
        transaction_id,
    }))
}
