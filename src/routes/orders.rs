use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants::ERR_INVALID_USER_ID;
use crate::db::wallet;
use crate::error::{AppError, Result};
use crate::models::money::{format_baht, BahtAmount};
use crate::models::{Order, PayMethod, Profile};
use crate::routes::validation::{signed_payload, validate_signed_request};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub game_name: String,
    pub package_name: String,
    /// Resale price shown to the user, in baht (string or number)
    pub price: BahtAmount,
    /// Game/app account the package is delivered to
    pub uid: String,
    pub product_id: Option<String>,
    pub pay_method: PayMethod,
    pub signature: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: Order,
    /// Wallet balance after the deduction, in satang
    #[serde(rename = "newBalance")]
    pub new_balance: i64,
    /// Amount still owed by QR transfer, in satang (0 for wallet orders)
    pub remainder: i64,
}

/// Create an order, deducting from the wallet.
///
/// `wallet` pays the full price from the balance and fails with 400 when
/// the balance is short. `hybrid` deducts whatever the balance covers and
/// leaves the remainder to a separately generated QR transfer. The
/// deduction and the order row are committed in one transaction, so a
/// failed insert never eats the money and concurrent orders cannot
/// double-spend the same balance.
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    if !Profile::validate_id(&payload.user_id) {
        return Err(AppError::InvalidInput(ERR_INVALID_USER_ID.to_string()));
    }
    if payload.uid.trim().is_empty() {
        return Err(AppError::InvalidInput("Missing target account id".to_string()));
    }

    let price = payload
        .price
        .to_satang()
        .map_err(AppError::InvalidInput)?;
    if price <= 0 {
        return Err(AppError::InvalidInput("Price must be positive".to_string()));
    }

    validate_signed_request(
        &signed_payload(&payload.user_id, price, payload.timestamp),
        &payload.signature,
        payload.timestamp,
        &state.config.app_secret_key,
    )?;

    let now = Utc::now();
    let transaction_id = Order::transaction_id_at(now);
    let package_label = format!("{} - {}", payload.game_name, payload.package_name);

    let mut tx = state.pool.begin().await?;

    let (deducted, new_balance) = match payload.pay_method {
        PayMethod::Wallet => {
            let balance = wallet::debit_exact(&mut *tx, &payload.user_id, price).await?;
            (price, balance)
        }
        PayMethod::Hybrid => wallet::debit_available(&mut *tx, &payload.user_id, price).await?,
    };

    let remainder = price - deducted;
    let admin_note = format!(
        "Paid via {}: wallet {} / transfer {}",
        payload.pay_method.as_str(),
        format_baht(deducted),
        format_baht(remainder),
    );

    let order: Order = sqlx::query_as(
        "INSERT INTO orders
            (user_id, transaction_id, target_id, package_name, amount, price,
             status, product_id, admin_note)
         VALUES ($1, $2, $3, $4, $5, $5, 'pending', $6, $7)
         RETURNING id, user_id, transaction_id, target_id, package_name,
                   amount, price, status, product_id, admin_note, created_at",
    )
    .bind(&payload.user_id)
    .bind(&transaction_id)
    .bind(payload.uid.trim())
    .bind(&package_label)
    .bind(price)
    .bind(payload.product_id.as_deref().unwrap_or("api_product"))
    .bind(&admin_note)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Order {} created for user {}: {} satang ({} from wallet)",
        order.transaction_id,
        payload.user_id,
        price,
        deducted
    );

    Ok(Json(CreateOrderResponse {
        success: true,
        order,
        new_balance,
        remainder,
    }))
}
