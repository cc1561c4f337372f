use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::wallet;
use crate::error::{AppError, Result};
use crate::models::money::format_baht;
use crate::models::{Order, OrderStatus, ProductSetting, Topup};
use crate::AppState;

/// Query parameters for admin endpoints
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    /// Admin secret key for authentication
    pub key: String,
    /// Optional status filter for list endpoints
    pub status: Option<String>,
}

/// Verify the admin secret key. Admin endpoints are disabled entirely
/// when no key is configured.
fn require_admin(state: &AppState, key: &str) -> Result<()> {
    let admin_key = state
        .config
        .admin_secret_key
        .as_ref()
        .ok_or(AppError::Unauthorized)?;

    if key != admin_key {
        tracing::warn!("Invalid admin key attempt");
        return Err(AppError::Unauthorized);
    }

    Ok(())
}

// =============================================================================
// Top-ups
// =============================================================================

/// List recent top-ups, optionally filtered by status
///
/// GET /admin/topups?key=<admin_secret_key>[&status=pending]
pub async fn list_topups(
    State(state): State<AppState>,
    Query(params): Query<AdminQuery>,
) -> Result<Json<Vec<Topup>>> {
    require_admin(&state, &params.key)?;

    let topups: Vec<Topup> = match params.status {
        Some(status) => {
            sqlx::query_as(
                "SELECT id, user_id, transaction_id, external_id, amount, amount_check, status, created_at
                 FROM topups WHERE status = $1 ORDER BY created_at DESC LIMIT 200",
            )
            .bind(status)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT id, user_id, transaction_id, external_id, amount, amount_check, status, created_at
                 FROM topups ORDER BY created_at DESC LIMIT 200",
            )
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(Json(topups))
}

#[derive(Debug, Serialize)]
pub struct TopupActionResponse {
    pub success: bool,
    pub topup: Topup,
}

/// Manually approve a pending top-up, crediting the wallet through the
/// same atomic settlement path the webhook uses
///
/// POST /admin/topups/:id/approve?key=<admin_secret_key>
pub async fn approve_topup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<AdminQuery>,
) -> Result<Json<TopupActionResponse>> {
    require_admin(&state, &params.key)?;

    let topup = wallet::approve_topup(&state.pool, id).await?;

    state.notifier.send_detached(format!(
        "<b>Wallet credited (manual)</b>\nAmount: {} baht\nUser: <code>{}</code>",
        format_baht(topup.amount),
        topup.user_id
    ));

    Ok(Json(TopupActionResponse {
        success: true,
        topup,
    }))
}

/// Cancel a pending top-up; settled rows are left alone
///
/// POST /admin/topups/:id/cancel?key=<admin_secret_key>
pub async fn cancel_topup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<AdminQuery>,
) -> Result<Json<TopupActionResponse>> {
    require_admin(&state, &params.key)?;

    let topup = wallet::cancel_topup(&state.pool, id).await?;

    Ok(Json(TopupActionResponse {
        success: true,
        topup,
    }))
}

// =============================================================================
// Orders
// =============================================================================

/// List recent orders, optionally filtered by status
///
/// GET /admin/orders?key=<admin_secret_key>[&status=pending]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<AdminQuery>,
) -> Result<Json<Vec<Order>>> {
    require_admin(&state, &params.key)?;

    let orders: Vec<Order> = match params.status {
        Some(status) => {
            sqlx::query_as(
                "SELECT id, user_id, transaction_id, target_id, package_name, amount, price,
                        status, product_id, admin_note, created_at
                 FROM orders WHERE status = $1 ORDER BY created_at DESC LIMIT 200",
            )
            .bind(status)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT id, user_id, transaction_id, target_id, package_name, amount, price,
                        status, product_id, admin_note, created_at
                 FROM orders ORDER BY created_at DESC LIMIT 200",
            )
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateOrderStatusResponse {
    pub success: bool,
    pub order: Order,
}

/// Set an order's status after manual fulfilment or rejection
///
/// POST /admin/orders/:id/status?key=<admin_secret_key>
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<AdminQuery>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<UpdateOrderStatusResponse>> {
    require_admin(&state, &params.key)?;

    let status = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown status: {}", payload.status)))?;

    let order: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $2 WHERE id = $1
         RETURNING id, user_id, transaction_id, target_id, package_name, amount, price,
                   status, product_id, admin_note, created_at",
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(&state.pool)
    .await?;

    let order = order.ok_or(AppError::OrderNotFound)?;

    tracing::info!("Order {} set to {}", order.transaction_id, status.as_str());

    Ok(Json(UpdateOrderStatusResponse {
        success: true,
        order,
    }))
}

// =============================================================================
// Game catalog settings
// =============================================================================

/// Partial update: absent fields leave the stored value untouched, so the
/// admin panel can toggle is_active without resending the custom name.
#[derive(Debug, Deserialize)]
pub struct UpsertProductSettingRequest {
    pub game_id: String,
    pub custom_name: Option<String>,
    pub custom_image: Option<String>,
    pub is_active: Option<bool>,
    pub is_popular: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UpsertProductSettingResponse {
    pub success: bool,
    pub product: ProductSetting,
}

/// Upsert the catalog overrides for one game
///
/// PUT /admin/products?key=<admin_secret_key>
pub async fn upsert_product_setting(
    State(state): State<AppState>,
    Query(params): Query<AdminQuery>,
    Json(payload): Json<UpsertProductSettingRequest>,
) -> Result<Json<UpsertProductSettingResponse>> {
    require_admin(&state, &params.key)?;

    if payload.game_id.trim().is_empty() {
        return Err(AppError::InvalidInput("game_id is required".to_string()));
    }

    let product: ProductSetting = sqlx::query_as(
        "INSERT INTO products (game_id, custom_name, custom_image, is_active, is_popular)
         VALUES ($1, $2, $3, COALESCE($4, TRUE), COALESCE($5, FALSE))
         ON CONFLICT (game_id) DO UPDATE SET
             custom_name = COALESCE($2, products.custom_name),
             custom_image = COALESCE($3, products.custom_image),
             is_active = COALESCE($4, products.is_active),
             is_popular = COALESCE($5, products.is_popular)
         RETURNING game_id, custom_name, custom_image, is_active, is_popular",
    )
    .bind(payload.game_id.trim())
    .bind(payload.custom_name.as_deref())
    .bind(payload.custom_image.as_deref())
    .bind(payload.is_active)
    .bind(payload.is_popular)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!("Product settings updated for {}", product.game_id);

    Ok(Json(UpsertProductSettingResponse {
        success: true,
        product,
    }))
}

// =============================================================================
// Package markup settings
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UpsertPackageSettingRequest {
    pub game_id: String,
    pub package_id: String,
    pub markup_type: String,
    pub markup_value: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct UpsertPackageSettingResponse {
    pub success: bool,
}

/// Upsert the markup configuration for one package
///
/// PUT /admin/packages?key=<admin_secret_key>
pub async fn upsert_package_setting(
    State(state): State<AppState>,
    Query(params): Query<AdminQuery>,
    Json(payload): Json<UpsertPackageSettingRequest>,
) -> Result<Json<UpsertPackageSettingResponse>> {
    require_admin(&state, &params.key)?;

    if payload.game_id.trim().is_empty() || payload.package_id.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "game_id and package_id are required".to_string(),
        ));
    }
    if !matches!(payload.markup_type.as_str(), "fixed" | "percent") {
        return Err(AppError::InvalidInput(
            "markup_type must be 'fixed' or 'percent'".to_string(),
        ));
    }
    if payload.markup_value < 0 {
        return Err(AppError::InvalidInput(
            "markup_value must not be negative".to_string(),
        ));
    }

    sqlx::query(
        "INSERT INTO package_settings (game_id, package_id, markup_type, markup_value, active)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (game_id, package_id)
         DO UPDATE SET markup_type = $3, markup_value = $4, active = $5",
    )
    .bind(payload.game_id.trim())
    .bind(payload.package_id.trim())
    .bind(&payload.markup_type)
    .bind(payload.markup_value)
    .bind(payload.active)
    .execute(&state.pool)
    .await?;

    Ok(Json(UpsertPackageSettingResponse { success: true }))
}

// =============================================================================
// Stats
// =============================================================================

/// Store statistics response
#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub user_count: i64,
    pub order_count: i64,
    pub pending_topup_count: i64,
    /// Sum of successfully settled top-ups, in satang
    pub settled_topup_satang: i64,
}

/// Admin stats endpoint
///
/// Returns store statistics for monitoring and diagnostics.
///
/// GET /admin/stats?key=<admin_secret_key>
pub async fn admin_stats(
    State(state): State<AppState>,
    Query(params): Query<AdminQuery>,
) -> Result<Json<AdminStatsResponse>> {
    require_admin(&state, &params.key)?;

    let (user_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles")
        .fetch_one(&state.pool)
        .await?;
    let (order_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;
    let (pending_topup_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM topups WHERE status = 'pending'")
            .fetch_one(&state.pool)
            .await?;
    let (settled_topup_satang,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM topups WHERE status = 'success'",
    )
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(
        "Admin stats requested: {} users, {} orders, {} pending topups",
        user_count,
        order_count,
        pending_topup_count
    );

    Ok(Json(AdminStatsResponse {
        user_count,
        order_count,
        pending_topup_count,
        settled_topup_satang,
    }))
}
