use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Upstream request error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Payment gateway rejected the request: {0}")]
    GatewayRejected(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Top-up not found")]
    TopupNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Insufficient wallet balance")]
    InsufficientBalance,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Unauthorized")]
    Unauthorized,
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Upstream(ref e) => {
                tracing::error!("Upstream request error: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream service unavailable".to_string(),
                )
            }
            // Raw provider message passes through, as the storefront always did
            AppError::GatewayRejected(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AppError::TopupNotFound => (StatusCode::NOT_FOUND, "Top-up not found".to_string()),
            AppError::OrderNotFound => (StatusCode::NOT_FOUND, "Order not found".to_string()),
            AppError::PostNotFound => (StatusCode::NOT_FOUND, "Post not found".to_string()),
            AppError::InsufficientBalance => (
                StatusCode::BAD_REQUEST,
                "Insufficient wallet balance".to_string(),
            ),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                "Invalid signature - request must come from official app".to_string(),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
