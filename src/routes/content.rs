use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Banner, Post};
use crate::AppState;

/// Active banners in display order
///
/// GET /api/banners
pub async fn list_banners(State(state): State<AppState>) -> Result<Json<Vec<Banner>>> {
    let banners: Vec<Banner> = sqlx::query_as(
        "SELECT id, image_url, link_url, sort_order, active
         FROM banners WHERE active ORDER BY sort_order, id",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(banners))
}

/// Published posts, newest first
///
/// GET /api/posts
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    let posts: Vec<Post> = sqlx::query_as(
        "SELECT id, slug, title, body, published, created_at
         FROM posts WHERE published ORDER BY created_at DESC LIMIT 50",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(posts))
}

/// Single published post by slug
///
/// GET /api/posts/:slug
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>> {
    let post: Option<Post> = sqlx::query_as(
        "SELECT id, slug, title, body, published, created_at
         FROM posts WHERE slug = $1 AND published",
    )
    .bind(&slug)
    .fetch_optional(&state.pool)
    .await?;

    post.map(Json).ok_or(AppError::PostNotFound)
}

#[derive(Debug, Deserialize)]
pub struct ChatNotifyRequest {
    pub sender: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatNotifyResponse {
    pub success: bool,
}

/// Relay a customer chat message to the admin Telegram channel
///
/// POST /api/notify/chat
pub async fn notify_chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatNotifyRequest>,
) -> Result<Json<ChatNotifyResponse>> {
    if payload.message.trim().is_empty() {
        return Err(AppError::InvalidInput("Empty message".to_string()));
    }

    state
        .notifier
        .send(&format!(
            "<b>New customer message</b>\nFrom: {}\nMessage: {}",
            payload.sender, payload.message
        ))
        .await;

    Ok(Json(ChatNotifyResponse { success: true }))
}
