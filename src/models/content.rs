use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Promotional banner shown on the storefront
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Banner {
    pub id: i64,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub active: bool,
}

/// Blog/news post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}
