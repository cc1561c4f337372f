use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile row: wallet balance and loyalty points live here
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    /// Stored-value balance in satang; never negative (CHECK constraint)
    pub wallet_balance: i64,
    pub points: i64,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Validate a user id: non-empty, at most 64 chars, URL-safe charset.
    /// Accepts UUIDs as well as opaque account ids.
    pub fn validate_id(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= 64
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}
