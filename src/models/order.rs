use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ORDER_TXN_PREFIX;

/// How an order is paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayMethod {
    /// Full deduction from the wallet; rejected if the balance is short
    Wallet,
    /// Deduct whatever balance is available, remainder paid by QR transfer
    Hybrid,
}

impl PayMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Success,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Order row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: String,
    pub transaction_id: String,
    /// Game/app account the purchased package is delivered to
    pub target_id: String,
    pub package_name: String,
    pub amount: i64,
    pub price: i64,
    pub status: String,
    pub product_id: String,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build a transaction id from the creation instant: `ORD-<unix millis>`
    pub fn transaction_id_at(now: DateTime<Utc>) -> String {
        format!("{}-{}", ORDER_TXN_PREFIX, now.timestamp_millis())
    }
}
