use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_TOPUP_SATANG, MIN_TOPUP_SATANG, TOPUP_TXN_PREFIX};

/// Top-up ledger row: one attempt to add funds to a wallet via the
/// external payment gateway
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topup {
    pub id: i64,
    pub user_id: String,
    pub transaction_id: String,
    /// Payment id assigned by the gateway (`id_pay`); set once the QR exists
    pub external_id: Option<String>,
    /// Amount the user asked to top up, in satang
    pub amount: i64,
    /// Exact amount the gateway expects to see transferred, in satang
    pub amount_check: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Topup {
    /// Build a transaction id from the creation instant: `TOP-<unix millis>`
    pub fn transaction_id_at(now: DateTime<Utc>) -> String {
        format!("{}-{}", TOPUP_TXN_PREFIX, now.timestamp_millis())
    }

    /// Requested amounts are bounded to keep the gateway happy and the
    /// ledger sane
    pub fn validate_amount(satang: i64) -> bool {
        (MIN_TOPUP_SATANG..=MAX_TOPUP_SATANG).contains(&satang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert!(Topup::validate_amount(100));
        assert!(Topup::validate_amount(5_000));
        assert!(Topup::validate_amount(MAX_TOPUP_SATANG));
        assert!(!Topup::validate_amount(99));
        assert!(!Topup::validate_amount(0));
        assert!(!Topup::validate_amount(-100));
        assert!(!Topup::validate_amount(MAX_TOPUP_SATANG + 1));
    }

    #[test]
    fn test_transaction_id_format() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(Topup::transaction_id_at(now), "TOP-1700000000000");
    }
}
