/// Loyalty points awarded per credited top-up: floor(1% of the baht amount).
/// Amounts are in satang, so this is integer division by 10,000
/// (floor(baht * 0.01) == satang / 10_000).
pub const POINTS_PER_SATANG_DIVISOR: i64 = 10_000;

/// Prefix for order transaction ids (`ORD-<unix millis>`)
pub const ORDER_TXN_PREFIX: &str = "ORD";

/// Prefix for top-up transaction ids (`TOP-<unix millis>`)
pub const TOPUP_TXN_PREFIX: &str = "TOP";

/// Maximum age of a signed request timestamp in seconds (5 minutes)
/// Prevents replay attacks
pub const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Maximum single top-up amount in satang (100,000 baht)
pub const MAX_TOPUP_SATANG: i64 = 10_000_000;

/// Minimum single top-up amount in satang (1 baht)
pub const MIN_TOPUP_SATANG: i64 = 100;

/// QR payment type requested from the gateway (01 = PromptPay)
pub const GATEWAY_QR_TYPE: &str = "01";

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for invalid user ID format
pub const ERR_INVALID_USER_ID: &str = "Invalid user ID format";

/// Error message for timestamp validation failure
pub const ERR_INVALID_TIMESTAMP: &str = "Timestamp too old or in the future";

/// Error message for an out-of-range top-up amount
pub const ERR_INVALID_TOPUP_AMOUNT: &str = "Top-up amount out of range";
