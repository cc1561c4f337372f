//! Atomic wallet and top-up settlement operations.
//!
//! Every balance mutation is either a single guarded UPDATE or a row-locked
//! transaction, so concurrent orders, webhook deliveries, and admin
//! approvals cannot race each other into a wrong or negative balance. The
//! `pending -> success` status flip is the idempotency gate for credits: it
//! happens in the same transaction as the wallet update, and a topup that is
//! no longer pending is never credited again.

use sqlx::{PgConnection, PgPool};

use crate::constants::POINTS_PER_SATANG_DIVISOR;
use crate::error::{AppError, Result};
use crate::models::Topup;

/// Deduct an exact amount, failing if the balance is short.
///
/// Returns the new balance. The guard lives in the WHERE clause, so the
/// check and the write are one statement. Callers run this inside the
/// transaction that also records what the money paid for.
pub async fn debit_exact(conn: &mut PgConnection, user_id: &str, amount: i64) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as(
        "UPDATE profiles
         SET wallet_balance = wallet_balance - $2
         WHERE id = $1 AND wallet_balance >= $2
         RETURNING wallet_balance",
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some((balance,)) => Ok(balance),
        None => {
            // Either the user does not exist or the balance was short
            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT wallet_balance FROM profiles WHERE id = $1")
                    .bind(user_id)
                    .fetch_optional(&mut *conn)
                    .await?;
            match exists {
                Some(_) => Err(AppError::InsufficientBalance),
                None => Err(AppError::UserNotFound),
            }
        }
    }
}

/// Deduct up to `max_amount`, taking whatever the balance covers.
///
/// Used by hybrid payment: the wallet absorbs what it can and the remainder
/// is paid by QR transfer. Returns (deducted, new_balance). The row is
/// locked for the read-compute-write sequence, so this must run inside a
/// transaction.
pub async fn debit_available(
    conn: &mut PgConnection,
    user_id: &str,
    max_amount: i64,
) -> Result<(i64, i64)> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT wallet_balance FROM profiles WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

    let balance = row.ok_or(AppError::UserNotFound)?.0;
    let deducted = balance.min(max_amount).max(0);

    if deducted > 0 {
        sqlx::query("UPDATE profiles SET wallet_balance = wallet_balance - $2 WHERE id = $1")
            .bind(user_id)
            .bind(deducted)
            .execute(&mut *conn)
            .await?;
    }

    Ok((deducted, balance - deducted))
}

/// Loyalty points for a credited amount: floor(1% of the baht value)
pub fn points_for(amount_satang: i64) -> i64 {
    if amount_satang <= 0 {
        return 0;
    }
    amount_satang / POINTS_PER_SATANG_DIVISOR
}

const FLIP_BY_EXTERNAL_ID: &str = "UPDATE topups SET status = 'success'
     WHERE external_id = $1 AND status = 'pending'
     RETURNING id, user_id, transaction_id, external_id, amount, amount_check, status, created_at";

const FLIP_BY_TRANSACTION_ID: &str = "UPDATE topups SET status = 'success'
     WHERE transaction_id = $1 AND status = 'pending'
     RETURNING id, user_id, transaction_id, external_id, amount, amount_check, status, created_at";

/// Flip a pending topup to success and credit the wallet, atomically.
///
/// The topup's own user_id is the credit target regardless of what the
/// webhook claimed. Returns Ok(None) when no pending row matched, which
/// callers treat as "already processed or unknown".
async fn settle_pending_topup(
    pool: &PgPool,
    flip_sql: &'static str,
    key: &str,
    amount: i64,
    award_points: bool,
) -> Result<Option<Topup>> {
    let mut tx = pool.begin().await?;

    let topup: Option<Topup> = sqlx::query_as(flip_sql)
        .bind(key)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(topup) = topup else {
        tx.rollback().await?;
        return Ok(None);
    };

    let points = if award_points { points_for(amount) } else { 0 };

    let credited = sqlx::query(
        "UPDATE profiles
         SET wallet_balance = wallet_balance + $2, points = points + $3
         WHERE id = $1",
    )
    .bind(&topup.user_id)
    .bind(amount)
    .bind(points)
    .execute(&mut *tx)
    .await?;

    if credited.rows_affected() == 0 {
        // Ledger row without a profile; refuse to lose the money silently
        tx.rollback().await?;
        tracing::error!(
            "Topup {} references missing profile {}",
            topup.id,
            topup.user_id
        );
        return Err(AppError::UserNotFound);
    }

    tx.commit().await?;

    tracing::info!(
        "Credited {} satang (+{} points) to user {} for topup {}",
        amount,
        points,
        topup.user_id,
        topup.id
    );

    Ok(Some(topup))
}

/// Settle by the gateway's payment id (`id_pay`), awarding loyalty points
pub async fn settle_by_external_id(
    pool: &PgPool,
    external_id: &str,
    amount: i64,
) -> Result<Option<Topup>> {
    settle_pending_topup(pool, FLIP_BY_EXTERNAL_ID, external_id, amount, true).await
}

/// Settle by our own transaction id (second webhook variant, no points)
pub async fn settle_by_transaction_id(
    pool: &PgPool,
    transaction_id: &str,
    amount: i64,
) -> Result<Option<Topup>> {
    settle_pending_topup(pool, FLIP_BY_TRANSACTION_ID, transaction_id, amount, false).await
}

/// Admin manual approval: settle a pending topup by row id for its own
/// recorded amount (no points, matching the manual flow)
pub async fn approve_topup(pool: &PgPool, topup_id: i64) -> Result<Topup> {
    let mut tx = pool.begin().await?;

    let topup: Option<Topup> = sqlx::query_as(
        "UPDATE topups SET status = 'success'
         WHERE id = $1 AND status = 'pending'
         RETURNING id, user_id, transaction_id, external_id, amount, amount_check, status, created_at",
    )
    .bind(topup_id)
    .fetch_optional(&mut *tx)
    .await?;

    let topup = topup.ok_or(AppError::TopupNotFound)?;

    let credited =
        sqlx::query("UPDATE profiles SET wallet_balance = wallet_balance + $2 WHERE id = $1")
            .bind(&topup.user_id)
            .bind(topup.amount)
            .execute(&mut *tx)
            .await?;

    if credited.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::UserNotFound);
    }

    tx.commit().await?;

    tracing::info!(
        "Admin approved topup {}: {} satang to user {}",
        topup.id,
        topup.amount,
        topup.user_id
    );

    Ok(topup)
}

/// Cancel a pending topup; rows that already settled stay settled
pub async fn cancel_topup(pool: &PgPool, topup_id: i64) -> Result<Topup> {
    let topup: Option<Topup> = sqlx::query_as(
        "UPDATE topups SET status = 'cancelled'
         WHERE id = $1 AND status = 'pending'
         RETURNING id, user_id, transaction_id, external_id, amount, amount_check, status, created_at",
    )
    .bind(topup_id)
    .fetch_optional(pool)
    .await?;

    topup.ok_or(AppError::TopupNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_for() {
        // 1% of the baht amount, floored: 190.00 baht -> 1 point
        assert_eq!(points_for(19_000), 1);
        // 19.00 baht -> 0 points
        assert_eq!(points_for(1_900), 0);
        // 500.00 baht -> 5 points
        assert_eq!(points_for(50_000), 5);
        assert_eq!(points_for(0), 0);
        assert_eq!(points_for(-5_000), 0);
    }
}
