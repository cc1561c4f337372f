//! Database-backed tests for the wallet settlement paths.
//!
//! These run against a live Postgres via #[sqlx::test], which provisions an
//! isolated database per test and applies ./migrations. They pin the money
//! invariants the HTTP handlers rely on: a top-up is credited exactly once
//! no matter how many webhook deliveries arrive, a debit never overdraws,
//! and the hybrid split takes only what the balance covers.

use sqlx::PgPool;

use topup_store_server::db::wallet;
use topup_store_server::AppError;

async fn seed_user(pool: &PgPool, id: &str, balance: i64) {
    sqlx::query("INSERT INTO profiles (id, wallet_balance) VALUES ($1, $2)")
        .bind(id)
        .bind(balance)
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_pending_topup(pool: &PgPool, user_id: &str, txn_id: &str, external_id: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO topups (user_id, transaction_id, external_id, amount, status)
         VALUES ($1, $2, $3, 10000, 'pending') RETURNING id",
    )
    .bind(user_id)
    .bind(txn_id)
    .bind(external_id)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

async fn balance_and_points(pool: &PgPool, id: &str) -> (i64, i64) {
    sqlx::query_as("SELECT wallet_balance, points FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
async fn duplicate_webhook_delivery_credits_once(pool: PgPool) {
    seed_user(&pool, "user-1", 0).await;
    seed_pending_topup(&pool, "user-1", "TOP-1", "pay-754349").await;

    // 100.00 baht top-up
    let first = wallet::settle_by_external_id(&pool, "pay-754349", 10_000)
        .await
        .unwrap();
    assert!(first.is_some());

    // Gateway retries the same delivery
    let second = wallet::settle_by_external_id(&pool, "pay-754349", 10_000)
        .await
        .unwrap();
    assert!(second.is_none());

    let (balance, points) = balance_and_points(&pool, "user-1").await;
    assert_eq!(balance, 10_000);
    // floor(1% of 100 baht) = 1 point, once
    assert_eq!(points, 1);
}

#[sqlx::test]
async fn transaction_id_settlement_awards_no_points(pool: PgPool) {
    seed_user(&pool, "user-1", 500).await;
    seed_pending_topup(&pool, "user-1", "TOP-2", "pay-2").await;

    let settled = wallet::settle_by_transaction_id(&pool, "TOP-2", 10_000)
        .await
        .unwrap();
    assert!(settled.is_some());

    let (balance, points) = balance_and_points(&pool, "user-1").await;
    assert_eq!(balance, 10_500);
    assert_eq!(points, 0);
}

#[sqlx::test]
async fn settlement_for_unknown_reference_is_a_noop(pool: PgPool) {
    seed_user(&pool, "user-1", 0).await;

    let settled = wallet::settle_by_external_id(&pool, "pay-nothing", 10_000)
        .await
        .unwrap();
    assert!(settled.is_none());

    let (balance, _) = balance_and_points(&pool, "user-1").await;
    assert_eq!(balance, 0);
}

#[sqlx::test]
async fn debit_exact_rejects_short_balance_without_touching_it(pool: PgPool) {
    seed_user(&pool, "user-1", 3_000).await;

    let mut conn = pool.acquire().await.unwrap();
    let err = wallet::debit_exact(&mut conn, "user-1", 5_000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance));
    drop(conn);

    let (balance, _) = balance_and_points(&pool, "user-1").await;
    assert_eq!(balance, 3_000);
}

#[sqlx::test]
async fn debit_exact_deducts_and_returns_new_balance(pool: PgPool) {
    seed_user(&pool, "user-1", 5_000).await;

    let mut conn = pool.acquire().await.unwrap();
    let new_balance = wallet::debit_exact(&mut conn, "user-1", 5_000)
        .await
        .unwrap();
    assert_eq!(new_balance, 0);
}

#[sqlx::test]
async fn debit_exact_unknown_user(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let err = wallet::debit_exact(&mut conn, "nobody", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UserNotFound));
}

#[sqlx::test]
async fn hybrid_debit_takes_only_what_the_balance_covers(pool: PgPool) {
    seed_user(&pool, "user-1", 3_000).await;

    // Price 50.00, wallet has 30.00: wallet empties, 20.00 left to pay by QR
    let mut tx = pool.begin().await.unwrap();
    let (deducted, new_balance) = wallet::debit_available(&mut *tx, "user-1", 5_000)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(deducted, 3_000);
    assert_eq!(new_balance, 0);

    let (balance, _) = balance_and_points(&pool, "user-1").await;
    assert_eq!(balance, 0);
}

#[sqlx::test]
async fn hybrid_debit_caps_at_the_price(pool: PgPool) {
    seed_user(&pool, "user-1", 9_000).await;

    let mut tx = pool.begin().await.unwrap();
    let (deducted, new_balance) = wallet::debit_available(&mut *tx, "user-1", 5_000)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(deducted, 5_000);
    assert_eq!(new_balance, 4_000);
}

#[sqlx::test]
async fn approve_topup_settles_once(pool: PgPool) {
    seed_user(&pool, "user-1", 0).await;
    let topup_id = seed_pending_topup(&pool, "user-1", "TOP-3", "pay-3").await;

    let topup = wallet::approve_topup(&pool, topup_id).await.unwrap();
    assert_eq!(topup.status, "success");

    // Second approval finds no pending row
    let err = wallet::approve_topup(&pool, topup_id).await.unwrap_err();
    assert!(matches!(err, AppError::TopupNotFound));

    let (balance, points) = balance_and_points(&pool, "user-1").await;
    assert_eq!(balance, 10_000);
    // Manual approval never awards points
    assert_eq!(points, 0);
}

#[sqlx::test]
async fn cancelled_topup_cannot_be_settled(pool: PgPool) {
    seed_user(&pool, "user-1", 0).await;
    let topup_id = seed_pending_topup(&pool, "user-1", "TOP-4", "pay-4").await;

    wallet::cancel_topup(&pool, topup_id).await.unwrap();

    let settled = wallet::settle_by_external_id(&pool, "pay-4", 10_000)
        .await
        .unwrap();
    assert!(settled.is_none());

    let (balance, _) = balance_and_points(&pool, "user-1").await;
    assert_eq!(balance, 0);
}
