// src/services/ledger_tests.rs
// DOCUMENTATION: Money-moving flows against a real PostgreSQL database
// PURPOSE: Exercise locking and crediting rules that pure unit tests cannot reach
//
// Run with: TEST_DATABASE_URL=postgres://... cargo test -- --ignored

use crate::config::run_migrations;
use crate::errors::ApiError;
use crate::models::{CreateWithdrawalRequest, InvoiceCallback, User};
use crate::services::{
    DonationService, PaymentService, RecurringService, WalletDonation, WithdrawalService,
};
use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    run_migrations(&pool).await.expect("apply migrations");
    pool
}

async fn insert_user(pool: &PgPool, balance: i64) -> User {
    let id = Uuid::new_v4();
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, is_verified, wallet_balance)
        VALUES ($1, 'Test User', $2, 'not-a-hash', 'organizer', TRUE, $3)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(format!("{}@example.test", id.simple()))
    .bind(balance)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_campaign(pool: &PgPool, organizer_id: Uuid, current_amount: i64) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO campaigns (id, title, slug, description, organizer_id, target_amount, current_amount, status)
        VALUES ($1, 'Test Campaign', $2, 'Test', $3, 10000000, $4, 'active')
        "#,
    )
    .bind(id)
    .bind(format!("test-{}", id.simple()))
    .bind(organizer_id)
    .bind(current_amount)
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn campaign_amount(pool: &PgPool, id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT current_amount FROM campaigns WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn wallet_balance(pool: &PgPool, id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT wallet_balance FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn test_replayed_paid_webhook_credits_once() {
    let pool = test_pool().await;
    let organizer = insert_user(&pool, 0).await;
    let campaign_id = insert_campaign(&pool, organizer.id, 0).await;

    let external_id = format!("DON-{}", Uuid::new_v4().simple());
    sqlx::query(
        r#"
        INSERT INTO donations (id, campaign_id, donor_name, amount, payment_method, status, external_id)
        VALUES ($1, $2, 'Budi', 75000, 'xendit', 'pending', $3)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(campaign_id)
    .bind(&external_id)
    .execute(&pool)
    .await
    .unwrap();

    let callback = InvoiceCallback {
        id: Some("inv-1".into()),
        external_id,
        status: "PAID".into(),
        amount: Some(75000.0),
        paid_amount: Some(75000.0),
        payment_method: Some("BANK_TRANSFER".into()),
        payment_channel: Some("BCA".into()),
        paid_at: None,
    };

    let first = PaymentService::handle_invoice_callback(&pool, &callback).await.unwrap();
    assert!(first.success);
    assert!(!first.duplicate);

    let replay = PaymentService::handle_invoice_callback(&pool, &callback).await.unwrap();
    assert!(replay.success);
    assert!(replay.duplicate);

    assert_eq!(campaign_amount(&pool, campaign_id).await, 75000);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn test_wallet_donation_with_short_balance_changes_nothing() {
    let pool = test_pool().await;
    let organizer = insert_user(&pool, 0).await;
    let donor = insert_user(&pool, 20000).await;
    let campaign_id = insert_campaign(&pool, organizer.id, 0).await;

    let result = DonationService::donate_from_wallet(
        &pool,
        WalletDonation {
            donor: &donor,
            campaign_id,
            amount: 50000,
            message: None,
            is_anonymous: false,
        },
    )
    .await;

    assert!(matches!(result, Err(ApiError::InsufficientBalance)));
    assert_eq!(wallet_balance(&pool, donor.id).await, 20000);
    assert_eq!(campaign_amount(&pool, campaign_id).await, 0);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn test_withdrawal_above_available_is_rejected() {
    let pool = test_pool().await;
    let organizer = insert_user(&pool, 0).await;
    let campaign_id = insert_campaign(&pool, organizer.id, 100000).await;

    let request = |amount| CreateWithdrawalRequest {
        campaign_id,
        amount,
        bank_name: "BCA".into(),
        account_number: "1234567890".into(),
        account_holder: "Test User".into(),
        note: None,
    };

    WithdrawalService::create(&pool, organizer.id, request(60000))
        .await
        .unwrap();
    let over = WithdrawalService::create(&pool, organizer.id, request(40001)).await;
    assert!(matches!(over, Err(ApiError::InvalidInput(_))));

    WithdrawalService::create(&pool, organizer.id, request(40000))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn test_concurrent_recurring_runs_charge_once() {
    let pool = test_pool().await;
    let organizer = insert_user(&pool, 0).await;
    let donor = insert_user(&pool, 500000).await;
    let campaign_id = insert_campaign(&pool, organizer.id, 0).await;

    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO recurring_donations (id, user_id, campaign_id, amount, frequency, next_run_at)
        VALUES ($1, $2, $3, 25000, 'weekly', $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(donor.id)
    .bind(campaign_id)
    .bind(now - Duration::minutes(5))
    .execute(&pool)
    .await
    .unwrap();

    let (a, b) = tokio::join!(
        RecurringService::run_due(&pool, now),
        RecurringService::run_due(&pool, now)
    );
    a.unwrap();
    b.unwrap();

    let donations: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM donations WHERE campaign_id = $1")
            .bind(campaign_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(donations, 1);
    assert_eq!(campaign_amount(&pool, campaign_id).await, 25000);
    assert_eq!(wallet_balance(&pool, donor.id).await, 475000);

    let next_run_at: chrono::DateTime<Utc> = sqlx::query_scalar(
        "SELECT next_run_at FROM recurring_donations WHERE campaign_id = $1",
    )
    .bind(campaign_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(next_run_at > now);
}
