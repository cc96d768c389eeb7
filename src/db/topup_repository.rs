// src/db/topup_repository.rs
// DOCUMENTATION: Wallet top-up database operations

use crate::errors::ApiError;
use crate::models::{PageQuery, PaymentStatus, Topup};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct TopupRepository;

impl TopupRepository {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        amount: i64,
        external_id: &str,
    ) -> Result<Topup, ApiError> {
        sqlx::query_as::<_, Topup>(
            r#"
            INSERT INTO topups (id, user_id, amount, external_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(amount)
        .bind(external_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create topup: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    pub async fn attach_invoice(
        pool: &PgPool,
        id: Uuid,
        invoice_id: &str,
        invoice_url: &str,
    ) -> Result<Topup, ApiError> {
        sqlx::query_as::<_, Topup>(
            r#"
            UPDATE topups
            SET invoice_id = $1, invoice_url = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .bind(invoice_url)
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to attach invoice to topup {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Topup, ApiError> {
        sqlx::query_as::<_, Topup>("SELECT * FROM topups WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Top-up".into()))
    }

    pub async fn find_for_update(
        conn: &mut PgConnection,
        external_id: &str,
    ) -> Result<Option<Topup>, ApiError> {
        let topup =
            sqlx::query_as::<_, Topup>("SELECT * FROM topups WHERE external_id = $1 FOR UPDATE")
                .bind(external_id)
                .fetch_optional(conn)
                .await?;
        Ok(topup)
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: PaymentStatus,
        payment_method: Option<&str>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE topups
            SET status = $1,
                paid_at = CASE WHEN $1 IN ('paid', 'settled') THEN COALESCE(paid_at, NOW()) ELSE paid_at END,
                payment_method = COALESCE($2, payment_method),
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(payment_method)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        paging: PageQuery,
    ) -> Result<(Vec<Topup>, i64), ApiError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM topups WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        let topups = sqlx::query_as::<_, Topup>(
            "SELECT * FROM topups WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(paging.limit())
        .bind(paging.offset())
        .fetch_all(pool)
        .await?;

        Ok((topups, total))
    }
}
