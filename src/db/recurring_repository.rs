// src/db/recurring_repository.rs
// DOCUMENTATION: Recurring donation plan database operations

use crate::errors::ApiError;
use crate::models::{Frequency, RecurringDonation, RecurringStatus};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const SELECT_RECURRING: &str = r#"
    SELECT r.*, c.title AS campaign_title
    FROM recurring_donations r
    LEFT JOIN campaigns c ON c.id = r.campaign_id
"#;

pub struct RecurringRepository;

impl RecurringRepository {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        campaign_id: Uuid,
        amount: i64,
        frequency: Frequency,
        next_run_at: DateTime<Utc>,
    ) -> Result<RecurringDonation, ApiError> {
        sqlx::query_as::<_, RecurringDonation>(
            r#"
            INSERT INTO recurring_donations (id, user_id, campaign_id, amount, frequency, next_run_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(campaign_id)
        .bind(amount)
        .bind(frequency.as_str())
        .bind(next_run_at)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create recurring donation: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<RecurringDonation, ApiError> {
        let sql = format!("{} WHERE r.id = $1", SELECT_RECURRING);
        sqlx::query_as::<_, RecurringDonation>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Recurring donation".into()))
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<RecurringDonation>, ApiError> {
        let sql = format!(
            "{} WHERE r.user_id = $1 AND r.status <> 'cancelled' ORDER BY r.created_at DESC",
            SELECT_RECURRING
        );
        let rows = sqlx::query_as::<_, RecurringDonation>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    /// Lock one due plan, skipping rows another runner already holds
    pub async fn claim_due(
        conn: &mut PgConnection,
        now: DateTime<Utc>,
        exclude: &[Uuid],
    ) -> Result<Option<RecurringDonation>, ApiError> {
        let sql = format!(
            "{} WHERE r.status = 'active' AND r.next_run_at <= $1 AND NOT (r.id = ANY($2)) \
             ORDER BY r.next_run_at ASC LIMIT 1 FOR UPDATE OF r SKIP LOCKED",
            SELECT_RECURRING
        );
        let row = sqlx::query_as::<_, RecurringDonation>(&sql)
            .bind(now)
            .bind(exclude)
            .fetch_optional(conn)
            .await?;
        Ok(row)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        status: Option<RecurringStatus>,
        amount: Option<i64>,
    ) -> Result<RecurringDonation, ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE recurring_donations
            SET status = COALESCE($1, status),
                amount = COALESCE($2, amount),
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(amount)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Recurring donation".into()));
        }
        Self::get_by_id(pool, id).await
    }

    /// Record a run and schedule the next one
    pub async fn advance(
        conn: &mut PgConnection,
        id: Uuid,
        ran_at: DateTime<Utc>,
        next_run_at: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE recurring_donations
            SET last_run_at = $1, next_run_at = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(ran_at)
        .bind(next_run_at)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM recurring_donations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Recurring donation".into()));
        }
        Ok(())
    }
}
