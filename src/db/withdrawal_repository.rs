// src/db/withdrawal_repository.rs
// DOCUMENTATION: Withdrawal database operations

use crate::errors::ApiError;
use crate::models::{CreateWithdrawalRequest, PageQuery, Withdrawal, WithdrawalQuery, WithdrawalStatus};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const SELECT_WITHDRAWAL: &str = r#"
    SELECT w.*, c.title AS campaign_title
    FROM withdrawals w
    LEFT JOIN campaigns c ON c.id = w.campaign_id
"#;

pub struct WithdrawalRepository;

impl WithdrawalRepository {
    pub async fn create(
        conn: &mut PgConnection,
        organizer_id: Uuid,
        req: &CreateWithdrawalRequest,
    ) -> Result<Withdrawal, ApiError> {
        sqlx::query_as::<_, Withdrawal>(
            r#"
            INSERT INTO withdrawals (
                id, campaign_id, organizer_id, amount,
                bank_name, account_number, account_holder, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.campaign_id)
        .bind(organizer_id)
        .bind(req.amount)
        .bind(&req.bank_name)
        .bind(&req.account_number)
        .bind(&req.account_holder)
        .bind(&req.note)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            log::error!("Failed to create withdrawal: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Sum of withdrawals that still hold or have consumed campaign funds
    pub async fn committed_amount(
        conn: &mut PgConnection,
        campaign_id: Uuid,
    ) -> Result<i64, ApiError> {
        let (sum,): (Option<i64>,) = sqlx::query_as(
            r#"
            SELECT SUM(amount)::BIGINT FROM withdrawals
            WHERE campaign_id = $1 AND status IN ('pending', 'approved', 'completed')
            "#,
        )
        .bind(campaign_id)
        .fetch_one(conn)
        .await?;
        Ok(sum.unwrap_or(0))
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Withdrawal, ApiError> {
        let sql = format!("{} WHERE w.id = $1", SELECT_WITHDRAWAL);
        sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Withdrawal".into()))
    }

    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: Uuid,
        paging: PageQuery,
    ) -> Result<(Vec<Withdrawal>, i64), ApiError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM withdrawals WHERE organizer_id = $1")
                .bind(organizer_id)
                .fetch_one(pool)
                .await?;

        let sql = format!(
            "{} WHERE w.organizer_id = $1 ORDER BY w.created_at DESC LIMIT $2 OFFSET $3",
            SELECT_WITHDRAWAL
        );
        let rows = sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(organizer_id)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }

    pub async fn list(
        pool: &PgPool,
        query: &WithdrawalQuery,
    ) -> Result<(Vec<Withdrawal>, i64), ApiError> {
        let paging = PageQuery::new(query.page, query.limit);
        let status = query.status.map(|s| s.as_str());

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM withdrawals WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(pool)
        .await?;

        let sql = format!(
            "{} WHERE ($1::TEXT IS NULL OR w.status = $1) ORDER BY w.created_at DESC LIMIT $2 OFFSET $3",
            SELECT_WITHDRAWAL
        );
        let rows = sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(status)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }

    /// Conditional status change; returns None when the row is no longer in `from`
    pub async fn transition(
        pool: &PgPool,
        id: Uuid,
        from: WithdrawalStatus,
        to: WithdrawalStatus,
        admin_note: Option<&str>,
    ) -> Result<Option<Withdrawal>, ApiError> {
        let row = sqlx::query_as::<_, Withdrawal>(
            r#"
            UPDATE withdrawals
            SET status = $1,
                admin_note = COALESCE($2, admin_note),
                processed_at = NOW(),
                updated_at = NOW()
            WHERE id = $3 AND status = $4
            RETURNING *
            "#,
        )
        .bind(to.as_str())
        .bind(admin_note)
        .bind(id)
        .bind(from.as_str())
        .fetch_optional(pool)
        .await?;

        if row.is_some() {
            log::info!("Withdrawal {} {} -> {}", id, from, to);
        }
        Ok(row)
    }
}
