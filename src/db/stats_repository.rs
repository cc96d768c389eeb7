// src/db/stats_repository.rs
// DOCUMENTATION: Aggregate queries for the landing page and back-office dashboard

use crate::errors::ApiError;
use crate::models::{AdminStats, PlatformStats, StatusCount};
use sqlx::PgPool;

pub struct StatsRepository;

impl StatsRepository {
    pub async fn platform(pool: &PgPool) -> Result<PlatformStats, ApiError> {
        sqlx::query_as::<_, PlatformStats>(
            r#"
            SELECT
                COALESCE((SELECT SUM(amount) FROM donations WHERE status IN ('paid', 'settled')), 0)::BIGINT
                    AS total_raised,
                (SELECT COUNT(*) FROM donations WHERE status IN ('paid', 'settled'))
                    AS total_donors,
                (SELECT COUNT(*) FROM campaigns WHERE status = 'active')
                    AS active_campaigns
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to compute platform stats: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    pub async fn admin(pool: &PgPool) -> Result<AdminStats, ApiError> {
        let (total_users, verified_organizers, total_wallet_balance): (i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE role = 'organizer' AND is_verified),
                    COALESCE(SUM(wallet_balance), 0)::BIGINT
                FROM users
                "#,
            )
            .fetch_one(pool)
            .await?;

        let campaigns_by_status: Vec<StatusCount> = sqlx::query_as(
            "SELECT status, COUNT(*) AS count FROM campaigns GROUP BY status ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await?;

        let donations_by_status: Vec<StatusCount> = sqlx::query_as(
            "SELECT status, COUNT(*) AS count FROM donations GROUP BY status ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await?;

        let (total_raised,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM donations WHERE status IN ('paid', 'settled')",
        )
        .fetch_one(pool)
        .await?;

        let (pending_withdrawals,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM withdrawals WHERE status = 'pending'")
                .fetch_one(pool)
                .await?;

        let (pending_verifications,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM verifications WHERE status = 'pending'")
                .fetch_one(pool)
                .await?;

        Ok(AdminStats {
            total_users,
            verified_organizers,
            campaigns_by_status,
            donations_by_status,
            total_raised,
            pending_withdrawals,
            pending_verifications,
            total_wallet_balance,
        })
    }
}
