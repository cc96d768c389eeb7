// src/db/verification_repository.rs
// DOCUMENTATION: Identity verification database operations

use crate::errors::ApiError;
use crate::models::{CreateVerificationRequest, PageQuery, Verification, VerificationQuery, VerificationStatus};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const SELECT_VERIFICATION: &str = r#"
    SELECT v.*, u.email AS user_email
    FROM verifications v
    LEFT JOIN users u ON u.id = v.user_id
"#;

pub struct VerificationRepository;

impl VerificationRepository {
    /// Insert a request; a second pending request for the same user is a conflict
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        req: &CreateVerificationRequest,
    ) -> Result<Verification, ApiError> {
        sqlx::query_as::<_, Verification>(
            r#"
            INSERT INTO verifications (
                id, user_id, full_name, id_number, document_url, selfie_url, organization_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&req.full_name)
        .bind(&req.id_number)
        .bind(&req.document_url)
        .bind(&req.selfie_url)
        .bind(&req.organization_name)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::AlreadyExists("a pending verification request".into())
            }
            e => {
                log::error!("Failed to create verification: {}", e);
                ApiError::DatabaseError(e.to_string())
            }
        })
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Verification>, ApiError> {
        let sql = format!("{} WHERE v.user_id = $1 ORDER BY v.created_at DESC", SELECT_VERIFICATION);
        let rows = sqlx::query_as::<_, Verification>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn list(
        pool: &PgPool,
        query: &VerificationQuery,
    ) -> Result<(Vec<Verification>, i64), ApiError> {
        let paging = PageQuery::new(query.page, query.limit);
        let status = query.status.map(|s| s.as_str());

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM verifications WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(pool)
        .await?;

        let sql = format!(
            "{} WHERE ($1::TEXT IS NULL OR v.status = $1) ORDER BY v.created_at ASC LIMIT $2 OFFSET $3",
            SELECT_VERIFICATION
        );
        let rows = sqlx::query_as::<_, Verification>(&sql)
            .bind(status)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }

    /// Move a pending request to its decision; None when it was already reviewed
    pub async fn decide(
        conn: &mut PgConnection,
        id: Uuid,
        status: VerificationStatus,
        admin_note: Option<&str>,
    ) -> Result<Option<Verification>, ApiError> {
        let row = sqlx::query_as::<_, Verification>(
            r#"
            UPDATE verifications
            SET status = $1, admin_note = $2, reviewed_at = NOW(), updated_at = NOW()
            WHERE id = $3 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(status.as_str())
        .bind(admin_note)
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(row)
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM verifications WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }
}
