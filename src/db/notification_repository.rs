// src/db/notification_repository.rs
// DOCUMENTATION: In-app notification database operations

use crate::errors::ApiError;
use crate::models::{NewNotification, Notification, NotificationQuery, PageQuery};
use sqlx::PgPool;
use uuid::Uuid;

pub struct NotificationRepository;

impl NotificationRepository {
    pub async fn create(pool: &PgPool, new: &NewNotification) -> Result<Notification, ApiError> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.kind.as_str())
        .bind(&new.title)
        .bind(&new.message)
        .bind(&new.link)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create notification for {}: {}", new.user_id, e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        query: &NotificationQuery,
    ) -> Result<(Vec<Notification>, i64), ApiError> {
        let paging = PageQuery::new(query.page, query.limit);

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE)",
        )
        .bind(user_id)
        .bind(query.unread_only)
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(query.unread_only)
        .bind(paging.limit())
        .bind(paging.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    pub async fn mark_read(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Notification, ApiError> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification".into()))
    }

    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, ApiError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Notification".into()));
        }
        Ok(())
    }
}
