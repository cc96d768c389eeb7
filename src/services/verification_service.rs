// src/services/verification_service.rs
// DOCUMENTATION: Organizer identity verification requests

use crate::db::{UserRepository, VerificationRepository};
use crate::errors::ApiError;
use crate::models::{
    CreateVerificationRequest, NotificationKind, PageQuery, Paginated, ReviewVerificationRequest,
    Verification, VerificationQuery, VerificationStatus,
};
use crate::services::NotificationService;
use sqlx::PgPool;
use uuid::Uuid;

pub struct VerificationService;

impl VerificationService {
    pub async fn submit(
        pool: &PgPool,
        user_id: Uuid,
        req: CreateVerificationRequest,
    ) -> Result<Verification, ApiError> {
        let user = UserRepository::get_by_id(pool, user_id).await?;
        if user.is_verified {
            return Err(ApiError::InvalidState("account is already verified".into()));
        }

        let verification = VerificationRepository::create(pool, user_id, &req).await?;
        log::info!("Verification {} submitted by {}", verification.id, user_id);
        Ok(verification)
    }

    pub async fn mine(pool: &PgPool, user_id: Uuid) -> Result<Vec<Verification>, ApiError> {
        VerificationRepository::list_by_user(pool, user_id).await
    }

    pub async fn list(
        pool: &PgPool,
        query: VerificationQuery,
    ) -> Result<Paginated<Verification>, ApiError> {
        let paging = PageQuery::new(query.page, query.limit);
        let (rows, total) = VerificationRepository::list(pool, &query).await?;
        Ok(Paginated::new(rows, total, paging))
    }

    /// Approve or reject a pending request; approval verifies the account
    /// and promotes donors to organizers in the same transaction
    pub async fn review(
        pool: &PgPool,
        id: Uuid,
        req: ReviewVerificationRequest,
    ) -> Result<Verification, ApiError> {
        if req.status == VerificationStatus::Pending {
            return Err(ApiError::InvalidInput("status must be approved or rejected".into()));
        }

        let mut tx = pool.begin().await?;
        let decided =
            VerificationRepository::decide(&mut tx, id, req.status, req.admin_note.as_deref()).await?;

        let verification = match decided {
            Some(v) => v,
            None => {
                drop(tx);
                return if VerificationRepository::exists(pool, id).await? {
                    Err(ApiError::InvalidState("verification was already reviewed".into()))
                } else {
                    Err(ApiError::NotFound("Verification".into()))
                };
            }
        };

        if req.status == VerificationStatus::Approved {
            UserRepository::mark_verified(&mut tx, verification.user_id).await?;
        }
        tx.commit().await?;

        log::info!("Verification {} {}", id, req.status);

        let message = match (req.status, req.admin_note.as_deref()) {
            (VerificationStatus::Approved, _) => {
                "Your account is verified. You can now create campaigns.".to_string()
            }
            (_, Some(note)) if !note.trim().is_empty() => {
                format!("Your verification request was rejected: {}", note.trim())
            }
            _ => "Your verification request was rejected".to_string(),
        };
        NotificationService::notify(
            pool,
            verification.user_id,
            NotificationKind::VerificationUpdate,
            "Verification update",
            message,
            None,
        )
        .await;

        Ok(verification)
    }
}
