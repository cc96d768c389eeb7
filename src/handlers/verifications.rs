// src/handlers/verifications.rs
// DOCUMENTATION: Organizer verification request handlers

use super::extractors::AuthUser;
use crate::errors::ApiError;
use crate::models::{ApiResponse, CreateVerificationRequest};
use crate::services::VerificationService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// POST /api/verifications
/// One pending request per user
pub async fn submit_verification(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateVerificationRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let verification = VerificationService::submit(pool.get_ref(), user.id, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(verification)))
}

/// GET /api/verifications/mine
pub async fn my_verifications(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let rows = VerificationService::mine(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/verifications")
            .route("", web::post().to(submit_verification))
            .route("/mine", web::get().to(my_verifications)),
    );
}
