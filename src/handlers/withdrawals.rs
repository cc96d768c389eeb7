// src/handlers/withdrawals.rs
// DOCUMENTATION: Organizer payout request handlers

use super::extractors::AuthUser;
use crate::errors::ApiError;
use crate::models::{ApiResponse, CreateWithdrawalRequest, PageQuery};
use crate::services::WithdrawalService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /api/withdrawals
pub async fn create_withdrawal(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateWithdrawalRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let withdrawal = WithdrawalService::create(pool.get_ref(), user.id, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(withdrawal)))
}

/// GET /api/withdrawals/mine
pub async fn my_withdrawals(
    pool: web::Data<PgPool>,
    user: AuthUser,
    paging: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let rows = WithdrawalService::mine(pool.get_ref(), user.id, paging.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

/// GET /api/withdrawals/{id}
pub async fn get_withdrawal(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let withdrawal =
        WithdrawalService::get(pool.get_ref(), path.into_inner(), user.id, user.role).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(withdrawal)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/withdrawals")
            .route("", web::post().to(create_withdrawal))
            .route("/mine", web::get().to(my_withdrawals))
            .route("/{id}", web::get().to(get_withdrawal)),
    );
}
