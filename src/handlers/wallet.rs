// src/handlers/wallet.rs
// DOCUMENTATION: Wallet balance and top-up handlers

use super::extractors::AuthUser;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{ApiResponse, CreateTopupRequest, PageQuery};
use crate::services::{WalletService, XenditClient};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /api/wallet
pub async fn get_wallet(pool: web::Data<PgPool>, user: AuthUser) -> Result<impl Responder, ApiError> {
    let wallet = WalletService::overview(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(wallet)))
}

/// POST /api/wallet/topups
pub async fn create_topup(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    xendit: web::Data<XenditClient>,
    user: AuthUser,
    req: web::Json<CreateTopupRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let topup =
        WalletService::create_topup(pool.get_ref(), &config, &xendit, user.id, req.amount).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(topup)))
}

/// GET /api/wallet/topups
pub async fn list_topups(
    pool: web::Data<PgPool>,
    user: AuthUser,
    paging: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let topups = WalletService::topups(pool.get_ref(), user.id, paging.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(topups)))
}

/// GET /api/wallet/topups/{id}
pub async fn get_topup(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let topup = WalletService::topup(pool.get_ref(), user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(topup)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/wallet")
            .route("", web::get().to(get_wallet))
            .route("/topups", web::post().to(create_topup))
            .route("/topups", web::get().to(list_topups))
            .route("/topups/{id}", web::get().to(get_topup)),
    );
}
