// src/handlers/stats.rs
// DOCUMENTATION: Public platform statistics for the landing page

use crate::errors::ApiError;
use crate::models::ApiResponse;
use crate::services::{StatsCache, StatsService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;

/// GET /api/stats
pub async fn platform_stats(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<StatsCache>>,
) -> Result<impl Responder, ApiError> {
    let stats = StatsService::platform(pool.get_ref(), &cache).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/stats", web::get().to(platform_stats));
}
