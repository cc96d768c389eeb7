// src/handlers/admin.rs
// DOCUMENTATION: Admin back-office handlers
// PURPOSE: Moderation of campaigns, donations, payouts and verifications
//
// Every route requires an AdminUser: the X-Admin-Token header or an admin bearer token.

use super::extractors::AdminUser;
use crate::errors::ApiError;
use crate::models::{
    ApiResponse, CampaignStatusRequest, DonationQuery, ReviewVerificationRequest,
    ReviewWithdrawalRequest, VerificationQuery, WithdrawalQuery,
};
use crate::services::{
    CampaignService, DonationService, StatsCache, StatsService, VerificationService,
    WithdrawalService,
};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// PUT /api/admin/campaigns/{id}/status
pub async fn set_campaign_status(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<StatsCache>>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<CampaignStatusRequest>,
) -> Result<impl Responder, ApiError> {
    let body = body.into_inner();
    let campaign =
        CampaignService::set_status(pool.get_ref(), path.into_inner(), body.status, body.reason)
            .await?;
    StatsService::invalidate(&cache).await;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(campaign)))
}

/// PUT /api/admin/campaigns/{id}/featured
pub async fn toggle_campaign_featured(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let campaign = CampaignService::toggle_featured(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(campaign)))
}

/// GET /api/admin/donations
pub async fn list_donations(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<DonationQuery>,
) -> Result<impl Responder, ApiError> {
    let donations = DonationService::list(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(donations)))
}

/// DELETE /api/admin/donations/{id}
/// Reverts the campaign credit of a paid donation
pub async fn delete_donation(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<StatsCache>>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    DonationService::delete(pool.get_ref(), id).await?;
    StatsService::invalidate(&cache).await;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(json!({ "id": id }), "Donation deleted")))
}

/// GET /api/admin/withdrawals
pub async fn list_withdrawals(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<WithdrawalQuery>,
) -> Result<impl Responder, ApiError> {
    let rows = WithdrawalService::list(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

/// PUT /api/admin/withdrawals/{id}
pub async fn review_withdrawal(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<StatsCache>>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<ReviewWithdrawalRequest>,
) -> Result<impl Responder, ApiError> {
    let withdrawal =
        WithdrawalService::review(pool.get_ref(), path.into_inner(), body.into_inner()).await?;
    StatsService::invalidate(&cache).await;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(withdrawal)))
}

/// GET /api/admin/verifications
pub async fn list_verifications(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<VerificationQuery>,
) -> Result<impl Responder, ApiError> {
    let rows = VerificationService::list(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

/// PUT /api/admin/verifications/{id}
pub async fn review_verification(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<StatsCache>>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<ReviewVerificationRequest>,
) -> Result<impl Responder, ApiError> {
    let verification =
        VerificationService::review(pool.get_ref(), path.into_inner(), body.into_inner()).await?;
    StatsService::invalidate(&cache).await;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(verification)))
}

/// GET /api/admin/stats
/// Dashboard aggregates, cached for STATS_CACHE_TTL_SECONDS
pub async fn dashboard_stats(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<StatsCache>>,
    _admin: AdminUser,
) -> Result<impl Responder, ApiError> {
    let stats = StatsService::admin(pool.get_ref(), &cache).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

/// GET /api/admin/cache
pub async fn cache_stats(
    cache: web::Data<Arc<StatsCache>>,
    _admin: AdminUser,
) -> Result<impl Responder, ApiError> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(cache.stats().await)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .route("/campaigns/{id}/status", web::put().to(set_campaign_status))
            .route("/campaigns/{id}/featured", web::put().to(toggle_campaign_featured))
            .route("/donations", web::get().to(list_donations))
            .route("/donations/{id}", web::delete().to(delete_donation))
            .route("/withdrawals", web::get().to(list_withdrawals))
            .route("/withdrawals/{id}", web::put().to(review_withdrawal))
            .route("/verifications", web::get().to(list_verifications))
            .route("/verifications/{id}", web::put().to(review_verification))
            .route("/stats", web::get().to(dashboard_stats))
            .route("/cache", web::get().to(cache_stats)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Role;
    use crate::services::issue_token;
    use actix_web::{http::StatusCode, test, App};
    use sqlx::postgres::PgPoolOptions;

    macro_rules! test_app {
        () => {{
            let pool = PgPoolOptions::new()
                .connect_lazy("postgres://localhost/donasi_test")
                .unwrap();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(pool))
                    .app_data(web::Data::new(Config::for_tests()))
                    .app_data(web::Data::new(Arc::new(StatsCache::new(60))))
                    .configure(config),
            )
            .await
        }};
    }

    #[actix_rt::test]
    async fn test_admin_routes_require_credentials() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/api/admin/stats").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_non_admin_token_is_forbidden() {
        let app = test_app!();
        let token = issue_token(&Config::for_tests(), Uuid::new_v4(), Role::Organizer).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/admin/donations")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn test_cache_stats_with_admin_header() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/admin/cache")
            .insert_header(("X-Admin-Token", "test-admin-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["total_entries"], 0);
    }
}
