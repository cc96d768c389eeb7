// src/handlers/donations.rs
// DOCUMENTATION: HTTP handlers for donations
// PURPOSE: Donation checkout (gateway or wallet) and donor-facing lookups

use super::extractors::AuthUser;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{ApiResponse, CreateDonationRequest, PageQuery};
use crate::services::{DonationService, StatsCache, StatsService, XenditClient};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// POST /api/donations
/// Login is optional for gateway payments and required for wallet payments
pub async fn create_donation(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    xendit: web::Data<XenditClient>,
    cache: web::Data<Arc<StatsCache>>,
    user: Option<AuthUser>,
    req: web::Json<CreateDonationRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let created = DonationService::create(
        pool.get_ref(),
        &config,
        &xendit,
        user.map(|u| u.id),
        req.into_inner(),
    )
    .await?;

    if created.invoice_url.is_none() {
        // wallet donations are already paid
        StatsService::invalidate(&cache).await;
    }

    Ok(HttpResponse::Created().json(ApiResponse::ok(created)))
}

/// GET /api/donations/mine
pub async fn my_donations(
    pool: web::Data<PgPool>,
    user: AuthUser,
    paging: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let donations = DonationService::mine(pool.get_ref(), user.id, paging.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(donations)))
}

/// GET /api/donations/status/{external_id}
/// Polled by the payment return page; no login needed
pub async fn donation_status(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let status = DonationService::status(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(status)))
}

/// GET /api/donations/{id}
pub async fn get_donation(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let donation =
        DonationService::get(pool.get_ref(), path.into_inner(), user.id, user.role).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(donation)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/donations")
            .route("", web::post().to(create_donation))
            .route("/mine", web::get().to(my_donations))
            .route("/status/{external_id}", web::get().to(donation_status))
            .route("/{id}", web::get().to(get_donation)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::issue_token;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    macro_rules! test_app {
        () => {{
            let config = Config::for_tests();
            let pool = PgPoolOptions::new()
                .connect_lazy("postgres://localhost/donasi_test")
                .unwrap();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(pool))
                    .app_data(web::Data::new(XenditClient::new(&config)))
                    .app_data(web::Data::new(config))
                    .app_data(web::Data::new(Arc::new(StatsCache::new(60))))
                    .configure(super::config),
            )
            .await
        }};
    }

    #[actix_rt::test]
    async fn test_donation_below_minimum_is_rejected() {
        let app = test_app!();
        let min = Config::for_tests().min_donation_amount;
        let req = test::TestRequest::post()
            .uri("/api/donations")
            .set_json(json!({
                "campaign_id": Uuid::new_v4(),
                "amount": min - 1,
                "donor_name": "Budi",
                "payment_method": "xendit"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[actix_rt::test]
    async fn test_wallet_donation_requires_login() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/donations")
            .set_json(json!({
                "campaign_id": Uuid::new_v4(),
                "amount": 50_000,
                "payment_method": "wallet"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_my_donations_requires_login() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/api/donations/mine").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // a bad token is rejected the same way
        let token = issue_token(&Config::for_tests(), Uuid::new_v4(), Role::Donor).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/donations/mine")
            .insert_header(("Authorization", format!("Bearer {}x", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
