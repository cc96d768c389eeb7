// src/handlers/campaigns.rs
// DOCUMENTATION: HTTP handlers for campaign operations
// PURPOSE: Parse requests, call services, return responses

use super::extractors::AuthUser;
use crate::errors::ApiError;
use crate::models::{
    ApiResponse, CampaignQuery, CreateCampaignRequest, PageQuery, UpdateCampaignRequest,
};
use crate::services::CampaignService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /api/campaigns
/// Filters: category, status (default active, `all` for any), search, organizer_id, featured
pub async fn list_campaigns(
    pool: web::Data<PgPool>,
    query: web::Query<CampaignQuery>,
) -> Result<impl Responder, ApiError> {
    let result = CampaignService::search(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(result)))
}

/// GET /api/campaigns/mine
pub async fn my_campaigns(
    pool: web::Data<PgPool>,
    user: AuthUser,
    paging: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let result = CampaignService::mine(pool.get_ref(), user.id, paging.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(result)))
}

/// GET /api/campaigns/{id}
/// Retrieve a campaign by UUID or slug
pub async fn get_campaign(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let campaign = CampaignService::get(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(campaign)))
}

/// GET /api/campaigns/{id}/donations
pub async fn campaign_donations(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    paging: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    let donations =
        CampaignService::donations(pool.get_ref(), &path.into_inner(), paging.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(donations)))
}

/// POST /api/campaigns
pub async fn create_campaign(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateCampaignRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let campaign = CampaignService::create(pool.get_ref(), user.id, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(campaign)))
}

/// PUT /api/campaigns/{id}
pub async fn update_campaign(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateCampaignRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let campaign = CampaignService::update(
        pool.get_ref(),
        path.into_inner(),
        user.id,
        user.role,
        req.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(campaign)))
}

/// DELETE /api/campaigns/{id}
pub async fn delete_campaign(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    CampaignService::delete(pool.get_ref(), id, user.id, user.role).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(json!({ "id": id }), "Campaign deleted")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/campaigns")
            .route("", web::get().to(list_campaigns))
            .route("", web::post().to(create_campaign))
            .route("/mine", web::get().to(my_campaigns))
            .route("/{id}", web::get().to(get_campaign))
            .route("/{id}", web::put().to(update_campaign))
            .route("/{id}", web::delete().to(delete_campaign))
            .route("/{id}/donations", web::get().to(campaign_donations)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use actix_web::{http::StatusCode, test, App};
    use sqlx::postgres::PgPoolOptions;

    #[actix_rt::test]
    async fn test_create_campaign_requires_login() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/donasi_test")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(Config::for_tests()))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/campaigns")
            .set_json(json!({
                "title": "Sumur untuk desa",
                "description": "Membangun sumur bersih untuk warga",
                "target_amount": 5000000
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}
