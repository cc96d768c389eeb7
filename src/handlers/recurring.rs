// src/handlers/recurring.rs
// DOCUMENTATION: Recurring wallet donation plans

use super::extractors::AuthUser;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{ApiResponse, CreateRecurringRequest, UpdateRecurringRequest};
use crate::services::RecurringService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /api/recurring-donations
pub async fn create_plan(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    req: web::Json<CreateRecurringRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let plan = RecurringService::create(pool.get_ref(), &config, user.id, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(plan)))
}

/// GET /api/recurring-donations/mine
pub async fn my_plans(pool: web::Data<PgPool>, user: AuthUser) -> Result<impl Responder, ApiError> {
    let plans = RecurringService::mine(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(plans)))
}

/// PUT /api/recurring-donations/{id}
pub async fn update_plan(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateRecurringRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let plan = RecurringService::update(
        pool.get_ref(),
        &config,
        path.into_inner(),
        user.id,
        user.role,
        req.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(plan)))
}

/// DELETE /api/recurring-donations/{id}
pub async fn delete_plan(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    RecurringService::delete(pool.get_ref(), id, user.id, user.role).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        json!({ "id": id }),
        "Recurring donation deleted",
    )))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/recurring-donations")
            .route("", web::post().to(create_plan))
            .route("/mine", web::get().to(my_plans))
            .route("/{id}", web::put().to(update_plan))
            .route("/{id}", web::delete().to(delete_plan)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::issue_token;
    use actix_web::{http::StatusCode, test, App};
    use sqlx::postgres::PgPoolOptions;

    #[actix_rt::test]
    async fn test_plan_below_minimum_donation_is_rejected() {
        let config = Config::for_tests();
        let token = issue_token(&config, Uuid::new_v4(), Role::Donor).unwrap();
        let min = config.min_donation_amount;
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/donasi_test")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(config))
                .configure(super::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/recurring-donations")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({
                "campaign_id": Uuid::new_v4(),
                "amount": 1,
                "frequency": "monthly"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let req = test::TestRequest::put()
            .uri(&format!("/api/recurring-donations/{}", Uuid::new_v4()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "amount": min - 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
