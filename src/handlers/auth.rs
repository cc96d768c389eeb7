// src/handlers/auth.rs
// DOCUMENTATION: Registration, login and session lookup
// PURPOSE: Issue bearer tokens for the rest of the API

use super::extractors::AuthUser;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{ApiResponse, LoginRequest, RegisterRequest};
use crate::services::{AuthService, LoginLimiter, UserService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// POST /api/auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: web::Json<RegisterRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let session = AuthService::register(pool.get_ref(), &config, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(session)))
}

/// POST /api/auth/login
/// Throttled per client address before any credential check
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    limiter: web::Data<LoginLimiter>,
    http: HttpRequest,
    req: web::Json<LoginRequest>,
) -> Result<impl Responder, ApiError> {
    // socket peer only; forwarding headers are client controlled
    let client = http
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    limiter.check(&client)?;

    req.validate()?;
    let session = AuthService::login(pool.get_ref(), &config, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(session)))
}

/// GET /api/auth/me
pub async fn me(pool: web::Data<PgPool>, user: AuthUser) -> Result<impl Responder, ApiError> {
    let profile = UserService::me(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(profile)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    #[actix_rt::test]
    async fn test_login_is_rate_limited_before_credentials_are_checked() {
        let config = Config::for_tests();
        let limiter = LoginLimiter::new(config.login_rate_per_minute);
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/donasi_test")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(limiter))
                .configure(super::config),
        )
        .await;

        // malformed emails fail validation without reaching the database
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": "not-an-email", "password": "x" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "not-an-email", "password": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
    }

    #[actix_rt::test]
    async fn test_forwarded_header_does_not_reset_login_limit() {
        let config = Config::for_tests();
        let limiter = LoginLimiter::new(2);
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/donasi_test")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(limiter))
                .configure(super::config),
        )
        .await;

        let peer: std::net::SocketAddr = "203.0.113.7:40000".parse().unwrap();
        let mut statuses = Vec::new();
        for i in 0..4 {
            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .peer_addr(peer)
                .insert_header(("X-Forwarded-For", format!("198.51.100.{}", i)))
                .set_json(json!({ "email": "not-an-email", "password": "x" }))
                .to_request();
            statuses.push(test::call_service(&app, req).await.status());
        }

        assert_eq!(
            statuses,
            vec![
                StatusCode::BAD_REQUEST,
                StatusCode::BAD_REQUEST,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::TOO_MANY_REQUESTS,
            ]
        );
    }

    #[actix_rt::test]
    async fn test_me_requires_token() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/donasi_test")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(Config::for_tests()))
                .configure(super::config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
