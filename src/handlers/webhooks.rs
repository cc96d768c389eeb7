// src/handlers/webhooks.rs
// DOCUMENTATION: Payment gateway callbacks
// PURPOSE: Every outcome is acknowledged with HTTP 200; the body carries success/failure

use crate::config::Config;
use crate::models::{InvoiceCallback, WebhookAck};
use crate::services::{token_matches, PaymentService, StatsCache, StatsService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;

pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

/// POST /api/webhooks/xendit
pub async fn xendit_invoice(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<StatsCache>>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    let token = req
        .headers()
        .get(CALLBACK_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());
    if !token_matches(&config.xendit_callback_token, token) {
        log::warn!("Xendit callback with invalid token");
        return HttpResponse::Ok().json(WebhookAck::failed("invalid callback token"));
    }

    let callback: InvoiceCallback = match serde_json::from_slice(&body) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Unreadable Xendit callback: {}", e);
            return HttpResponse::Ok().json(WebhookAck::failed("invalid payload"));
        }
    };

    log::info!(
        "Xendit callback {} for {}",
        callback.status,
        callback.external_id
    );

    let ack = match PaymentService::handle_invoice_callback(pool.get_ref(), &callback).await {
        Ok(ack) => {
            if ack.success && !ack.duplicate {
                StatsService::invalidate(&cache).await;
            }
            ack
        }
        Err(e) => {
            log::error!("Failed to process callback for {}: {}", callback.external_id, e);
            WebhookAck::failed("processing error")
        }
    };

    HttpResponse::Ok().json(ack)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/webhooks").route("/xendit", web::post().to(xendit_invoice)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
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
    async fn test_bad_token_is_acknowledged_with_failure() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/webhooks/xendit")
            .insert_header((CALLBACK_TOKEN_HEADER, "wrong"))
            .set_json(json!({ "external_id": "DON-1", "status": "PAID" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_rt::test]
    async fn test_missing_token_is_acknowledged_with_failure() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/webhooks/xendit")
            .set_json(json!({ "external_id": "DON-1", "status": "PAID" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_rt::test]
    async fn test_malformed_payload_is_acknowledged_with_failure() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/webhooks/xendit")
            .insert_header((CALLBACK_TOKEN_HEADER, "test-callback-token"))
            .set_payload("not json")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "invalid payload");
    }

    #[actix_rt::test]
    async fn test_unknown_status_is_ignored_without_database() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/webhooks/xendit")
            .insert_header((CALLBACK_TOKEN_HEADER, "test-callback-token"))
            .set_json(json!({ "external_id": "DON-1", "status": "PENDING" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
    }
}
