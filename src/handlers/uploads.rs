// src/handlers/uploads.rs
// DOCUMENTATION: Image upload and serving
// PURPOSE: Accept raw image bodies and serve them back under /uploads

use super::extractors::AuthUser;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::ApiResponse;
use crate::services::{content_type_for, extension_for, UploadStorage};
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: usize,
}

/// POST /api/uploads
/// Body is the raw image; Content-Type selects the extension
pub async fn upload(
    config: web::Data<Config>,
    storage: web::Data<UploadStorage>,
    _user: AuthUser,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<impl Responder, ApiError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if extension_for(content_type).is_none() {
        return Err(ApiError::InvalidInput(format!(
            "unsupported content type '{}'; use image/png, image/jpeg, image/webp or image/gif",
            content_type
        )));
    }

    let body = match payload.to_bytes_limited(config.max_upload_bytes).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            log::warn!("Upload body could not be read: {}", e);
            return Err(ApiError::InvalidInput("upload body could not be read".into()));
        }
        Err(_) => return Err(ApiError::PayloadTooLarge(config.max_upload_bytes)),
    };
    if body.is_empty() {
        return Err(ApiError::InvalidInput("empty upload".into()));
    }

    let stored = storage.save(content_type, &body).await.map_err(|e| {
        log::error!("Failed to store upload: {:#}", e);
        ApiError::InternalError
    })?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(UploadResponse {
        url: config.upload_url(&stored.filename),
        filename: stored.filename,
        size: stored.size,
    })))
}

/// GET /uploads/{filename}
pub async fn serve_upload(
    storage: web::Data<UploadStorage>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let filename = path.into_inner();
    let content_type =
        content_type_for(&filename).ok_or_else(|| ApiError::NotFound("File".into()))?;

    let bytes = storage
        .read(&filename)
        .await
        .map_err(|e| {
            log::error!("Failed to read upload {}: {:#}", filename, e);
            ApiError::InternalError
        })?
        .ok_or_else(|| ApiError::NotFound("File".into()))?;

    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, content_type))
        .insert_header((CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}

/// Upload routes; the handler streams the body and enforces MAX_UPLOAD_BYTES itself
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/uploads", web::post().to(upload))
        .route("/uploads/{filename}", web::get().to(serve_upload));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::issue_token;
    use actix_web::{http::StatusCode, test, App};
    use uuid::Uuid;

    macro_rules! test_app {
        ($config:expr) => {{
            let config: Config = $config;
            let storage = UploadStorage::new(std::path::PathBuf::from(&config.upload_dir))
                .await
                .unwrap();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(config))
                    .app_data(web::Data::new(storage))
                    .configure(super::config),
            )
            .await
        }};
    }

    fn bearer(config: &Config) -> String {
        let token = issue_token(config, Uuid::new_v4(), Role::Donor).unwrap();
        format!("Bearer {}", token)
    }

    #[actix_rt::test]
    async fn test_upload_requires_login() {
        let app = test_app!(Config::for_tests());
        let req = test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header((CONTENT_TYPE, "image/png"))
            .set_payload(vec![1u8; 10])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_upload_rejects_unsupported_type() {
        let config = Config::for_tests();
        let auth = bearer(&config);
        let app = test_app!(config);
        let req = test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(("Authorization", auth))
            .insert_header((CONTENT_TYPE, "application/pdf"))
            .set_payload(vec![1u8; 10])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_upload_rejects_oversized_body() {
        let config = Config::for_tests();
        let auth = bearer(&config);
        let too_big = config.max_upload_bytes + 1;
        let app = test_app!(config);
        let req = test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(("Authorization", auth))
            .insert_header((CONTENT_TYPE, "image/png"))
            .set_payload(vec![1u8; too_big])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[actix_rt::test]
    async fn test_far_oversized_body_keeps_json_error() {
        let config = Config::for_tests();
        let auth = bearer(&config);
        let way_too_big = config.max_upload_bytes * 8;
        let app = test_app!(config);
        let req = test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(("Authorization", auth))
            .insert_header((CONTENT_TYPE, "image/jpeg"))
            .set_payload(vec![7u8; way_too_big])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[actix_rt::test]
    async fn test_upload_then_serve() {
        let config = Config::for_tests();
        let auth = bearer(&config);
        let app = test_app!(config);

        let req = test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(("Authorization", auth))
            .insert_header((CONTENT_TYPE, "image/gif"))
            .set_payload(&b"GIF89a-test"[..])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let filename = body["data"]["filename"].as_str().unwrap().to_string();
        assert!(filename.ends_with(".gif"));
        assert_eq!(body["data"]["size"], 11);
        assert_eq!(
            body["data"]["url"],
            format!("http://localhost:8080/uploads/{}", filename)
        );

        let req = test::TestRequest::get()
            .uri(&format!("/uploads/{}", filename))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), "image/gif");
        let bytes = test::read_body(resp).await;
        assert_eq!(&bytes[..], b"GIF89a-test");
    }

    #[actix_rt::test]
    async fn test_serve_rejects_traversal() {
        let app = test_app!(Config::for_tests());
        let req = test::TestRequest::get()
            .uri("/uploads/..%2F..%2Fetc%2Fpasswd.png")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
