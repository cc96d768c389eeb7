// src/handlers/extractors.rs
// DOCUMENTATION: Request extractors for authenticated callers
// PURPOSE: Resolve `Authorization: Bearer` tokens and the admin header before handlers run

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::Role;
use crate::services::{decode_token, token_matches};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

fn app_config(req: &HttpRequest) -> Result<&Config, ApiError> {
    req.app_data::<web::Data<Config>>()
        .map(|c| c.get_ref())
        .ok_or_else(|| {
            log::error!("Config missing from application data");
            ApiError::InternalError
        })
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Caller authenticated with a bearer token
/// Use `Option<AuthUser>` on endpoints where login is optional
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    fn from_http_request(req: &HttpRequest) -> Result<Self, ApiError> {
        let config = app_config(req)?;
        let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;
        let claims = decode_token(config, token)?;
        Ok(Self {
            id: claims.sub,
            role: claims.role,
        })
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

/// Administrator, either through the static `X-Admin-Token` header
/// or a bearer token carrying the admin role
#[derive(Debug, Clone, Copy)]
pub struct AdminUser {
    /// Absent when authenticated with the static header
    pub user_id: Option<Uuid>,
}

impl AdminUser {
    fn from_http_request(req: &HttpRequest) -> Result<Self, ApiError> {
        let config = app_config(req)?;

        if let Some(header) = req.headers().get(ADMIN_TOKEN_HEADER) {
            if !token_matches(&config.admin_token, header.to_str().ok()) {
                log::warn!("Admin request with invalid token");
                return Err(ApiError::Forbidden);
            }
            return Ok(Self { user_id: None });
        }

        let user = AuthUser::from_http_request(req).map_err(|e| {
            log::warn!("Admin request without credentials");
            e
        })?;
        if !user.is_admin() {
            log::warn!("User {} attempted an admin operation", user.id);
            return Err(ApiError::Forbidden);
        }
        Ok(Self {
            user_id: Some(user.id),
        })
    }
}

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::issue_token;
    use actix_web::test::TestRequest;

    fn request_with(config: &Config) -> TestRequest {
        TestRequest::default().app_data(web::Data::new(config.clone()))
    }

    #[test]
    fn test_auth_user_from_bearer() {
        let config = Config::for_tests();
        let id = Uuid::new_v4();
        let token = issue_token(&config, id, Role::Donor).unwrap();

        let req = request_with(&config)
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let user = AuthUser::from_http_request(&req).unwrap();
        assert_eq!(user.id, id);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_auth_user_requires_token() {
        let config = Config::for_tests();
        let req = request_with(&config).to_http_request();
        assert!(matches!(
            AuthUser::from_http_request(&req),
            Err(ApiError::Unauthorized)
        ));

        let req = request_with(&config)
            .insert_header(("Authorization", "Basic abc"))
            .to_http_request();
        assert!(matches!(
            AuthUser::from_http_request(&req),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_admin_via_header() {
        let config = Config::for_tests();
        let req = request_with(&config)
            .insert_header((ADMIN_TOKEN_HEADER, "test-admin-token"))
            .to_http_request();
        let admin = AdminUser::from_http_request(&req).unwrap();
        assert!(admin.user_id.is_none());

        let req = request_with(&config)
            .insert_header((ADMIN_TOKEN_HEADER, "wrong"))
            .to_http_request();
        assert!(matches!(
            AdminUser::from_http_request(&req),
            Err(ApiError::Forbidden)
        ));

        let req = request_with(&config)
            .insert_header((ADMIN_TOKEN_HEADER, "test-admin-token-extra"))
            .to_http_request();
        assert!(matches!(
            AdminUser::from_http_request(&req),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn test_empty_admin_token_never_matches() {
        let mut config = Config::for_tests();
        config.admin_token = String::new();
        let req = request_with(&config)
            .insert_header((ADMIN_TOKEN_HEADER, ""))
            .to_http_request();
        assert!(matches!(
            AdminUser::from_http_request(&req),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn test_admin_via_role() {
        let config = Config::for_tests();
        let admin_id = Uuid::new_v4();
        let admin_token = issue_token(&config, admin_id, Role::Admin).unwrap();
        let req = request_with(&config)
            .insert_header(("Authorization", format!("Bearer {}", admin_token)))
            .to_http_request();
        assert_eq!(AdminUser::from_http_request(&req).unwrap().user_id, Some(admin_id));

        let organizer_token = issue_token(&config, Uuid::new_v4(), Role::Organizer).unwrap();
        let req = request_with(&config)
            .insert_header(("Authorization", format!("Bearer {}", organizer_token)))
            .to_http_request();
        assert!(matches!(
            AdminUser::from_http_request(&req),
            Err(ApiError::Forbidden)
        ));

        let req = request_with(&config).to_http_request();
        assert!(matches!(
            AdminUser::from_http_request(&req),
            Err(ApiError::Unauthorized)
        ));
    }
}
