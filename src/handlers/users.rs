// src/handlers/users.rs
// DOCUMENTATION: Own profile plus admin user management

use super::extractors::{AdminUser, AuthUser};
use crate::errors::ApiError;
use crate::models::{ApiResponse, UpdateProfileRequest, UpdateRoleRequest, UserListQuery};
use crate::services::UserService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// PUT /api/users/me
pub async fn update_me(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let profile = UserService::update_profile(pool.get_ref(), user.id, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(profile)))
}

/// GET /api/users
pub async fn list_users(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<UserListQuery>,
) -> Result<impl Responder, ApiError> {
    let users = UserService::list(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(users)))
}

/// GET /api/users/{id}
pub async fn get_user(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let user = UserService::get(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// PUT /api/users/{id}/verify
pub async fn toggle_verify(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let user = UserService::toggle_verified(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// PUT /api/users/{id}/role
pub async fn set_role(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateRoleRequest>,
) -> Result<impl Responder, ApiError> {
    let user =
        UserService::set_role(pool.get_ref(), admin.user_id, path.into_inner(), req.role).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    UserService::delete(pool.get_ref(), admin.user_id, id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(json!({ "id": id }), "User deleted")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .route("", web::get().to(list_users))
            .route("/me", web::put().to(update_me))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::delete().to(delete_user))
            .route("/{id}/verify", web::put().to(toggle_verify))
            .route("/{id}/role", web::put().to(set_role)),
    );
}
