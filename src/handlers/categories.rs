// src/handlers/categories.rs
// DOCUMENTATION: HTTP handlers for campaign categories

use super::extractors::AdminUser;
use crate::errors::ApiError;
use crate::models::{ApiResponse, CreateCategoryRequest, UpdateCategoryRequest};
use crate::services::CategoryService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /api/categories
pub async fn list_categories(pool: web::Data<PgPool>) -> Result<impl Responder, ApiError> {
    let categories = CategoryService::list(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(categories)))
}

/// GET /api/categories/{id}
/// Accepts a UUID or a slug
pub async fn get_category(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let category = CategoryService::get(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category)))
}

/// POST /api/categories
pub async fn create_category(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    req: web::Json<CreateCategoryRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let category = CategoryService::create(pool.get_ref(), req.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(category)))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateCategoryRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let category =
        CategoryService::update(pool.get_ref(), path.into_inner(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category)))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    CategoryService::delete(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(json!({ "id": id }), "Category deleted")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/categories")
            .route("", web::get().to(list_categories))
            .route("", web::post().to(create_category))
            .route("/{id}", web::get().to(get_category))
            .route("/{id}", web::put().to(update_category))
            .route("/{id}", web::delete().to(delete_category)),
    );
}
