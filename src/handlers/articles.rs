// src/handlers/articles.rs
// DOCUMENTATION: HTTP handlers for articles
// PURPOSE: Public reading plus admin authoring

use super::extractors::{AdminUser, AuthUser};
use crate::errors::ApiError;
use crate::models::{ApiResponse, ArticleQuery, CreateArticleRequest, UpdateArticleRequest};
use crate::services::ArticleService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /api/articles
/// Drafts are included only for admins passing `all=true`
pub async fn list_articles(
    pool: web::Data<PgPool>,
    user: Option<AuthUser>,
    query: web::Query<ArticleQuery>,
) -> Result<impl Responder, ApiError> {
    let is_admin = user.is_some_and(|u| u.is_admin());
    let articles = ArticleService::list(pool.get_ref(), query.into_inner(), is_admin).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(articles)))
}

/// GET /api/articles/{id}
pub async fn get_article(
    pool: web::Data<PgPool>,
    user: Option<AuthUser>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let is_admin = user.is_some_and(|u| u.is_admin());
    let article = ArticleService::get(pool.get_ref(), &path.into_inner(), is_admin).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(article)))
}

/// POST /api/articles
pub async fn create_article(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    req: web::Json<CreateArticleRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let article = ArticleService::create(pool.get_ref(), admin.user_id, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(article)))
}

/// PUT /api/articles/{id}
pub async fn update_article(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateArticleRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let article = ArticleService::update(pool.get_ref(), path.into_inner(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(article)))
}

/// DELETE /api/articles/{id}
pub async fn delete_article(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    ArticleService::delete(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(json!({ "id": id }), "Article deleted")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/articles")
            .route("", web::get().to(list_articles))
            .route("", web::post().to(create_article))
            .route("/{id}", web::get().to(get_article))
            .route("/{id}", web::put().to(update_article))
            .route("/{id}", web::delete().to(delete_article)),
    );
}
