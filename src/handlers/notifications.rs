// src/handlers/notifications.rs
// DOCUMENTATION: In-app notification inbox

use super::extractors::AuthUser;
use crate::db::NotificationRepository;
use crate::errors::ApiError;
use crate::models::{ApiResponse, NotificationQuery, PageQuery, Paginated};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// GET /api/notifications
pub async fn list_notifications(
    pool: web::Data<PgPool>,
    user: AuthUser,
    query: web::Query<NotificationQuery>,
) -> Result<impl Responder, ApiError> {
    let query = query.into_inner();
    let paging = PageQuery::new(query.page, query.limit);
    let (rows, total) = NotificationRepository::list_by_user(pool.get_ref(), user.id, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(Paginated::new(rows, total, paging))))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let count = NotificationRepository::unread_count(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({ "count": count }))))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let notification =
        NotificationRepository::mark_read(pool.get_ref(), user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(notification)))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let updated = NotificationRepository::mark_all_read(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({ "updated": updated }))))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    NotificationRepository::delete(pool.get_ref(), user.id, id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(json!({ "id": id }), "Notification deleted")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notifications")
            .route("", web::get().to(list_notifications))
            .route("/unread-count", web::get().to(unread_count))
            .route("/read-all", web::put().to(mark_all_read))
            .route("/{id}/read", web::put().to(mark_read))
            .route("/{id}", web::delete().to(delete_notification)),
    );
}
