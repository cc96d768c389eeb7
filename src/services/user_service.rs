// src/services/user_service.rs
// DOCUMENTATION: Profile and admin operations on user accounts

use crate::db::UserRepository;
use crate::errors::ApiError;
use crate::models::{
    PageQuery, Paginated, Role, UpdateProfileRequest, UserListQuery, UserResponse,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserService;

impl UserService {
    pub async fn me(pool: &PgPool, user_id: Uuid) -> Result<UserResponse, ApiError> {
        let user = UserRepository::get_by_id(pool, user_id).await?;
        Ok(user.to_response())
    }

    pub async fn update_profile(
        pool: &PgPool,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<UserResponse, ApiError> {
        let user = UserRepository::update_profile(
            pool,
            user_id,
            req.name.as_deref().map(str::trim),
            req.phone.as_deref(),
            req.avatar_url.as_deref(),
            req.bio.as_deref(),
        )
        .await?;
        Ok(user.to_response())
    }

    pub async fn list(
        pool: &PgPool,
        query: UserListQuery,
    ) -> Result<Paginated<UserResponse>, ApiError> {
        let paging = PageQuery::new(query.page, query.limit);
        let (users, total) = UserRepository::list(pool, &query).await?;
        Ok(Paginated::new(users, total, paging).map(|u| u.to_response()))
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<UserResponse, ApiError> {
        Ok(UserRepository::get_by_id(pool, id).await?.to_response())
    }

    pub async fn toggle_verified(pool: &PgPool, id: Uuid) -> Result<UserResponse, ApiError> {
        let user = UserRepository::toggle_verified(pool, id).await?;
        log::info!("User {} verified flag is now {}", id, user.is_verified);
        Ok(user.to_response())
    }

    pub async fn set_role(
        pool: &PgPool,
        acting_admin: Option<Uuid>,
        id: Uuid,
        role: Role,
    ) -> Result<UserResponse, ApiError> {
        if acting_admin == Some(id) && role != Role::Admin {
            return Err(ApiError::InvalidState(
                "admins cannot demote themselves".into(),
            ));
        }
        let user = UserRepository::set_role(pool, id, role).await?;
        log::info!("User {} role set to {}", id, role);
        Ok(user.to_response())
    }

    pub async fn delete(pool: &PgPool, acting_admin: Option<Uuid>, id: Uuid) -> Result<(), ApiError> {
        if acting_admin == Some(id) {
            return Err(ApiError::InvalidState("admins cannot delete themselves".into()));
        }
        UserRepository::delete(pool, id).await?;
        log::info!("Deleted user {}", id);
        Ok(())
    }
}
