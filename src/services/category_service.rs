// src/services/category_service.rs
// DOCUMENTATION: Campaign categories

use crate::db::CategoryRepository;
use crate::errors::ApiError;
use crate::models::{slug_with_suffix, slugify, Category, CreateCategoryRequest, UpdateCategoryRequest};
use sqlx::PgPool;
use uuid::Uuid;

pub struct CategoryService;

impl CategoryService {
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, ApiError> {
        CategoryRepository::list(pool).await
    }

    /// Lookup by UUID or slug
    pub async fn get(pool: &PgPool, identifier: &str) -> Result<Category, ApiError> {
        CategoryRepository::get(pool, identifier).await
    }

    pub async fn create(pool: &PgPool, req: CreateCategoryRequest) -> Result<Category, ApiError> {
        let base = slugify(&req.name);
        let slug = if CategoryRepository::slug_exists(pool, &base).await? {
            slug_with_suffix(&base)
        } else {
            base
        };

        let category = CategoryRepository::create(
            pool,
            req.name.trim(),
            &slug,
            req.icon.as_deref(),
            req.description.as_deref(),
        )
        .await?;

        log::info!("Created category {} ({})", category.name, category.slug);
        Ok(category)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: UpdateCategoryRequest,
    ) -> Result<Category, ApiError> {
        CategoryRepository::update(
            pool,
            id,
            req.name.as_deref().map(str::trim),
            req.icon.as_deref(),
            req.description.as_deref(),
        )
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        CategoryRepository::delete(pool, id).await?;
        log::info!("Deleted category {}", id);
        Ok(())
    }
}
