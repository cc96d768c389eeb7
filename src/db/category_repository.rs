// src/db/category_repository.rs
// DOCUMENTATION: Category database operations

use crate::errors::ApiError;
use crate::models::Category;
use sqlx::PgPool;
use uuid::Uuid;

const SELECT_CATEGORY: &str = r#"
    SELECT cat.*,
           (SELECT COUNT(*) FROM campaigns c
             WHERE c.category_id = cat.id AND c.status = 'active') AS campaign_count
    FROM categories cat
"#;

pub struct CategoryRepository;

impl CategoryRepository {
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, ApiError> {
        let sql = format!("{} ORDER BY cat.name ASC", SELECT_CATEGORY);
        sqlx::query_as::<_, Category>(&sql)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list categories: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Look up by UUID or slug
    pub async fn get(pool: &PgPool, identifier: &str) -> Result<Category, ApiError> {
        let query = match Uuid::parse_str(identifier) {
            Ok(id) => {
                let sql = format!("{} WHERE cat.id = $1", SELECT_CATEGORY);
                sqlx::query_as::<_, Category>(&sql)
                    .bind(id)
                    .fetch_optional(pool)
                    .await
            }
            Err(_) => {
                let sql = format!("{} WHERE cat.slug = $1", SELECT_CATEGORY);
                sqlx::query_as::<_, Category>(&sql)
                    .bind(identifier)
                    .fetch_optional(pool)
                    .await
            }
        };

        query
            .map_err(|e| {
                log::error!("Failed to fetch category {}: {}", identifier, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound("Category".into()))
    }

    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, ApiError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
                .bind(slug)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    pub async fn create(
        pool: &PgPool,
        name: &str,
        slug: &str,
        icon: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, ApiError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, slug, icon, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(icon)
        .bind(description)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::AlreadyExists(format!("category '{}'", slug))
            }
            e => {
                log::error!("Failed to create category: {}", e);
                ApiError::DatabaseError(e.to_string())
            }
        })?;

        log::info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        name: Option<&str>,
        icon: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, ApiError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($1, name),
                icon = COALESCE($2, icon),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(icon)
        .bind(description)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Update failed for category {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Category".into()))
    }

    /// Hard delete; refused while campaigns still reference the category
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let (in_use,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM campaigns WHERE category_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        if in_use > 0 {
            return Err(ApiError::InvalidState(format!(
                "category is used by {} campaign(s)",
                in_use
            )));
        }

        let rows = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Category".into()));
        }

        log::info!("Deleted category: {}", id);
        Ok(())
    }
}
