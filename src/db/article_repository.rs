// src/db/article_repository.rs
// DOCUMENTATION: Article CMS database operations

use crate::errors::ApiError;
use crate::models::{Article, CreateArticleRequest, PageQuery, UpdateArticleRequest};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const SELECT_ARTICLE: &str = r#"
    SELECT a.*, u.name AS author_name
    FROM articles a
    LEFT JOIN users u ON u.id = a.author_id
"#;

pub struct ArticleRepository;

impl ArticleRepository {
    pub async fn create(
        pool: &PgPool,
        author_id: Option<Uuid>,
        slug: &str,
        req: &CreateArticleRequest,
    ) -> Result<Article, ApiError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO articles (
                id, title, slug, excerpt, content, cover_image_url,
                author_id, is_published, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $8 THEN NOW() ELSE NULL END)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.title)
        .bind(slug)
        .bind(&req.excerpt)
        .bind(&req.content)
        .bind(&req.cover_image_url)
        .bind(author_id)
        .bind(req.is_published)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create article: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        log::info!("Created article {} ({})", slug, id);
        Self::get_by_id(pool, id).await
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Article, ApiError> {
        let sql = format!("{} WHERE a.id = $1", SELECT_ARTICLE);
        sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Article".into()))
    }

    pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Article, ApiError> {
        let sql = format!("{} WHERE a.slug = $1", SELECT_ARTICLE);
        sqlx::query_as::<_, Article>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Article".into()))
    }

    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, ApiError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM articles WHERE slug = $1)")
                .bind(slug)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    pub async fn list(
        pool: &PgPool,
        include_drafts: bool,
        search: Option<&str>,
        paging: PageQuery,
    ) -> Result<(Vec<Article>, i64), ApiError> {
        fn filters<'a>(
            qb: &mut QueryBuilder<'a, Postgres>,
            include_drafts: bool,
            search: Option<&'a str>,
        ) {
            qb.push(" WHERE 1 = 1");
            if !include_drafts {
                qb.push(" AND a.is_published = TRUE");
            }
            if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
                qb.push(" AND a.title ILIKE ")
                    .push_bind(format!("%{}%", search.trim()));
            }
        }

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles a");
        filters(&mut count, include_drafts, search);
        let (total,): (i64,) = count.build_query_as().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_ARTICLE);
        filters(&mut select, include_drafts, search);
        select
            .push(" ORDER BY COALESCE(a.published_at, a.created_at) DESC LIMIT ")
            .push_bind(paging.limit())
            .push(" OFFSET ")
            .push_bind(paging.offset());

        let articles = select.build_query_as::<Article>().fetch_all(pool).await?;
        Ok((articles, total))
    }

    pub async fn increment_views(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        sqlx::query("UPDATE articles SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Partial update; `published_at` is stamped the first time an article goes live
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        slug: Option<&str>,
        req: &UpdateArticleRequest,
    ) -> Result<Article, ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE articles
            SET title = COALESCE($1, title),
                slug = COALESCE($2, slug),
                excerpt = COALESCE($3, excerpt),
                content = COALESCE($4, content),
                cover_image_url = COALESCE($5, cover_image_url),
                is_published = COALESCE($6, is_published),
                published_at = CASE
                    WHEN COALESCE($6, is_published) AND published_at IS NULL THEN NOW()
                    ELSE published_at
                END,
                updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&req.title)
        .bind(slug)
        .bind(&req.excerpt)
        .bind(&req.content)
        .bind(&req.cover_image_url)
        .bind(req.is_published)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Update failed for article {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Article".into()));
        }
        Self::get_by_id(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Article".into()));
        }
        log::info!("Deleted article: {}", id);
        Ok(())
    }
}
