// src/services/article_service.rs
// DOCUMENTATION: Blog/news articles

use crate::db::ArticleRepository;
use crate::errors::ApiError;
use crate::models::{
    slug_with_suffix, slugify, Article, ArticleQuery, CreateArticleRequest, PageQuery, Paginated,
    UpdateArticleRequest,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ArticleService;

impl ArticleService {
    /// Drafts are listed only when an admin asks for them
    pub async fn list(
        pool: &PgPool,
        query: ArticleQuery,
        is_admin: bool,
    ) -> Result<Paginated<Article>, ApiError> {
        let paging = PageQuery::new(query.page, query.limit);
        let (articles, total) =
            ArticleRepository::list(pool, query.all && is_admin, query.search.as_deref(), paging)
                .await?;
        Ok(Paginated::new(articles, total, paging))
    }

    /// Lookup by UUID or slug; public reads count as a view
    pub async fn get(pool: &PgPool, identifier: &str, is_admin: bool) -> Result<Article, ApiError> {
        let mut article = match Uuid::parse_str(identifier) {
            Ok(id) => ArticleRepository::get_by_id(pool, id).await?,
            Err(_) => ArticleRepository::get_by_slug(pool, identifier).await?,
        };

        if !article.is_published {
            if !is_admin {
                return Err(ApiError::NotFound("Article".into()));
            }
            return Ok(article);
        }

        ArticleRepository::increment_views(pool, article.id).await?;
        article.view_count += 1;
        Ok(article)
    }

    async fn allocate_slug(pool: &PgPool, title: &str) -> Result<String, ApiError> {
        let base = slugify(title);
        if ArticleRepository::slug_exists(pool, &base).await? {
            Ok(slug_with_suffix(&base))
        } else {
            Ok(base)
        }
    }

    pub async fn create(
        pool: &PgPool,
        author_id: Option<Uuid>,
        req: CreateArticleRequest,
    ) -> Result<Article, ApiError> {
        let slug = Self::allocate_slug(pool, &req.title).await?;
        let article = ArticleRepository::create(pool, author_id, &slug, &req).await?;
        log::info!("Created article {} ({})", article.id, article.slug);
        Ok(article)
    }

    /// A new title re-derives the slug
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: UpdateArticleRequest,
    ) -> Result<Article, ApiError> {
        let current = ArticleRepository::get_by_id(pool, id).await?;

        let slug = match req.title.as_deref() {
            Some(title) if slugify(title) != current.slug => {
                Some(Self::allocate_slug(pool, title).await?)
            }
            _ => None,
        };

        ArticleRepository::update(pool, id, slug.as_deref(), &req).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        ArticleRepository::delete(pool, id).await?;
        log::info!("Deleted article {}", id);
        Ok(())
    }
}
