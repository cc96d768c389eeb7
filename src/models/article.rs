// src/models/article.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// News/blog article managed from the back-office
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub author_id: Option<Uuid>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub author_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(url)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(url)]
    pub cover_image_url: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleQuery {
    /// Include drafts; honoured for admins only
    #[serde(default)]
    pub all: bool,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
