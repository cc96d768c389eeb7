// src/db/campaign_repository.rs
// DOCUMENTATION: Campaign database operations
// PURPOSE: CRUD, listing filters and atomic running-total updates

use crate::errors::ApiError;
use crate::models::{Campaign, CampaignQuery, CampaignStatus, CreateCampaignRequest, PageQuery, UpdateCampaignRequest};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const SELECT_CAMPAIGN: &str = r#"
    SELECT c.*, cat.name AS category_name, u.name AS organizer_name
    FROM campaigns c
    LEFT JOIN categories cat ON cat.id = c.category_id
    LEFT JOIN users u ON u.id = c.organizer_id
"#;

pub struct CampaignRepository;

impl CampaignRepository {
    pub async fn create(
        pool: &PgPool,
        organizer_id: Uuid,
        slug: &str,
        status: CampaignStatus,
        req: &CreateCampaignRequest,
    ) -> Result<Campaign, ApiError> {
        let inserted: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO campaigns (
                id, title, slug, description, story, image_url,
                category_id, organizer_id, target_amount, status, end_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4()) // $1
        .bind(&req.title) // $2
        .bind(slug) // $3
        .bind(&req.description) // $4
        .bind(&req.story) // $5
        .bind(&req.image_url) // $6
        .bind(req.category_id) // $7
        .bind(organizer_id) // $8
        .bind(req.target_amount) // $9
        .bind(status.as_str()) // $10
        .bind(req.end_date) // $11
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ApiError::InvalidInput("category_id does not exist".into())
            }
            e => {
                log::error!("Failed to create campaign: {}", e);
                ApiError::DatabaseError(e.to_string())
            }
        })?;

        let campaign = Self::get_by_id(pool, inserted.0).await?;
        log::info!("Created campaign {} by organizer {}", campaign.id, organizer_id);
        Ok(campaign)
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Campaign, ApiError> {
        let sql = format!("{} WHERE c.id = $1", SELECT_CAMPAIGN);
        sqlx::query_as::<_, Campaign>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching campaign: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| {
                log::warn!("Campaign not found: {}", id);
                ApiError::NotFound("Campaign".into())
            })
    }

    pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Campaign, ApiError> {
        let sql = format!("{} WHERE c.slug = $1", SELECT_CAMPAIGN);
        sqlx::query_as::<_, Campaign>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching campaign by slug {}: {}", slug, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound("Campaign".into()))
    }

    /// Locks the campaign row for the rest of the transaction
    pub async fn get_for_update(conn: &mut PgConnection, id: Uuid) -> Result<Campaign, ApiError> {
        sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| ApiError::NotFound("Campaign".into()))
    }

    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, ApiError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM campaigns WHERE slug = $1)")
                .bind(slug)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Filtered, paginated listing
    /// Returns tuple: (results, total_count)
    pub async fn search(
        pool: &PgPool,
        query: &CampaignQuery,
    ) -> Result<(Vec<Campaign>, i64), ApiError> {
        let paging = PageQuery::new(query.page, query.limit);

        fn filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, query: &'a CampaignQuery) {
            qb.push(" WHERE 1 = 1");

            match query.status.as_deref() {
                Some("all") => {}
                Some(status) => {
                    qb.push(" AND c.status = ").push_bind(status);
                }
                None => {
                    qb.push(" AND c.status = ")
                        .push_bind(CampaignStatus::Active.as_str());
                }
            }

            if let Some(category) = query.category.as_deref() {
                match Uuid::parse_str(category) {
                    Ok(id) => {
                        qb.push(" AND c.category_id = ").push_bind(id);
                    }
                    Err(_) => {
                        qb.push(" AND cat.slug = ").push_bind(category);
                    }
                }
            }

            if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = format!("%{}%", search.trim());
                qb.push(" AND (c.title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR c.description ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }

            if let Some(organizer_id) = query.organizer_id {
                qb.push(" AND c.organizer_id = ").push_bind(organizer_id);
            }

            if let Some(featured) = query.featured {
                qb.push(" AND c.is_featured = ").push_bind(featured);
            }
        }

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM campaigns c LEFT JOIN categories cat ON cat.id = c.category_id",
        );
        filters(&mut count, query);
        let (total,): (i64,) = count.build_query_as().fetch_one(pool).await.map_err(|e| {
            log::error!("Count query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_CAMPAIGN);
        filters(&mut select, query);
        select
            .push(" ORDER BY c.is_featured DESC, c.created_at DESC LIMIT ")
            .push_bind(paging.limit())
            .push(" OFFSET ")
            .push_bind(paging.offset());

        let campaigns = select
            .build_query_as::<Campaign>()
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Search query error: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        log::debug!(
            "Campaign search: {} results, {} total (page {})",
            campaigns.len(),
            total,
            paging.page()
        );

        Ok((campaigns, total))
    }

    /// Partial update - only provided fields are modified
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateCampaignRequest,
    ) -> Result<Campaign, ApiError> {
        let updated: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE campaigns
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                story = COALESCE($3, story),
                image_url = COALESCE($4, image_url),
                category_id = COALESCE($5, category_id),
                target_amount = COALESCE($6, target_amount),
                end_date = COALESCE($7, end_date),
                updated_at = NOW()
            WHERE id = $8
            RETURNING id
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.story)
        .bind(&req.image_url)
        .bind(req.category_id)
        .bind(req.target_amount)
        .bind(req.end_date)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Update failed for campaign {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let (id,) = updated.ok_or_else(|| ApiError::NotFound("Campaign".into()))?;
        log::info!("Updated campaign: {}", id);
        Self::get_by_id(pool, id).await
    }

    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: CampaignStatus,
        reason: Option<&str>,
    ) -> Result<Campaign, ApiError> {
        let rows = sqlx::query(
            "UPDATE campaigns SET status = $1, status_reason = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(status.as_str())
        .bind(reason)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Campaign".into()));
        }
        Self::get_by_id(pool, id).await
    }

    pub async fn toggle_featured(pool: &PgPool, id: Uuid) -> Result<Campaign, ApiError> {
        let rows = sqlx::query(
            "UPDATE campaigns SET is_featured = NOT is_featured, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Campaign".into()));
        }
        Self::get_by_id(pool, id).await
    }

    /// Add a paid donation to the running total in a single statement
    pub async fn credit(conn: &mut PgConnection, id: Uuid, amount: i64) -> Result<(), ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE campaigns
            SET current_amount = current_amount + $1,
                donor_count = donor_count + 1,
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(amount)
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Campaign".into()));
        }
        Ok(())
    }

    /// Reverse a previous credit
    pub async fn debit(conn: &mut PgConnection, id: Uuid, amount: i64) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE campaigns
            SET current_amount = GREATEST(current_amount - $1, 0),
                donor_count = GREATEST(donor_count - 1, 0),
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(amount)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn count_successful_donations(pool: &PgPool, id: Uuid) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM donations WHERE campaign_id = $1 AND status IN ('paid', 'settled')",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Delete failed for campaign {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Campaign".into()));
        }

        log::info!("Deleted campaign: {}", id);
        Ok(())
    }
}
