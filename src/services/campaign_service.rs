// src/services/campaign_service.rs
// DOCUMENTATION: Business logic for campaigns
// PURPOSE: Ownership checks, slug allocation and lifecycle transitions

use crate::db::{CampaignRepository, DonationRepository, UserRepository};
use crate::errors::ApiError;
use crate::models::{
    slug_with_suffix, slugify, Campaign, CampaignQuery, CampaignResponse, CampaignStatus,
    CreateCampaignRequest, NotificationKind, PageQuery, Paginated, PublicDonation, Role,
    UpdateCampaignRequest,
};
use crate::services::NotificationService;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct CampaignService;

impl CampaignService {
    /// Create a campaign
    /// Verified organizers submit for review; admins publish directly
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        req: CreateCampaignRequest,
    ) -> Result<CampaignResponse, ApiError> {
        let user = UserRepository::get_by_id(pool, user_id).await?;

        let status = match user.role() {
            Role::Admin => CampaignStatus::Active,
            Role::Organizer if user.is_verified => CampaignStatus::Pending,
            _ => {
                log::warn!("User {} tried to create a campaign without verification", user_id);
                return Err(ApiError::Forbidden);
            }
        };

        let now = Utc::now();
        if req.end_date.is_some_and(|end| end <= now) {
            return Err(ApiError::ValidationError("end_date must be in the future".into()));
        }

        let slug = Self::allocate_slug(pool, &req.title).await?;
        let campaign = CampaignRepository::create(pool, user_id, &slug, status, &req).await?;

        log::info!("Campaign {} created by {} as {}", campaign.id, user_id, status);
        Ok(campaign.to_response(now))
    }

    async fn allocate_slug(pool: &PgPool, title: &str) -> Result<String, ApiError> {
        let base = slugify(title);
        if CampaignRepository::slug_exists(pool, &base).await? {
            Ok(slug_with_suffix(&base))
        } else {
            Ok(base)
        }
    }

    /// Lookup by UUID or slug
    pub async fn get(pool: &PgPool, identifier: &str) -> Result<CampaignResponse, ApiError> {
        let campaign = match Uuid::parse_str(identifier) {
            Ok(id) => CampaignRepository::get_by_id(pool, id).await?,
            Err(_) => CampaignRepository::get_by_slug(pool, identifier).await?,
        };
        Ok(campaign.to_response(Utc::now()))
    }

    pub async fn search(
        pool: &PgPool,
        query: CampaignQuery,
    ) -> Result<Paginated<CampaignResponse>, ApiError> {
        let paging = PageQuery::new(query.page, query.limit);
        let (campaigns, total) = CampaignRepository::search(pool, &query).await?;
        let now = Utc::now();
        Ok(Paginated::new(campaigns, total, paging).map(|c| c.to_response(now)))
    }

    /// Campaigns owned by the caller, in every status
    pub async fn mine(
        pool: &PgPool,
        user_id: Uuid,
        paging: PageQuery,
    ) -> Result<Paginated<CampaignResponse>, ApiError> {
        let query = CampaignQuery {
            status: Some("all".into()),
            organizer_id: Some(user_id),
            page: paging.page,
            limit: paging.limit,
            ..Default::default()
        };
        Self::search(pool, query).await
    }

    async fn load_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<Campaign, ApiError> {
        let campaign = CampaignRepository::get_by_id(pool, id).await?;
        if campaign.organizer_id != user_id && role != Role::Admin {
            log::warn!("User {} is not allowed to modify campaign {}", user_id, id);
            return Err(ApiError::Forbidden);
        }
        Ok(campaign)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        role: Role,
        req: UpdateCampaignRequest,
    ) -> Result<CampaignResponse, ApiError> {
        Self::load_owned(pool, id, user_id, role).await?;

        let now = Utc::now();
        if req.end_date.is_some_and(|end| end <= now) {
            return Err(ApiError::ValidationError("end_date must be in the future".into()));
        }

        let campaign = CampaignRepository::update(pool, id, &req).await?;
        Ok(campaign.to_response(now))
    }

    /// Organizers may only delete campaigns that never received money
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid, role: Role) -> Result<(), ApiError> {
        Self::load_owned(pool, id, user_id, role).await?;

        if role != Role::Admin && CampaignRepository::count_successful_donations(pool, id).await? > 0 {
            return Err(ApiError::InvalidState(
                "campaign has received donations and cannot be deleted".into(),
            ));
        }

        CampaignRepository::delete(pool, id).await?;
        log::info!("Campaign {} deleted by {}", id, user_id);
        Ok(())
    }

    /// Admin moderation: approve, reject, complete, close or reopen
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        next: CampaignStatus,
        reason: Option<String>,
    ) -> Result<CampaignResponse, ApiError> {
        let campaign = CampaignRepository::get_by_id(pool, id).await?;
        let current = campaign
            .status()
            .ok_or_else(|| ApiError::InvalidState(format!("unknown status '{}'", campaign.status)))?;

        if !current.can_transition_to(next) {
            return Err(ApiError::InvalidState(format!(
                "cannot move campaign from {} to {}",
                current, next
            )));
        }

        let updated = CampaignRepository::set_status(pool, id, next, reason.as_deref()).await?;
        log::info!("Campaign {} moved from {} to {}", id, current, next);

        let message = match reason.as_deref() {
            Some(r) if !r.trim().is_empty() => {
                format!("Your campaign \"{}\" is now {}: {}", updated.title, next, r.trim())
            }
            _ => format!("Your campaign \"{}\" is now {}", updated.title, next),
        };
        NotificationService::notify(
            pool,
            updated.organizer_id,
            NotificationKind::CampaignStatus,
            "Campaign status updated",
            message,
            Some(format!("/campaigns/{}", updated.slug)),
        )
        .await;

        Ok(updated.to_response(Utc::now()))
    }

    pub async fn toggle_featured(pool: &PgPool, id: Uuid) -> Result<CampaignResponse, ApiError> {
        let campaign = CampaignRepository::toggle_featured(pool, id).await?;
        Ok(campaign.to_response(Utc::now()))
    }

    /// Paid donations of a campaign with anonymous donors masked
    pub async fn donations(
        pool: &PgPool,
        identifier: &str,
        paging: PageQuery,
    ) -> Result<Paginated<PublicDonation>, ApiError> {
        let campaign_id = match Uuid::parse_str(identifier) {
            Ok(id) => id,
            Err(_) => CampaignRepository::get_by_slug(pool, identifier).await?.id,
        };
        let (donations, total) =
            DonationRepository::list_successful_by_campaign(pool, campaign_id, paging).await?;
        Ok(Paginated::new(donations, total, paging).map(|d| d.to_public()))
    }
}
