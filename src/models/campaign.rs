// src/models/campaign.rs
// DOCUMENTATION: Fundraising campaigns
// PURPOSE: Row mapping, lifecycle rules and request/response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::common::string_enum;

/// Campaign lifecycle
/// pending → active | rejected, active → completed | closed, closed → active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Pending,
    Active,
    Rejected,
    Completed,
    Closed,
}

string_enum!(CampaignStatus {
    Pending => "pending",
    Active => "active",
    Rejected => "rejected",
    Completed => "completed",
    Closed => "closed",
});

impl CampaignStatus {
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Pending, Rejected)
                | (Active, Completed)
                | (Active, Closed)
                | (Closed, Active)
        )
    }
}

/// Row of the `campaigns` table joined with category and organizer names
#[derive(Debug, Clone, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub story: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub organizer_id: Uuid,
    pub target_amount: i64,
    pub current_amount: i64,
    pub donor_count: i32,
    pub status: String,
    pub status_reason: Option<String>,
    pub is_featured: bool,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub category_name: Option<String>,
    #[sqlx(default)]
    pub organizer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub story: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub organizer_id: Uuid,
    pub organizer_name: Option<String>,
    pub target_amount: i64,
    pub current_amount: i64,
    pub donor_count: i32,
    pub progress_percent: f64,
    pub days_left: Option<i64>,
    pub status: String,
    pub status_reason: Option<String>,
    pub is_featured: bool,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn status(&self) -> Option<CampaignStatus> {
        self.status.parse().ok()
    }

    /// Percentage of the target raised, rounded to one decimal, capped at 100
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount <= 0 {
            return 0.0;
        }
        let pct = self.current_amount as f64 * 100.0 / self.target_amount as f64;
        (pct.min(100.0) * 10.0).round() / 10.0
    }

    /// Whole days until `end_date`; zero once it has passed
    pub fn days_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.end_date
            .map(|end| (end - now).num_days().max(0))
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_date.is_some_and(|end| end <= now)
    }

    /// Donations are only accepted while active and before the end date
    pub fn accepts_donations(&self, now: DateTime<Utc>) -> bool {
        self.status() == Some(CampaignStatus::Active) && !self.has_ended(now)
    }

    pub fn to_response(&self, now: DateTime<Utc>) -> CampaignResponse {
        CampaignResponse {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            story: self.story.clone(),
            image_url: self.image_url.clone(),
            category_id: self.category_id,
            category_name: self.category_name.clone(),
            organizer_id: self.organizer_id,
            organizer_name: self.organizer_name.clone(),
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            donor_count: self.donor_count,
            progress_percent: self.progress_percent(),
            days_left: self.days_left(now),
            status: self.status.clone(),
            status_reason: self.status_reason.clone(),
            is_featured: self.is_featured,
            end_date: self.end_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    #[validate(length(min = 5, max = 200))]
    pub title: String,
    #[validate(length(min = 10, max = 500))]
    pub description: String,
    pub story: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub target_amount: i64,
    pub end_date: Option<DateTime<Utc>>,
}

/// Partial update; only provided fields change
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCampaignRequest {
    #[validate(length(min = 5, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 10, max = 500))]
    pub description: Option<String>,
    pub story: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub target_amount: Option<i64>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CampaignStatusRequest {
    pub status: CampaignStatus,
    pub reason: Option<String>,
}

/// Query string of GET /api/campaigns
#[derive(Debug, Default, Deserialize)]
pub struct CampaignQuery {
    /// Category slug or id
    pub category: Option<String>,
    /// Defaults to `active`; `all` disables the filter
    pub status: Option<String>,
    /// Case-insensitive match on title and description
    pub search: Option<String>,
    pub organizer_id: Option<Uuid>,
    pub featured: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn campaign(status: &str, current: i64, target: i64) -> Campaign {
        Campaign {
            id: Uuid::new_v4(),
            title: "Sumur untuk desa".into(),
            slug: "sumur-untuk-desa".into(),
            description: "Membangun sumur bersih".into(),
            story: None,
            image_url: None,
            category_id: None,
            organizer_id: Uuid::new_v4(),
            target_amount: target,
            current_amount: current,
            donor_count: 0,
            status: status.into(),
            status_reason: None,
            is_featured: false,
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            category_name: None,
            organizer_name: None,
        }
    }

    #[test]
    fn test_status_transitions() {
        use CampaignStatus::*;
        assert!(Pending.can_transition_to(Active));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Active.can_transition_to(Closed));
        assert!(Closed.can_transition_to(Active));
        assert!(!Rejected.can_transition_to(Active));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Active.can_transition_to(Pending));
    }

    #[test]
    fn test_progress_percent_is_capped() {
        assert_eq!(campaign("active", 250_000, 1_000_000).progress_percent(), 25.0);
        assert_eq!(campaign("active", 1, 3).progress_percent(), 33.3);
        assert_eq!(campaign("active", 5_000_000, 1_000_000).progress_percent(), 100.0);
    }

    #[test]
    fn test_accepts_donations() {
        let now = Utc::now();
        let mut c = campaign("active", 0, 100);
        assert!(c.accepts_donations(now));

        c.end_date = Some(now - Duration::hours(1));
        assert!(!c.accepts_donations(now));
        assert_eq!(c.days_left(now), Some(0));

        c.end_date = Some(now + Duration::days(3) + Duration::hours(1));
        assert_eq!(c.days_left(now), Some(3));

        let pending = campaign("pending", 0, 100);
        assert!(!pending.accepts_donations(now));
    }
}
