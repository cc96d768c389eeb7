// src/services/recurring_service.rs
// DOCUMENTATION: Scheduled wallet donations
// PURPOSE: Manage plans and charge the ones that are due from a background task

use crate::config::Config;
use crate::db::{CampaignRepository, RecurringRepository, UserRepository};
use crate::errors::ApiError;
use crate::models::{
    Campaign, CreateRecurringRequest, Frequency, NotificationKind, RecurringDonation,
    RecurringStatus, Role, UpdateRecurringRequest,
};
use crate::services::{
    ensure_min_donation, format_rupiah, DonationService, NotificationService, WalletDonation,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{Connection, PgConnection, PgPool};
use std::time::Duration;
use uuid::Uuid;

/// Plans charged per scheduler tick
const BATCH_SIZE: usize = 100;

/// Next run strictly after `now`, skipping periods missed while the service was down
pub fn next_run(frequency: Frequency, scheduled: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let next = frequency.next_after(scheduled);
    if next > now {
        next
    } else {
        frequency.next_after(now)
    }
}

pub struct RecurringService;

impl RecurringService {
    pub async fn create(
        pool: &PgPool,
        config: &Config,
        user_id: Uuid,
        req: CreateRecurringRequest,
    ) -> Result<RecurringDonation, ApiError> {
        ensure_min_donation(config, req.amount)?;

        let campaign = CampaignRepository::get_by_id(pool, req.campaign_id).await?;
        let now = Utc::now();
        if !campaign.accepts_donations(now) {
            return Err(ApiError::InvalidState("campaign is not accepting donations".into()));
        }

        let plan = RecurringRepository::create(
            pool,
            user_id,
            campaign.id,
            req.amount,
            req.frequency,
            req.frequency.next_after(now),
        )
        .await?;

        log::info!(
            "Recurring {} donation {} of {} to campaign {}",
            req.frequency,
            plan.id,
            req.amount,
            campaign.id
        );
        Ok(plan)
    }

    pub async fn mine(pool: &PgPool, user_id: Uuid) -> Result<Vec<RecurringDonation>, ApiError> {
        RecurringRepository::list_by_user(pool, user_id).await
    }

    async fn load_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<RecurringDonation, ApiError> {
        let plan = RecurringRepository::get_by_id(pool, id).await?;
        if plan.user_id != user_id && role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(plan)
    }

    pub async fn update(
        pool: &PgPool,
        config: &Config,
        id: Uuid,
        user_id: Uuid,
        role: Role,
        req: UpdateRecurringRequest,
    ) -> Result<RecurringDonation, ApiError> {
        if let Some(amount) = req.amount {
            ensure_min_donation(config, amount)?;
        }

        let plan = Self::load_owned(pool, id, user_id, role).await?;

        if plan.status == RecurringStatus::Cancelled.as_str() {
            return Err(ApiError::InvalidState("recurring donation is cancelled".into()));
        }

        RecurringRepository::update(pool, id, req.status, req.amount).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid, role: Role) -> Result<(), ApiError> {
        Self::load_owned(pool, id, user_id, role).await?;
        RecurringRepository::delete(pool, id).await
    }

    /// Charge every active plan whose run is due; returns the number charged
    ///
    /// Each plan is claimed with `FOR UPDATE SKIP LOCKED` and its charge and
    /// schedule advance commit together, so concurrent runners never charge the
    /// same period twice. Plans that cannot be charged (empty wallet, campaign
    /// closed) notify the donor and move on to the next period. Unexpected errors
    /// roll the plan back so the next tick retries it.
    pub async fn run_due(pool: &PgPool, now: DateTime<Utc>) -> anyhow::Result<usize> {
        let mut attempted: Vec<Uuid> = Vec::new();
        let mut charged = 0;

        while attempted.len() < BATCH_SIZE {
            let mut tx = pool
                .begin()
                .await
                .context("starting recurring donation transaction")?;
            let Some(plan) = RecurringRepository::claim_due(&mut tx, now, &attempted)
                .await
                .context("claiming due recurring donation")?
            else {
                break;
            };
            attempted.push(plan.id);

            match Self::run_plan(&mut tx, &plan, now).await {
                Ok(outcome) => {
                    if let Err(e) = tx.commit().await {
                        log::error!("Recurring donation {} not committed: {}", plan.id, e);
                        continue;
                    }
                    match outcome {
                        Ok(campaign) => {
                            charged += 1;
                            DonationService::notify_organizer(pool, &campaign, plan.amount).await;
                        }
                        Err(reason) => Self::notify_skipped(pool, &plan, &reason).await,
                    }
                }
                Err(e) => {
                    log::error!("Recurring donation {} failed: {}", plan.id, e);
                }
            }
        }

        Ok(charged)
    }

    /// Charge inside a savepoint and advance the schedule on the outer transaction
    ///
    /// The outer `Err` is an unexpected failure; the inner one a skip reason.
    async fn run_plan(
        conn: &mut PgConnection,
        plan: &RecurringDonation,
        now: DateTime<Utc>,
    ) -> Result<Result<Campaign, ApiError>, ApiError> {
        let mut savepoint = conn.begin().await?;
        let outcome = match Self::charge(&mut savepoint, plan).await {
            Ok(campaign) => {
                savepoint.commit().await?;
                Ok(campaign)
            }
            Err(e @ (ApiError::InsufficientBalance | ApiError::InvalidState(_))) => {
                savepoint.rollback().await?;
                log::warn!("Recurring donation {} skipped: {}", plan.id, e);
                Err(e)
            }
            Err(e) => return Err(e),
        };

        let next = next_run(plan.frequency(), plan.next_run_at, now);
        RecurringRepository::advance(&mut *conn, plan.id, now, next).await?;
        Ok(outcome)
    }

    async fn charge(conn: &mut PgConnection, plan: &RecurringDonation) -> Result<Campaign, ApiError> {
        let donor = UserRepository::get_by_id(&mut *conn, plan.user_id).await?;
        let (donation, campaign) = DonationService::donate_from_wallet_in(
            &mut *conn,
            &WalletDonation {
                donor: &donor,
                campaign_id: plan.campaign_id,
                amount: plan.amount,
                message: None,
                is_anonymous: false,
            },
        )
        .await?;
        log::info!("Recurring donation {} produced donation {}", plan.id, donation.id);
        Ok(campaign)
    }

    async fn notify_skipped(pool: &PgPool, plan: &RecurringDonation, reason: &ApiError) {
        let title = plan.campaign_title.as_deref().unwrap_or("a campaign");
        NotificationService::notify(
            pool,
            plan.user_id,
            NotificationKind::RecurringFailed,
            "Recurring donation skipped",
            format!(
                "Your {} donation of {} to \"{}\" could not be made: {}",
                plan.frequency,
                format_rupiah(plan.amount),
                title,
                reason
            ),
            Some("/wallet".to_string()),
        )
        .await;
    }
}

/// Start the recurring donation scheduler
pub fn start_recurring_task(pool: PgPool, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds.max(1)));

        loop {
            interval.tick().await;
            match RecurringService::run_due(&pool, Utc::now()).await {
                Ok(0) => {}
                Ok(n) => log::info!("Charged {} recurring donations", n),
                Err(e) => log::error!("Recurring donation run failed: {:#}", e),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_run_follows_schedule() {
        let scheduled = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 9, 5, 0).unwrap();
        assert_eq!(
            next_run(Frequency::Weekly, scheduled, now),
            Utc.with_ymd_and_hms(2024, 1, 17, 9, 0, 0).unwrap()
        );
        assert_eq!(
            next_run(Frequency::Monthly, scheduled, now),
            Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_run_skips_missed_periods() {
        let scheduled = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let next = next_run(Frequency::Weekly, scheduled, now);
        assert!(next > now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 22, 0, 0, 0).unwrap());
    }
}
