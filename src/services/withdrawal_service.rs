// src/services/withdrawal_service.rs
// DOCUMENTATION: Organizer payout requests and their admin review
// PURPOSE: Never let committed payouts exceed what a campaign has raised

use crate::db::{CampaignRepository, WithdrawalRepository};
use crate::errors::ApiError;
use crate::models::{
    available_for_withdrawal, CreateWithdrawalRequest, NotificationKind, PageQuery, Paginated,
    ReviewWithdrawalRequest, Role, Withdrawal, WithdrawalQuery, WithdrawalStatus,
};
use crate::services::{format_rupiah, NotificationService};
use sqlx::PgPool;
use uuid::Uuid;

/// A request may take the whole remaining balance but never more
pub fn ensure_withdrawable(amount: i64, available: i64) -> Result<(), ApiError> {
    if amount > available {
        return Err(ApiError::InvalidInput(format!(
            "amount exceeds the available balance of {}",
            format_rupiah(available)
        )));
    }
    Ok(())
}

pub struct WithdrawalService;

impl WithdrawalService {
    /// The campaign row is locked so concurrent requests see each other's commitments
    pub async fn create(
        pool: &PgPool,
        organizer_id: Uuid,
        req: CreateWithdrawalRequest,
    ) -> Result<Withdrawal, ApiError> {
        let mut tx = pool.begin().await?;

        let campaign = CampaignRepository::get_for_update(&mut tx, req.campaign_id).await?;
        if campaign.organizer_id != organizer_id {
            log::warn!(
                "User {} requested a withdrawal from campaign {} they do not own",
                organizer_id,
                campaign.id
            );
            return Err(ApiError::Forbidden);
        }

        let committed = WithdrawalRepository::committed_amount(&mut tx, campaign.id).await?;
        let available = available_for_withdrawal(campaign.current_amount, committed);
        ensure_withdrawable(req.amount, available)?;

        let withdrawal = WithdrawalRepository::create(&mut tx, organizer_id, &req).await?;
        tx.commit().await?;

        log::info!(
            "Withdrawal {} of {} requested for campaign {}",
            withdrawal.id,
            withdrawal.amount,
            campaign.id
        );
        Ok(withdrawal)
    }

    pub async fn mine(
        pool: &PgPool,
        organizer_id: Uuid,
        paging: PageQuery,
    ) -> Result<Paginated<Withdrawal>, ApiError> {
        let (rows, total) = WithdrawalRepository::list_by_organizer(pool, organizer_id, paging).await?;
        Ok(Paginated::new(rows, total, paging))
    }

    pub async fn get(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<Withdrawal, ApiError> {
        let withdrawal = WithdrawalRepository::get_by_id(pool, id).await?;
        if withdrawal.organizer_id != user_id && role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(withdrawal)
    }

    pub async fn list(pool: &PgPool, query: WithdrawalQuery) -> Result<Paginated<Withdrawal>, ApiError> {
        let paging = PageQuery::new(query.page, query.limit);
        let (rows, total) = WithdrawalRepository::list(pool, &query).await?;
        Ok(Paginated::new(rows, total, paging))
    }

    pub async fn review(
        pool: &PgPool,
        id: Uuid,
        req: ReviewWithdrawalRequest,
    ) -> Result<Withdrawal, ApiError> {
        let withdrawal = WithdrawalRepository::get_by_id(pool, id).await?;
        let current: WithdrawalStatus = withdrawal.status.parse().map_err(ApiError::InvalidState)?;

        if !current.can_transition_to(req.status) {
            return Err(ApiError::InvalidState(format!(
                "cannot move withdrawal from {} to {}",
                current, req.status
            )));
        }

        // conditional on the status we read, so a concurrent review loses cleanly
        let updated = WithdrawalRepository::transition(
            pool,
            id,
            current,
            req.status,
            req.admin_note.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::InvalidState("withdrawal was reviewed concurrently".into()))?;

        log::info!("Withdrawal {} moved from {} to {}", id, current, req.status);

        let mut message = format!(
            "Your withdrawal of {} is now {}",
            format_rupiah(updated.amount),
            req.status
        );
        if let Some(note) = req.admin_note.as_deref().filter(|n| !n.trim().is_empty()) {
            message.push_str(": ");
            message.push_str(note.trim());
        }
        NotificationService::notify(
            pool,
            updated.organizer_id,
            NotificationKind::WithdrawalUpdate,
            "Withdrawal update",
            message,
            Some(format!("/withdrawals/{}", updated.id)),
        )
        .await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_exact_balance() {
        let available = available_for_withdrawal(1_000_000, 250_000);
        assert!(ensure_withdrawable(750_000, available).is_ok());
        assert!(matches!(
            ensure_withdrawable(750_001, available),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_nothing_left_to_withdraw() {
        let available = available_for_withdrawal(500_000, 500_000);
        assert_eq!(available, 0);
        assert!(ensure_withdrawable(1, available).is_err());

        // over-committed campaigns (after a reversal) report zero, not a negative balance
        let available = available_for_withdrawal(0, 300_000);
        assert_eq!(available, 0);
        assert!(ensure_withdrawable(1, available).is_err());
    }
}
