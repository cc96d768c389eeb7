// src/services/donation_service.rs
// DOCUMENTATION: Business logic for donations
// PURPOSE: Gateway invoices, instant wallet donations and admin reversals

use crate::config::Config;
use crate::db::{CampaignRepository, DonationRepository, NewDonation, UserRepository};
use crate::errors::ApiError;
use crate::models::{
    Campaign, CreateDonationRequest, Donation, DonationCreatedResponse, DonationQuery,
    DonationStatusResponse, NotificationKind, PageQuery, Paginated, PaymentMethod, PaymentStatus,
    Role, User, ANONYMOUS_DONOR,
};
use crate::services::{format_rupiah, NotificationService, XenditClient};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Reference sent to the gateway for donation invoices
pub fn donation_external_id() -> String {
    format!("DON-{}", Uuid::new_v4().simple())
}

/// Reference stored for wallet-funded donations, which never reach the gateway
pub fn wallet_external_id() -> String {
    format!("WAL-{}", Uuid::new_v4().simple())
}

/// Rejects amounts below MIN_DONATION_AMOUNT
pub fn ensure_min_donation(config: &Config, amount: i64) -> Result<(), ApiError> {
    if amount < config.min_donation_amount {
        return Err(ApiError::ValidationError(format!(
            "minimum donation is {}",
            format_rupiah(config.min_donation_amount)
        )));
    }
    Ok(())
}

/// Donation funded from a wallet balance
#[derive(Debug)]
pub struct WalletDonation<'a> {
    pub donor: &'a User,
    pub campaign_id: Uuid,
    pub amount: i64,
    pub message: Option<&'a str>,
    pub is_anonymous: bool,
}

pub struct DonationService;

impl DonationService {
    pub async fn create(
        pool: &PgPool,
        config: &Config,
        xendit: &XenditClient,
        user_id: Option<Uuid>,
        req: CreateDonationRequest,
    ) -> Result<DonationCreatedResponse, ApiError> {
        ensure_min_donation(config, req.amount)?;

        let user = match user_id {
            Some(id) => Some(UserRepository::get_by_id(pool, id).await?),
            None => None,
        };

        match req.payment_method {
            PaymentMethod::Wallet => {
                let donor = user.as_ref().ok_or(ApiError::Unauthorized)?;
                let donation = Self::donate_from_wallet(
                    pool,
                    WalletDonation {
                        donor,
                        campaign_id: req.campaign_id,
                        amount: req.amount,
                        message: req.message.as_deref(),
                        is_anonymous: req.is_anonymous,
                    },
                )
                .await?;
                Ok(DonationCreatedResponse {
                    donation,
                    invoice_url: None,
                })
            }
            PaymentMethod::Xendit => {
                Self::create_invoiced(pool, xendit, user.as_ref(), req).await
            }
        }
    }

    async fn create_invoiced(
        pool: &PgPool,
        xendit: &XenditClient,
        user: Option<&User>,
        req: CreateDonationRequest,
    ) -> Result<DonationCreatedResponse, ApiError> {
        let campaign = CampaignRepository::get_by_id(pool, req.campaign_id).await?;
        if !campaign.accepts_donations(Utc::now()) {
            return Err(ApiError::InvalidState("campaign is not accepting donations".into()));
        }

        let donor_name = req
            .donor_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or(user.map(|u| u.name.as_str()))
            .or(req.is_anonymous.then_some(ANONYMOUS_DONOR))
            .ok_or_else(|| ApiError::ValidationError("donor_name is required".into()))?;
        let donor_email = req
            .donor_email
            .as_deref()
            .or(user.map(|u| u.email.as_str()));

        let external_id = donation_external_id();
        let new = NewDonation {
            campaign_id: campaign.id,
            user_id: user.map(|u| u.id),
            donor_name,
            donor_email,
            amount: req.amount,
            message: req.message.as_deref(),
            is_anonymous: req.is_anonymous,
            payment_method: PaymentMethod::Xendit,
            status: PaymentStatus::Pending,
            external_id: &external_id,
        };

        let mut conn = pool.acquire().await?;
        let donation = DonationRepository::insert(&mut conn, &new).await?;

        let description = format!("Donation to {}", campaign.title);
        let invoice = match xendit
            .create_invoice(
                &external_id,
                req.amount,
                donor_email,
                &description,
                &format!("/donations/{}", external_id),
            )
            .await
        {
            Ok(invoice) => invoice,
            Err(e) => {
                log::error!("Invoice creation failed for donation {}: {}", donation.id, e);
                DonationRepository::set_status(&mut conn, donation.id, PaymentStatus::Failed, None)
                    .await?;
                return Err(e);
            }
        };

        let donation =
            DonationRepository::attach_invoice(pool, donation.id, &invoice.id, &invoice.invoice_url)
                .await?;

        log::info!(
            "Donation {} awaiting payment of {} for campaign {}",
            donation.external_id,
            donation.amount,
            campaign.id
        );

        Ok(DonationCreatedResponse {
            invoice_url: donation.invoice_url.clone(),
            donation,
        })
    }

    /// Debit the wallet, record a paid donation and credit the campaign in one transaction
    pub async fn donate_from_wallet(
        pool: &PgPool,
        wd: WalletDonation<'_>,
    ) -> Result<Donation, ApiError> {
        let mut tx = pool.begin().await?;
        let (donation, campaign) = Self::donate_from_wallet_in(&mut tx, &wd).await?;
        tx.commit().await?;

        Self::notify_organizer(pool, &campaign, wd.amount).await;
        Ok(donation)
    }

    /// Wallet donation steps on a caller-owned transaction; nothing is committed here
    pub async fn donate_from_wallet_in(
        conn: &mut PgConnection,
        wd: &WalletDonation<'_>,
    ) -> Result<(Donation, Campaign), ApiError> {
        let campaign = CampaignRepository::get_for_update(&mut *conn, wd.campaign_id).await?;
        if !campaign.accepts_donations(Utc::now()) {
            return Err(ApiError::InvalidState("campaign is not accepting donations".into()));
        }

        UserRepository::debit_wallet(&mut *conn, wd.donor.id, wd.amount).await?;

        let external_id = wallet_external_id();
        let donation = DonationRepository::insert(
            &mut *conn,
            &NewDonation {
                campaign_id: campaign.id,
                user_id: Some(wd.donor.id),
                donor_name: &wd.donor.name,
                donor_email: Some(&wd.donor.email),
                amount: wd.amount,
                message: wd.message,
                is_anonymous: wd.is_anonymous,
                payment_method: PaymentMethod::Wallet,
                status: PaymentStatus::Paid,
                external_id: &external_id,
            },
        )
        .await?;

        CampaignRepository::credit(&mut *conn, campaign.id, wd.amount).await?;

        log::info!(
            "Wallet donation {} of {} from {} to campaign {}",
            donation.id,
            wd.amount,
            wd.donor.id,
            campaign.id
        );
        Ok((donation, campaign))
    }

    pub async fn notify_organizer(pool: &PgPool, campaign: &Campaign, amount: i64) {
        NotificationService::notify(
            pool,
            campaign.organizer_id,
            NotificationKind::DonationReceived,
            "New donation",
            format!("{} donated to \"{}\"", format_rupiah(amount), campaign.title),
            Some(format!("/campaigns/{}", campaign.slug)),
        )
        .await;
    }

    /// Visible to the donor and to admins
    pub async fn get(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<Donation, ApiError> {
        let donation = DonationRepository::get_by_id(pool, id).await?;
        if donation.user_id != Some(user_id) && role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(donation)
    }

    pub async fn status(pool: &PgPool, external_id: &str) -> Result<DonationStatusResponse, ApiError> {
        let donation = DonationRepository::get_by_external_id(pool, external_id).await?;
        Ok(DonationStatusResponse {
            external_id: donation.external_id,
            campaign_id: donation.campaign_id,
            amount: donation.amount,
            status: donation.status,
            paid_at: donation.paid_at,
        })
    }

    pub async fn mine(
        pool: &PgPool,
        user_id: Uuid,
        paging: PageQuery,
    ) -> Result<Paginated<Donation>, ApiError> {
        let (donations, total) = DonationRepository::list_by_user(pool, user_id, paging).await?;
        Ok(Paginated::new(donations, total, paging))
    }

    pub async fn list(pool: &PgPool, query: DonationQuery) -> Result<Paginated<Donation>, ApiError> {
        let paging = PageQuery::new(query.page, query.limit);
        let (donations, total) = DonationRepository::list(pool, &query).await?;
        Ok(Paginated::new(donations, total, paging))
    }

    /// Admin removal; a successful donation is taken back out of the campaign total
    /// and wallet-funded ones are refunded to the donor
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let mut tx = pool.begin().await?;
        let donation = DonationRepository::get_for_update(&mut tx, id).await?;

        if donation.status().is_some_and(PaymentStatus::is_successful) {
            CampaignRepository::debit(&mut tx, donation.campaign_id, donation.amount).await?;

            if donation.payment_method == PaymentMethod::Wallet.as_str() {
                if let Some(user_id) = donation.user_id {
                    UserRepository::credit_wallet(&mut tx, user_id, donation.amount).await?;
                }
            }
        }

        DonationRepository::delete(&mut tx, id).await?;
        tx.commit().await?;

        log::info!("Deleted donation {} ({})", id, donation.status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_id_prefixes() {
        let don = donation_external_id();
        let wal = wallet_external_id();
        assert!(don.starts_with("DON-"));
        assert!(wal.starts_with("WAL-"));
        assert_eq!(don.len(), 4 + 32);
        assert_ne!(donation_external_id(), don);
    }

    #[test]
    fn test_ensure_min_donation() {
        let config = Config::for_tests();
        assert!(ensure_min_donation(&config, config.min_donation_amount).is_ok());
        assert!(matches!(
            ensure_min_donation(&config, config.min_donation_amount - 1),
            Err(ApiError::ValidationError(_))
        ));
        assert!(ensure_min_donation(&config, 0).is_err());
    }
}
