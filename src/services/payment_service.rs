// src/services/payment_service.rs
// DOCUMENTATION: Reconciliation of gateway invoice callbacks
// PURPOSE: Apply PAID/SETTLED/EXPIRED/FAILED events to donations and top-ups exactly once
//
// Each callback runs in one transaction with the payment row locked, so a replayed
// or concurrent delivery sees the already-updated status and credits nothing.

use crate::db::{CampaignRepository, DonationRepository, TopupRepository, UserRepository};
use crate::errors::ApiError;
use crate::models::{
    plan_transition, InvoiceCallback, InvoiceEvent, NotificationKind, PaymentStatus, WebhookAck,
};
use crate::services::{format_rupiah, NotificationService};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Follow-up work once the transaction has committed
enum Credited {
    Nothing,
    Campaign { organizer_id: Uuid, title: String, slug: String, amount: i64 },
    Wallet { user_id: Uuid, amount: i64 },
}

pub struct PaymentService;

impl PaymentService {
    pub async fn handle_invoice_callback(
        pool: &PgPool,
        callback: &InvoiceCallback,
    ) -> Result<WebhookAck, ApiError> {
        let event = InvoiceEvent::parse(&callback.status);
        if event == InvoiceEvent::Unknown {
            log::info!(
                "Ignoring invoice status {} for {}",
                callback.status,
                callback.external_id
            );
            return Ok(WebhookAck::processed(format!("status {} ignored", callback.status)));
        }

        let mut tx = pool.begin().await?;

        let outcome = if let Some(donation) =
            DonationRepository::find_for_update(&mut tx, &callback.external_id).await?
        {
            Self::check_amount(&callback.external_id, donation.amount, callback);
            Self::apply(
                &mut tx,
                PaymentRow::Donation {
                    id: donation.id,
                    campaign_id: donation.campaign_id,
                },
                &donation.status,
                donation.amount,
                event,
                callback,
            )
            .await?
        } else if let Some(topup) =
            TopupRepository::find_for_update(&mut tx, &callback.external_id).await?
        {
            Self::check_amount(&callback.external_id, topup.amount, callback);
            Self::apply(
                &mut tx,
                PaymentRow::Topup {
                    id: topup.id,
                    user_id: topup.user_id,
                },
                &topup.status,
                topup.amount,
                event,
                callback,
            )
            .await?
        } else {
            log::warn!("Invoice callback for unknown reference {}", callback.external_id);
            return Ok(WebhookAck::failed("payment not found"));
        };

        tx.commit().await?;

        match outcome {
            None => {
                log::info!(
                    "Duplicate or stale {} callback for {}",
                    callback.status,
                    callback.external_id
                );
                Ok(WebhookAck::duplicate("already processed"))
            }
            Some(credited) => {
                Self::notify(pool, credited).await;
                log::info!("Applied {} to {}", callback.status, callback.external_id);
                Ok(WebhookAck::processed("payment updated"))
            }
        }
    }

    /// Returns `None` when the event does not change the row
    async fn apply(
        conn: &mut PgConnection,
        row: PaymentRow,
        current_status: &str,
        amount: i64,
        event: InvoiceEvent,
        callback: &InvoiceCallback,
    ) -> Result<Option<Credited>, ApiError> {
        let current: PaymentStatus = current_status.parse().map_err(ApiError::InvalidState)?;

        let transition = match plan_transition(current, event) {
            Some(t) => t,
            None => return Ok(None),
        };

        let channel = callback
            .payment_channel
            .as_deref()
            .or(callback.payment_method.as_deref());

        match row {
            PaymentRow::Donation { id, campaign_id } => {
                DonationRepository::set_status(conn, id, transition.next, channel).await?;
                if !transition.credit {
                    return Ok(Some(Credited::Nothing));
                }
                CampaignRepository::credit(conn, campaign_id, amount).await?;
                let campaign = CampaignRepository::get_for_update(conn, campaign_id).await?;
                Ok(Some(Credited::Campaign {
                    organizer_id: campaign.organizer_id,
                    title: campaign.title,
                    slug: campaign.slug,
                    amount,
                }))
            }
            PaymentRow::Topup { id, user_id } => {
                TopupRepository::set_status(conn, id, transition.next, channel).await?;
                if !transition.credit {
                    return Ok(Some(Credited::Nothing));
                }
                UserRepository::credit_wallet(conn, user_id, amount).await?;
                Ok(Some(Credited::Wallet { user_id, amount }))
            }
        }
    }

    fn check_amount(external_id: &str, expected: i64, callback: &InvoiceCallback) {
        if let Some(paid) = callback.paid_amount.or(callback.amount) {
            if (paid - expected as f64).abs() >= 1.0 {
                log::warn!(
                    "Amount mismatch for {}: expected {}, gateway reported {}",
                    external_id,
                    expected,
                    paid
                );
            }
        }
    }

    async fn notify(pool: &PgPool, credited: Credited) {
        match credited {
            Credited::Nothing => {}
            Credited::Campaign { organizer_id, title, slug, amount } => {
                NotificationService::notify(
                    pool,
                    organizer_id,
                    NotificationKind::DonationReceived,
                    "New donation",
                    format!("{} donated to \"{}\"", format_rupiah(amount), title),
                    Some(format!("/campaigns/{}", slug)),
                )
                .await;
            }
            Credited::Wallet { user_id, amount } => {
                NotificationService::notify(
                    pool,
                    user_id,
                    NotificationKind::TopupCredited,
                    "Wallet topped up",
                    format!("{} was added to your wallet", format_rupiah(amount)),
                    Some("/wallet".to_string()),
                )
                .await;
            }
        }
    }
}

enum PaymentRow {
    Donation { id: Uuid, campaign_id: Uuid },
    Topup { id: Uuid, user_id: Uuid },
}

/// Constant-time comparison of a shared-secret header; an empty secret never matches
pub fn token_matches(expected: &str, provided: Option<&str>) -> bool {
    let provided = match provided {
        Some(p) => p.as_bytes(),
        None => return false,
    };
    let expected = expected.as_bytes();
    if expected.is_empty() || expected.len() != provided.len() {
        return false;
    }
    expected
        .iter()
        .zip(provided)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        assert!(token_matches("secret", Some("secret")));
        assert!(!token_matches("secret", Some("secreT")));
        assert!(!token_matches("secret", Some("secret2")));
        assert!(!token_matches("secret", None));
        // an unconfigured token never matches
        assert!(!token_matches("", Some("")));
    }
}
