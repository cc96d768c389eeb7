// src/services/wallet_service.rs
// DOCUMENTATION: Wallet balance and gateway-funded top-ups

use crate::config::Config;
use crate::db::{TopupRepository, UserRepository};
use crate::errors::ApiError;
use crate::models::{PageQuery, Paginated, PaymentStatus, Topup, WalletResponse};
use crate::services::{format_rupiah, XenditClient};
use sqlx::PgPool;
use uuid::Uuid;

const RECENT_TOPUPS: i64 = 5;

pub fn topup_external_id() -> String {
    format!("TOPUP-{}", Uuid::new_v4().simple())
}

pub struct WalletService;

impl WalletService {
    pub async fn overview(pool: &PgPool, user_id: Uuid) -> Result<WalletResponse, ApiError> {
        let user = UserRepository::get_by_id(pool, user_id).await?;
        let (recent_topups, _) =
            TopupRepository::list_by_user(pool, user_id, PageQuery::new(Some(1), Some(RECENT_TOPUPS)))
                .await?;

        Ok(WalletResponse {
            balance: user.wallet_balance,
            recent_topups,
        })
    }

    /// Open a gateway invoice; the balance moves only when the webhook confirms payment
    pub async fn create_topup(
        pool: &PgPool,
        config: &Config,
        xendit: &XenditClient,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Topup, ApiError> {
        if amount < config.min_topup_amount {
            return Err(ApiError::ValidationError(format!(
                "minimum top-up is {}",
                format_rupiah(config.min_topup_amount)
            )));
        }

        let user = UserRepository::get_by_id(pool, user_id).await?;
        let external_id = topup_external_id();
        let topup = TopupRepository::create(pool, user_id, amount, &external_id).await?;

        let invoice = match xendit
            .create_invoice(
                &external_id,
                amount,
                Some(&user.email),
                "Wallet top-up",
                "/wallet",
            )
            .await
        {
            Ok(invoice) => invoice,
            Err(e) => {
                log::error!("Invoice creation failed for top-up {}: {}", topup.id, e);
                let mut conn = pool.acquire().await?;
                TopupRepository::set_status(&mut conn, topup.id, PaymentStatus::Failed, None).await?;
                return Err(e);
            }
        };

        let topup =
            TopupRepository::attach_invoice(pool, topup.id, &invoice.id, &invoice.invoice_url).await?;
        log::info!("Top-up {} of {} opened for {}", topup.external_id, amount, user_id);
        Ok(topup)
    }

    pub async fn topups(
        pool: &PgPool,
        user_id: Uuid,
        paging: PageQuery,
    ) -> Result<Paginated<Topup>, ApiError> {
        let (topups, total) = TopupRepository::list_by_user(pool, user_id, paging).await?;
        Ok(Paginated::new(topups, total, paging))
    }

    pub async fn topup(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Topup, ApiError> {
        let topup = TopupRepository::get_by_id(pool, id).await?;
        if topup.user_id != user_id {
            // other users' top-ups are indistinguishable from missing ones
            return Err(ApiError::NotFound("Top-up".into()));
        }
        Ok(topup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topup_external_id() {
        let id = topup_external_id();
        assert!(id.starts_with("TOPUP-"));
        assert_eq!(id.len(), "TOPUP-".len() + 32);
    }
}
