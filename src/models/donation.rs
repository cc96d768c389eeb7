// src/models/donation.rs
// DOCUMENTATION: Donations to campaigns
// PURPOSE: Row mapping, payment status and request/response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::common::string_enum;

/// Payment status shared by donations and top-ups
/// pending → paid → settled, pending → expired | failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Settled,
    Expired,
    Failed,
}

string_enum!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
    Settled => "settled",
    Expired => "expired",
    Failed => "failed",
});

impl PaymentStatus {
    /// Money has been received
    pub fn is_successful(self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Settled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Xendit,
    Wallet,
}

string_enum!(PaymentMethod {
    Xendit => "xendit",
    Wallet => "wallet",
});

/// Row of the `donations` table
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub user_id: Option<Uuid>,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub amount: i64,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub payment_method: String,
    pub status: String,
    pub external_id: String,
    pub invoice_id: Option<String>,
    pub invoice_url: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub campaign_title: Option<String>,
}

/// Donation as shown on a campaign page
#[derive(Debug, Clone, Serialize)]
pub struct PublicDonation {
    pub id: Uuid,
    pub donor_name: String,
    pub amount: i64,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub const ANONYMOUS_DONOR: &str = "Anonymous";

impl Donation {
    pub fn status(&self) -> Option<PaymentStatus> {
        self.status.parse().ok()
    }

    pub fn to_public(&self) -> PublicDonation {
        PublicDonation {
            id: self.id,
            donor_name: if self.is_anonymous {
                ANONYMOUS_DONOR.to_string()
            } else {
                self.donor_name.clone()
            },
            amount: self.amount,
            message: self.message.clone(),
            created_at: self.paid_at.unwrap_or(self.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDonationRequest {
    pub campaign_id: Uuid,
    #[validate(range(min = 1))]
    pub amount: i64,
    #[validate(length(min = 1, max = 100))]
    pub donor_name: Option<String>,
    #[validate(email)]
    pub donor_email: Option<String>,
    #[validate(length(max = 500))]
    pub message: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct DonationCreatedResponse {
    pub donation: Donation,
    pub invoice_url: Option<String>,
}

/// Lightweight status poll used by the payment return page
#[derive(Debug, Serialize)]
pub struct DonationStatusResponse {
    pub external_id: String,
    pub campaign_id: Uuid,
    pub amount: i64,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct DonationQuery {
    pub status: Option<PaymentStatus>,
    pub campaign_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_donor_is_masked() {
        let donation = Donation {
            id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            user_id: None,
            donor_name: "Rina".into(),
            donor_email: Some("rina@example.com".into()),
            amount: 50_000,
            message: Some("Semoga lekas sembuh".into()),
            is_anonymous: true,
            payment_method: "xendit".into(),
            status: "paid".into(),
            external_id: "DON-1".into(),
            invoice_id: None,
            invoice_url: None,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            campaign_title: None,
        };

        let public = donation.to_public();
        assert_eq!(public.donor_name, ANONYMOUS_DONOR);
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("donor_email").is_none());
    }

    #[test]
    fn test_payment_method_from_json() {
        let req: CreateDonationRequest = serde_json::from_value(serde_json::json!({
            "campaign_id": Uuid::nil(),
            "amount": 25000,
            "payment_method": "wallet"
        }))
        .unwrap();
        assert_eq!(req.payment_method, PaymentMethod::Wallet);
        assert!(!req.is_anonymous);
    }

    #[test]
    fn test_successful_statuses() {
        assert!(PaymentStatus::Paid.is_successful());
        assert!(PaymentStatus::Settled.is_successful());
        assert!(!PaymentStatus::Expired.is_successful());
        assert_eq!("settled".parse::<PaymentStatus>(), Ok(PaymentStatus::Settled));
    }
}
