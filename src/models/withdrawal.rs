// src/models/withdrawal.rs
// DOCUMENTATION: Organizer payout requests against campaign funds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::common::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

string_enum!(WithdrawalStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
});

impl WithdrawalStatus {
    pub fn can_transition_to(self, next: WithdrawalStatus) -> bool {
        use WithdrawalStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Completed)
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Withdrawal {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub organizer_id: Uuid,
    pub amount: i64,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub note: Option<String>,
    pub status: String,
    pub admin_note: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub campaign_title: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWithdrawalRequest {
    pub campaign_id: Uuid,
    #[validate(range(min = 1))]
    pub amount: i64,
    #[validate(length(min = 2, max = 100))]
    pub bank_name: String,
    #[validate(length(min = 5, max = 34))]
    pub account_number: String,
    #[validate(length(min = 2, max = 100))]
    pub account_holder: String,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewWithdrawalRequest {
    pub status: WithdrawalStatus,
    pub admin_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawalQuery {
    pub status: Option<WithdrawalStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Funds still available for withdrawal on a campaign
pub fn available_for_withdrawal(raised: i64, already_requested: i64) -> i64 {
    (raised - already_requested).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use WithdrawalStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Rejected.can_transition_to(Approved));
    }

    #[test]
    fn test_available_for_withdrawal() {
        assert_eq!(available_for_withdrawal(1_000_000, 400_000), 600_000);
        assert_eq!(available_for_withdrawal(100, 400), 0);
        assert_eq!(available_for_withdrawal(0, 0), 0);
        assert_eq!(available_for_withdrawal(400, 400), 0);
        assert_eq!(available_for_withdrawal(400, 0), 400);
    }
}
