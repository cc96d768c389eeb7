// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::common::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    DonationReceived,
    TopupCredited,
    CampaignStatus,
    WithdrawalUpdate,
    VerificationUpdate,
    RecurringFailed,
}

string_enum!(NotificationKind {
    DonationReceived => "donation_received",
    TopupCredited => "topup_credited",
    CampaignStatus => "campaign_status",
    WithdrawalUpdate => "withdrawal_update",
    VerificationUpdate => "verification_update",
    RecurringFailed => "recurring_failed",
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification about to be inserted
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
