// src/models/topup.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Wallet deposit; paid through the same gateway flow as a donation
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Topup {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub status: String,
    pub payment_method: Option<String>,
    pub external_id: String,
    pub invoice_id: Option<String>,
    pub invoice_url: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopupRequest {
    #[validate(range(min = 1))]
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub balance: i64,
    pub recent_topups: Vec<Topup>,
}
