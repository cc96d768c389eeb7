// src/models/stats.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Public numbers shown on the landing page
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlatformStats {
    pub total_raised: i64,
    pub total_donors: i64,
    pub active_campaigns: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Back-office dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub verified_organizers: i64,
    pub campaigns_by_status: Vec<StatusCount>,
    pub donations_by_status: Vec<StatusCount>,
    pub total_raised: i64,
    pub pending_withdrawals: i64,
    pub pending_verifications: i64,
    pub total_wallet_balance: i64,
}
