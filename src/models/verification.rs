// src/models/verification.rs
// DOCUMENTATION: Identity verification requests from would-be organizers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::common::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

string_enum!(VerificationStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Verification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub id_number: String,
    pub document_url: String,
    pub selfie_url: Option<String>,
    pub organization_name: Option<String>,
    pub status: String,
    pub admin_note: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub user_email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVerificationRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
    #[validate(length(min = 6, max = 32))]
    pub id_number: String,
    #[validate(url)]
    pub document_url: String,
    #[validate(url)]
    pub selfie_url: Option<String>,
    #[validate(length(max = 200))]
    pub organization_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewVerificationRequest {
    pub status: VerificationStatus,
    pub admin_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerificationQuery {
    pub status: Option<VerificationStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
