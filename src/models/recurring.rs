// src/models/recurring.rs
// DOCUMENTATION: Scheduled wallet donations

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::common::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
}

string_enum!(Frequency {
    Weekly => "weekly",
    Monthly => "monthly",
});

impl Frequency {
    /// Next run after `from`; month arithmetic clamps to the last day of the month
    pub fn next_after(self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Frequency::Weekly => from + Duration::weeks(1),
            Frequency::Monthly => from
                .checked_add_months(Months::new(1))
                .unwrap_or(from + Duration::days(30)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringStatus {
    Active,
    Paused,
    Cancelled,
}

string_enum!(RecurringStatus {
    Active => "active",
    Paused => "paused",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecurringDonation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub campaign_id: Uuid,
    pub amount: i64,
    pub frequency: String,
    pub status: String,
    pub next_run_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub campaign_title: Option<String>,
}

impl RecurringDonation {
    pub fn frequency(&self) -> Frequency {
        self.frequency.parse().unwrap_or(Frequency::Monthly)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecurringRequest {
    pub campaign_id: Uuid,
    #[validate(range(min = 1))]
    pub amount: i64,
    pub frequency: Frequency,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecurringRequest {
    pub status: Option<RecurringStatus>,
    #[validate(range(min = 1))]
    pub amount: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_after_weekly() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(
            Frequency::Weekly.next_after(from),
            Utc.with_ymd_and_hms(2024, 3, 8, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_after_monthly_clamps_day() {
        let from = Utc.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap();
        assert_eq!(
            Frequency::Monthly.next_after(from),
            Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap()
        );
    }
}
