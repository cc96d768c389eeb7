// src/services/notification_service.rs
// DOCUMENTATION: Creation helpers for in-app notifications
// PURPOSE: Notifications are best effort and never fail the operation that triggered them

use crate::db::NotificationRepository;
use crate::models::{NewNotification, NotificationKind};
use sqlx::PgPool;
use uuid::Uuid;

pub struct NotificationService;

impl NotificationService {
    pub async fn notify(
        pool: &PgPool,
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) {
        let new = NewNotification {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            link,
        };

        if let Err(e) = NotificationRepository::create(pool, &new).await {
            log::warn!("Dropped {} notification for {}: {}", kind, user_id, e);
        }
    }
}

/// Thousands-separated rupiah amount, e.g. `Rp 1.250.000`
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(999), "Rp 999");
        assert_eq!(format_rupiah(10_000), "Rp 10.000");
        assert_eq!(format_rupiah(1_250_000), "Rp 1.250.000");
        assert_eq!(format_rupiah(-5_000), "-Rp 5.000");
    }
}
