// src/config/db.rs
// DOCUMENTATION: Database connection pool initialization
// PURPOSE: Setup PostgreSQL connection pool and apply schema migrations

use crate::config::Config;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Initialize PostgreSQL connection pool
/// DOCUMENTATION: Creates connection pool with optimal settings
/// Called once during application startup in main.rs
pub async fn init_db_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    log::info!("Initializing database pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
        // Connection idle timeout (5 minutes)
        .idle_timeout(Duration::from_secs(300))
        // Connection lifetime (30 minutes before recycle)
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    log::info!("Database pool initialized successfully");
    Ok(pool)
}

/// Apply the migrations embedded from ./migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("Applying database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::models::{
        CampaignStatus, Frequency, NotificationKind, PaymentMethod, PaymentStatus,
        RecurringStatus, Role, VerificationStatus, WithdrawalStatus,
    };

    const SCHEMA: &str = include_str!("../../migrations/20240101000000_init.sql");

    /// Text of every `CHECK (<column> IN (...))` clause in the schema
    fn allowed_values(column: &str) -> String {
        let marker = format!("CHECK ({} IN (", column);
        SCHEMA
            .match_indices(&marker)
            .map(|(start, _)| {
                let rest = &SCHEMA[start + marker.len()..];
                &rest[..rest.find("))").unwrap_or(rest.len())]
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn assert_allowed(column: &str, values: &[&str]) {
        let clause = allowed_values(column);
        assert!(!clause.is_empty(), "no CHECK constraint on {}", column);
        for value in values {
            assert!(
                clause.contains(&format!("'{}'", value)),
                "{} CHECK is missing '{}'",
                column,
                value
            );
        }
    }

    fn strs<T>(all: &[T], as_str: fn(&T) -> &'static str) -> Vec<&'static str> {
        all.iter().map(as_str).collect()
    }

    #[test]
    fn test_schema_checks_cover_every_enum_value() {
        assert_allowed("role", &strs(Role::ALL, Role::as_str));
        assert_allowed("kind", &strs(NotificationKind::ALL, NotificationKind::as_str));
        assert_allowed("payment_method", &strs(PaymentMethod::ALL, PaymentMethod::as_str));
        assert_allowed("frequency", &strs(Frequency::ALL, Frequency::as_str));

        let mut statuses = strs(CampaignStatus::ALL, CampaignStatus::as_str);
        statuses.extend(strs(PaymentStatus::ALL, PaymentStatus::as_str));
        statuses.extend(strs(WithdrawalStatus::ALL, WithdrawalStatus::as_str));
        statuses.extend(strs(VerificationStatus::ALL, VerificationStatus::as_str));
        statuses.extend(strs(RecurringStatus::ALL, RecurringStatus::as_str));
        assert_allowed("status", &statuses);
    }
}
