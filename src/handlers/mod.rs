// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod admin;
pub mod articles;
pub mod auth;
pub mod campaigns;
pub mod categories;
pub mod donations;
pub mod extractors;
pub mod health;
pub mod notifications;
pub mod recurring;
pub mod stats;
pub mod uploads;
pub mod users;
pub mod verifications;
pub mod wallet;
pub mod webhooks;
pub mod withdrawals;

pub use admin::config as admin_config;
pub use articles::config as articles_config;
pub use auth::config as auth_config;
pub use campaigns::config as campaigns_config;
pub use categories::config as categories_config;
pub use donations::config as donations_config;
pub use health::config as health_config;
pub use notifications::config as notifications_config;
pub use recurring::config as recurring_config;
pub use stats::config as stats_config;
pub use uploads::config as uploads_config;
pub use users::config as users_config;
pub use verifications::config as verifications_config;
pub use wallet::config as wallet_config;
pub use webhooks::config as webhooks_config;
pub use withdrawals::config as withdrawals_config;
