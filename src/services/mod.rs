// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod article_service;
pub mod auth_service;
pub mod cache;
pub mod campaign_service;
pub mod category_service;
pub mod donation_service;
pub mod notification_service;
pub mod payment_service;
pub mod recurring_service;
pub mod stats_service;
pub mod storage;
pub mod user_service;
pub mod verification_service;
pub mod wallet_service;
pub mod withdrawal_service;
pub mod xendit_client;

pub use article_service::*;
pub use auth_service::*;
pub use cache::*;
pub use campaign_service::*;
pub use category_service::*;
pub use donation_service::*;
pub use notification_service::*;
pub use payment_service::*;
pub use recurring_service::*;
pub use stats_service::*;
pub use storage::*;
pub use user_service::*;
pub use verification_service::*;
pub use wallet_service::*;
pub use withdrawal_service::*;
pub use xendit_client::*;

#[cfg(test)]
mod ledger_tests;
