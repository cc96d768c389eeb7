// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod article_repository;
pub mod campaign_repository;
pub mod category_repository;
pub mod donation_repository;
pub mod notification_repository;
pub mod recurring_repository;
pub mod stats_repository;
pub mod topup_repository;
pub mod user_repository;
pub mod verification_repository;
pub mod withdrawal_repository;

pub use article_repository::*;
pub use campaign_repository::*;
pub use category_repository::*;
pub use donation_repository::*;
pub use notification_repository::*;
pub use recurring_repository::*;
pub use stats_repository::*;
pub use topup_repository::*;
pub use user_repository::*;
pub use verification_repository::*;
pub use withdrawal_repository::*;
