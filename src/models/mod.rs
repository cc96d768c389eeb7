// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod article;
pub mod campaign;
pub mod category;
pub mod common;
pub mod donation;
pub mod notification;
pub mod recurring;
pub mod stats;
pub mod topup;
pub mod user;
pub mod verification;
pub mod webhook;
pub mod withdrawal;

pub use article::*;
pub use campaign::*;
pub use category::*;
pub use common::*;
pub use donation::*;
pub use notification::*;
pub use recurring::*;
pub use stats::*;
pub use topup::*;
pub use user::*;
pub use verification::*;
pub use webhook::*;
pub use withdrawal::*;
