// src/config/mod.rs
// DOCUMENTATION: Configuration module organization
// PURPOSE: Re-export configuration components

pub mod db;
pub mod env;

pub use db::{init_db_pool, run_migrations};
pub use env::Config;
