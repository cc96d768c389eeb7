// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, background tasks and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use errors::ApiError;
use services::{
    start_cleanup_task, start_limiter_cleanup_task, start_recurring_task, LoginLimiter, StatsCache,
    UploadStorage, XenditClient,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Request bodies other than uploads are small JSON documents
const JSON_LIMIT_BYTES: usize = 256 * 1024;

fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-admin-token"),
        ])
        .max_age(3600);

    if config.cors_origin == "*" {
        cors.allow_any_origin()
    } else {
        config
            .cors_origin
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.clone()
        } else {
            "info,actix_web=info,sqlx=warn".to_string()
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting donasi-api...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if config.run_migrations {
        if let Err(e) = config::run_migrations(&pool).await {
            log::error!("Failed to run migrations: {}", e);
            std::process::exit(1);
        }
        log::info!("Database migrations applied");
    }

    // 5. Shared services
    let cache = Arc::new(StatsCache::new(config.stats_cache_ttl_seconds));
    start_cleanup_task(cache.clone(), 300);
    log::info!(
        "Initialized stats cache (TTL: {}s, cleanup every 5 minutes)",
        config.stats_cache_ttl_seconds
    );

    let storage = match UploadStorage::new(PathBuf::from(&config.upload_dir)).await {
        Ok(storage) => web::Data::new(storage),
        Err(e) => {
            log::error!("Failed to prepare upload directory: {:#}", e);
            std::process::exit(1);
        }
    };

    let xendit = web::Data::new(XenditClient::new(&config));
    if xendit.is_simulated() {
        log::warn!("Xendit running in simulation mode");
    }

    let limiter = Arc::new(LoginLimiter::new(config.login_rate_per_minute));
    start_limiter_cleanup_task(limiter.clone(), 60);
    let limiter = web::Data::from(limiter);

    // 6. Background jobs
    start_recurring_task(pool.clone(), config.recurring_interval_seconds);
    log::info!(
        "Started recurring donation task (interval: {}s)",
        config.recurring_interval_seconds
    );

    // 7. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(xendit.clone())
            .app_data(storage.clone())
            .app_data(limiter.clone())
            // Extractor errors use the same JSON error body as handlers
            .app_data(
                web::JsonConfig::default()
                    .limit(JSON_LIMIT_BYTES)
                    .error_handler(|err, _| ApiError::InvalidInput(err.to_string()).into()),
            )
            .app_data(
                web::QueryConfig::default()
                    .error_handler(|err, _| ApiError::InvalidInput(err.to_string()).into()),
            )
            .app_data(
                web::PathConfig::default()
                    .error_handler(|_, _| ApiError::NotFound("Resource".into()).into()),
            )
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            .wrap(cors(&config_clone))
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::auth_config)
            .configure(handlers::users_config)
            .configure(handlers::categories_config)
            .configure(handlers::campaigns_config)
            .configure(handlers::donations_config)
            .configure(handlers::webhooks_config)
            .configure(handlers::wallet_config)
            .configure(handlers::withdrawals_config)
            .configure(handlers::verifications_config)
            .configure(handlers::notifications_config)
            .configure(handlers::recurring_config)
            .configure(handlers::articles_config)
            .configure(handlers::stats_config)
            .configure(handlers::admin_config)
            .configure(handlers::uploads_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
