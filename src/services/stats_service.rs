// src/services/stats_service.rs
// DOCUMENTATION: Platform and admin dashboard aggregates, served through StatsCache

use crate::db::StatsRepository;
use crate::errors::ApiError;
use crate::models::{AdminStats, PlatformStats};
use crate::services::{StatsCache, ADMIN_STATS_KEY, PLATFORM_STATS_KEY};
use sqlx::PgPool;

pub struct StatsService;

impl StatsService {
    pub async fn platform(pool: &PgPool, cache: &StatsCache) -> Result<PlatformStats, ApiError> {
        if let Some(stats) = cache.get_json::<PlatformStats>(PLATFORM_STATS_KEY).await {
            return Ok(stats);
        }
        let stats = StatsRepository::platform(pool).await?;
        cache.set_json(PLATFORM_STATS_KEY, &stats).await;
        Ok(stats)
    }

    pub async fn admin(pool: &PgPool, cache: &StatsCache) -> Result<AdminStats, ApiError> {
        if let Some(stats) = cache.get_json::<AdminStats>(ADMIN_STATS_KEY).await {
            return Ok(stats);
        }
        let stats = StatsRepository::admin(pool).await?;
        cache.set_json(ADMIN_STATS_KEY, &stats).await;
        Ok(stats)
    }

    /// Drop cached aggregates after money moved
    pub async fn invalidate(cache: &StatsCache) {
        cache.invalidate(PLATFORM_STATS_KEY).await;
        cache.invalidate(ADMIN_STATS_KEY).await;
    }
}
