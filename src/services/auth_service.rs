// src/services/auth_service.rs
// DOCUMENTATION: Registration, login, password hashing and bearer tokens
// PURPOSE: Argon2id password storage, HS256 tokens, per-IP login throttling

use crate::config::Config;
use crate::db::UserRepository;
use crate::errors::ApiError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, Role, User};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Bearer token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            log::error!("Password hashing failed: {}", e);
            ApiError::InternalError
        })
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

pub fn issue_token(config: &Config, user_id: Uuid, role: Role) -> Result<String, ApiError> {
    let exp = chrono::Utc::now() + chrono::Duration::hours(config.jwt_ttl_hours);
    let claims = Claims {
        sub: user_id,
        role,
        exp: exp.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        log::error!("Token encoding failed: {}", e);
        ApiError::InternalError
    })
}

pub fn decode_token(config: &Config, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        log::warn!("Rejected bearer token: {}", e);
        ApiError::Unauthorized
    })
}

/// Per-client login throttle
pub struct LoginLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl LoginLimiter {
    pub fn new(per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    pub fn check(&self, client: &str) -> Result<(), ApiError> {
        self.limiter.check_key(&client.to_string()).map_err(|_| {
            log::warn!("Login rate limit exceeded for {}", client);
            ApiError::RateLimitExceeded
        })
    }

    /// Drops clients whose quota has fully replenished
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

/// Periodically prunes idle login limiter keys
pub fn start_limiter_cleanup_task(limiter: Arc<LoginLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            limiter.prune();
            log::debug!("Login limiter tracking {} clients", limiter.tracked_clients());
        }
    });
}

pub struct AuthService;

impl AuthService {
    pub async fn register(
        pool: &PgPool,
        config: &Config,
        req: RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        let email = req.email.trim().to_lowercase();

        if UserRepository::find_by_email(pool, &email).await?.is_some() {
            return Err(ApiError::AlreadyExists(format!("email '{}'", email)));
        }

        let password_hash = hash_password(&req.password)?;
        let user = UserRepository::create(
            pool,
            req.name.trim(),
            &email,
            &password_hash,
            req.phone.as_deref(),
        )
        .await?;

        log::info!("Registered user {}", user.id);
        Self::session(config, &user)
    }

    pub async fn login(
        pool: &PgPool,
        config: &Config,
        req: LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        let user = UserRepository::find_by_email(pool, req.email.trim())
            .await?
            .ok_or_else(|| {
                log::warn!("Login for unknown email");
                ApiError::Unauthorized
            })?;

        if !verify_password(&req.password, &user.password_hash) {
            log::warn!("Login with wrong password for user {}", user.id);
            return Err(ApiError::Unauthorized);
        }

        Self::session(config, &user)
    }

    fn session(config: &Config, user: &User) -> Result<AuthResponse, ApiError> {
        let token = issue_token(config, user.id, user.role())?;
        Ok(AuthResponse {
            user: user.to_response(),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_token_roundtrip() {
        let config = Config::for_tests();
        let user_id = Uuid::new_v4();
        let token = issue_token(&config, user_id, Role::Organizer).unwrap();

        let claims = decode_token(&config, &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Organizer);
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let config = Config::for_tests();
        let token = issue_token(&config, Uuid::new_v4(), Role::Admin).unwrap();

        let mut other = Config::for_tests();
        other.jwt_secret = "another-secret".into();
        assert!(matches!(
            decode_token(&other, &token),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_login_limiter() {
        let limiter = LoginLimiter::new(2);
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(matches!(
            limiter.check("10.0.0.1"),
            Err(ApiError::RateLimitExceeded)
        ));
        // other clients keep their own budget
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_login_limiter_prune_keeps_active_clients() {
        let limiter = LoginLimiter::new(2);
        limiter.check("10.0.0.1").unwrap();
        limiter.check("10.0.0.2").unwrap();
        assert_eq!(limiter.tracked_clients(), 2);

        limiter.prune();
        assert!(limiter.tracked_clients() <= 2);
        limiter.check("10.0.0.1").unwrap();
        assert!(matches!(
            limiter.check("10.0.0.1"),
            Err(ApiError::RateLimitExceeded)
        ));
    }
}
