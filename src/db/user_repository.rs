// src/db/user_repository.rs
// DOCUMENTATION: User and wallet database operations
// PURPOSE: Accounts, roles, verification flag and wallet balance

use crate::errors::ApiError;
use crate::models::{PageQuery, Role, User, UserListQuery};
use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    /// Insert a new account; duplicate emails surface as AlreadyExists
    pub async fn create(
        pool: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        phone: Option<&str>,
    ) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(phone)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::AlreadyExists(format!("email '{}'", email))
            }
            e => {
                log::error!("Failed to create user: {}", e);
                ApiError::DatabaseError(e.to_string())
            }
        })
    }

    pub async fn get_by_id<'e, E>(executor: E, id: Uuid) -> Result<User, ApiError>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch user {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound("User".into()))
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch user by email: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Paginated listing for the back-office
    pub async fn list(pool: &PgPool, query: &UserListQuery) -> Result<(Vec<User>, i64), ApiError> {
        let paging = PageQuery::new(query.page, query.limit);

        fn filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, query: &'a UserListQuery) {
            qb.push(" WHERE 1 = 1");
            if let Some(role) = query.role {
                qb.push(" AND role = ").push_bind(role.as_str());
            }
            if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = format!("%{}%", search.trim());
                qb.push(" AND (name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR email ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        filters(&mut count, query);
        let (total,): (i64,) = count.build_query_as().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(paging.limit())
            .push(" OFFSET ")
            .push_bind(paging.offset());

        let users = select.build_query_as::<User>().fetch_all(pool).await?;
        Ok((users, total))
    }

    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        name: Option<&str>,
        phone: Option<&str>,
        avatar_url: Option<&str>,
        bio: Option<&str>,
    ) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                phone = COALESCE($2, phone),
                avatar_url = COALESCE($3, avatar_url),
                bio = COALESCE($4, bio),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(avatar_url)
        .bind(bio)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to update user {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("User".into()))
    }

    /// Flip `is_verified` and return the updated row
    pub async fn toggle_verified(pool: &PgPool, id: Uuid) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_verified = NOT is_verified, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

        log::info!("User {} is_verified -> {}", id, user.is_verified);
        Ok(user)
    }

    pub async fn set_role(pool: &PgPool, id: Uuid, role: Role) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(role.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

        log::info!("User {} role -> {}", id, role);
        Ok(user)
    }

    /// Mark a user verified; donors are promoted to organizers
    pub async fn mark_verified(conn: &mut PgConnection, id: Uuid) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_verified = TRUE,
                role = CASE WHEN role = 'donor' THEN 'organizer' ELSE role END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Delete failed for user {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("User".into()));
        }

        log::info!("Deleted user: {}", id);
        Ok(())
    }

    /// Add to the wallet balance
    pub async fn credit_wallet(
        conn: &mut PgConnection,
        id: Uuid,
        amount: i64,
    ) -> Result<(), ApiError> {
        let rows = sqlx::query(
            "UPDATE users SET wallet_balance = wallet_balance + $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(amount)
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("User".into()));
        }
        Ok(())
    }

    /// Subtract from the wallet balance; fails without touching the row when short
    pub async fn debit_wallet(
        conn: &mut PgConnection,
        id: Uuid,
        amount: i64,
    ) -> Result<i64, ApiError> {
        let balance: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET wallet_balance = wallet_balance - $1, updated_at = NOW()
            WHERE id = $2 AND wallet_balance >= $1
            RETURNING wallet_balance
            "#,
        )
        .bind(amount)
        .bind(id)
        .fetch_optional(conn)
        .await?;

        balance
            .map(|(b,)| b)
            .ok_or(ApiError::InsufficientBalance)
    }
}
