// src/models/user.rs
// DOCUMENTATION: User accounts, roles and auth DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::common::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Organizer,
    Admin,
}

string_enum!(Role {
    Donor => "donor",
    Organizer => "organizer",
    Admin => "admin",
});

/// Row of the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub wallet_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub wallet_balance: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Unknown role strings degrade to the least privileged role
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Donor)
    }

    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            avatar_url: self.avatar_url.clone(),
            bio: self.bio.clone(),
            role: self.role(),
            is_verified: self.is_verified,
            wallet_balance: self.wallet_balance,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<Role>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Budi".into(),
            email: "budi@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            phone: None,
            avatar_url: None,
            bio: None,
            role: role.into(),
            is_verified: false,
            wallet_balance: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_response_hides_password_hash() {
        let json = serde_json::to_value(user("organizer").to_response()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "organizer");
    }

    #[test]
    fn test_unknown_role_is_donor() {
        assert_eq!(user("superuser").role(), Role::Donor);
        assert_eq!(user("admin").role(), Role::Admin);
    }

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            name: "Siti".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            phone: None,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
