//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::UserRole;
use crate::error::AppError;

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(email(message = "Invalid email format"), length(min = 5, max = 255))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, max = 255, message = "Full name must be between 2 and 255 characters"))]
    pub full_name: String,
    #[validate(length(min = 7, max = 20, message = "Phone number must be between 7 and 20 characters"))]
    pub phone_number: Option<String>,
    #[validate(length(min = 5, max = 1000, message = "Address must be between 5 and 1000 characters"))]
    pub address: Option<String>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn new(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp: (now + chrono::Duration::hours(expiration_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Allow the owner of a resource or an admin
    pub fn require_self_or_admin(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::Authorization("Access to this resource is not allowed".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            password_hash: String::new(),
            full_name: "Ana".to_string(),
            phone_number: None,
            address: None,
            is_active: true,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let user = sample_user(UserRole::Customer);
        let claims = UserClaims::new(&user, 1);
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, user.id);
        assert_eq!(parsed.role, UserRole::Customer);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_role_checks() {
        let customer = UserClaims::new(&sample_user(UserRole::Customer), 1);
        assert!(customer.require_admin().is_err());
        assert!(customer.require_self_or_admin(customer.user_id).is_ok());
        assert!(customer.require_self_or_admin(Uuid::new_v4()).is_err());

        let admin = UserClaims::new(&sample_user(UserRole::Admin), 1);
        assert!(admin.require_self_or_admin(Uuid::new_v4()).is_ok());
    }
}
