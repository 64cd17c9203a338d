//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{AuthConfig, RentalConfig},
    error::{AppError, AppResult},
    models::{
        enums::UserRole,
        user::{RegisterUser, User, UserClaims},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    auth: AuthConfig,
    paging: RentalConfig,
}

impl UsersService {
    pub fn new(repository: Repository, auth: AuthConfig, paging: RentalConfig) -> Self {
        Self {
            repository,
            auth,
            paging,
        }
    }

    /// Register a customer account
    pub async fn register(&self, data: RegisterUser) -> AppResult<User> {
        data.validate()?;
        let hash = hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(&data, &hash, UserRole::Customer)
            .await?;
        tracing::info!("User registered: {}", user.id);
        Ok(user)
    }

    /// Create the configured administrator account if it does not exist yet
    pub async fn ensure_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (&self.auth.admin_email, &self.auth.admin_password)
        else {
            return Ok(());
        };
        if self.repository.users.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        let data = RegisterUser {
            email: email.clone(),
            password: password.clone(),
            full_name: "Administrator".to_string(),
            phone_number: None,
            address: None,
        };
        data.validate()?;
        let hash = hash_password(&data.password)?;
        let admin = self
            .repository
            .users
            .create(&data, &hash, UserRole::Admin)
            .await?;
        tracing::info!("Administrator account created: {}", admin.email);
        Ok(())
    }

    /// Authenticate by email and password, returning a JWT and the user
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }
        if !verify_password(&user.password_hash, password)? {
            tracing::warn!("Failed login for user {}", user.id);
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let token = UserClaims::new(&user, self.auth.jwt_expiration_hours)
            .create_token(&self.auth.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.repository.users.crud.get_by_id(id).await
    }

    /// List users, returning (users, total, page, per_page)
    pub async fn list_users(
        &self,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<(Vec<User>, i64, i64, i64)> {
        let (page, per_page, offset) = self.paging.page_bounds(page, per_page);
        let (users, total) = self.repository.users.crud.find_all(per_page, offset).await?;
        Ok((users, total, page, per_page))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("not-a-hash", "anything").is_err());
    }
}
