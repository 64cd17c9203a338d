//! Users repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::crud::{CrudRepository, Entity};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::UserRole,
        user::{RegisterUser, User},
    },
};

impl Entity for User {
    const TABLE: &'static str = "users";
    const LABEL: &'static str = "User";
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
    pub crud: CrudRepository<User>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            crud: CrudRepository::new(pool.clone()),
            pool,
        }
    }

    /// Get user by email (login)
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Create a user with an already hashed password
    pub async fn create(&self, data: &RegisterUser, password_hash: &str, role: UserRole) -> AppResult<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, phone_number, address, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(password_hash)
        .bind(&data.full_name)
        .bind(&data.phone_number)
        .bind(&data.address)
        .bind(role)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Conflict("Email is already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
