//! Repository layer for database operations

pub mod categories;
pub mod crud;
pub mod memory;
pub mod rentals;
pub mod toys;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Rental, ReturnSettlement, Toy},
};

/// Toy lookups and stock movements needed by the rental engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_toy_by_id(&self, id: Uuid) -> AppResult<Option<Toy>>;

    /// Add `delta` to the toy's stock. Fails with `InsufficientStock` when the
    /// result would be negative, leaving the stock untouched.
    ///
    /// Standalone stock movement for callers outside a rental. Creation and
    /// settlement move stock inside their own `RentalStore` unit of work
    /// instead, so the engine never calls this.
    async fn adjust_stock(&self, id: Uuid, delta: i32) -> AppResult<()>;
}

/// Persistence of rental aggregates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RentalStore: Send + Sync {
    /// Load a rental with its items
    async fn find_rental_by_id(&self, id: Uuid) -> AppResult<Option<Rental>>;

    /// Page through rentals, newest first, optionally for a single user
    async fn list_rentals(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Rental>, i64)>;

    /// Insert the rental and its items and take their quantities out of
    /// stock, all or nothing.
    async fn insert_rental_with_items(&self, rental: &Rental) -> AppResult<()>;

    /// Apply every item update, restock and the rental summary, all or nothing.
    async fn settle_return(&self, settlement: &ReturnSettlement) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub categories: categories::CategoriesRepository,
    pub toys: toys::ToysRepository,
    pub rentals: rentals::RentalsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            toys: toys::ToysRepository::new(pool.clone()),
            rentals: rentals::RentalsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
