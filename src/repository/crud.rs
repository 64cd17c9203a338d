//! Generic by-id persistence shared by the entity repositories

use std::marker::PhantomData;

use sqlx::{postgres::PgRow, FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A table-backed entity keyed by a UUID `id` column
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    const TABLE: &'static str;
    /// Human readable name used in error messages
    const LABEL: &'static str;
    const ORDER_BY: &'static str = "created_at DESC";
}

pub struct CrudRepository<T> {
    pool: Pool<Postgres>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for CrudRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> CrudRepository<T> {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// Page through all rows, returning the page and the total row count
    pub async fn find_all(&self, limit: i64, offset: i64) -> AppResult<(Vec<T>, i64)> {
        let query = format!(
            "SELECT * FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
            T::TABLE,
            T::ORDER_BY
        );
        let rows = sqlx::query_as::<_, T>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        let total: i64 = sqlx::query_scalar(&count_query)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<T>> {
        let query = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        let row = sqlx::query_as::<_, T>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} with id {} not found", T::LABEL, id)))
    }

    pub async fn delete_by_id(&self, id: Uuid) -> AppResult<()> {
        let query = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} with id {} not found", T::LABEL, id)));
        }
        Ok(())
    }
}
