//! Categories repository

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::crud::{CrudRepository, Entity};
use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CreateCategory, UpdateCategory},
};

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const LABEL: &'static str = "Category";
    const ORDER_BY: &'static str = "name, id";
}

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
    pub crud: CrudRepository<Category>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            crud: CrudRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, id: Uuid, data: &UpdateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                updated_at = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }
}
