//! Toys repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgConnection, Pool, Postgres};
use uuid::Uuid;

use super::{
    crud::{CrudRepository, Entity},
    CatalogStore,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        category::Category,
        toy::{CreateToy, CreateToyImage, Toy, ToyImage, UpdateToy},
    },
};

impl Entity for Toy {
    const TABLE: &'static str = "toys";
    const LABEL: &'static str = "Toy";
    const ORDER_BY: &'static str = "name, id";
}

/// Category row tagged with the toy it belongs to
#[derive(FromRow)]
struct ToyCategoryRow {
    toy_id: Uuid,
    #[sqlx(flatten)]
    category: Category,
}

#[derive(Clone)]
pub struct ToysRepository {
    pool: Pool<Postgres>,
    crud: CrudRepository<Toy>,
}

impl ToysRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            crud: CrudRepository::new(pool.clone()),
            pool,
        }
    }

    /// List toys with categories and images
    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Toy>, i64)> {
        let (mut toys, total) = self.crud.find_all(limit, offset).await?;
        self.load_relations(&mut toys).await?;
        Ok((toys, total))
    }

    /// Get toy by ID with categories and images
    pub async fn get(&self, id: Uuid) -> AppResult<Toy> {
        let toy = self.crud.get_by_id(id).await?;
        let mut toys = vec![toy];
        self.load_relations(&mut toys).await?;
        Ok(toys.remove(0))
    }

    async fn load_relations(&self, toys: &mut [Toy]) -> AppResult<()> {
        if toys.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = toys.iter().map(|t| t.id).collect();

        let category_rows = sqlx::query_as::<_, ToyCategoryRow>(
            r#"
            SELECT tc.toy_id, c.id, c.name, c.description, c.created_at, c.updated_at
            FROM toy_categories tc
            JOIN categories c ON c.id = tc.category_id
            WHERE tc.toy_id = ANY($1)
            ORDER BY c.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let images = sqlx::query_as::<_, ToyImage>(
            "SELECT * FROM toy_images WHERE toy_id = ANY($1) ORDER BY is_primary DESC, created_at",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut categories: HashMap<Uuid, Vec<Category>> = HashMap::new();
        for row in category_rows {
            categories.entry(row.toy_id).or_default().push(row.category);
        }
        let mut images_by_toy: HashMap<Uuid, Vec<ToyImage>> = HashMap::new();
        for image in images {
            images_by_toy.entry(image.toy_id).or_default().push(image);
        }

        for toy in toys.iter_mut() {
            toy.categories = categories.remove(&toy.id).unwrap_or_default();
            toy.images = images_by_toy.remove(&toy.id).unwrap_or_default();
        }
        Ok(())
    }

    /// Create a toy and link it to its categories
    pub async fn create(&self, data: &CreateToy) -> AppResult<Toy> {
        let mut tx = self.pool.begin().await?;

        let toy = sqlx::query_as::<_, Toy>(
            r#"
            INSERT INTO toys (id, name, description, age_recommendation, condition,
                              rental_price, late_fee_per_day, replacement_price, is_available, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.age_recommendation)
        .bind(data.condition)
        .bind(data.rental_price)
        .bind(data.late_fee_per_day)
        .bind(data.replacement_price)
        .bind(data.is_available.unwrap_or(true))
        .bind(data.stock)
        .fetch_one(&mut *tx)
        .await?;

        Self::link_categories(&mut tx, toy.id, &data.category_ids).await?;
        tx.commit().await?;

        self.get(toy.id).await
    }

    /// Update toy fields that are present; replaces categories when given
    pub async fn update(&self, id: Uuid, data: &UpdateToy) -> AppResult<Toy> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.description, "description");
        add_field!(data.age_recommendation, "age_recommendation");
        add_field!(data.condition, "condition");
        add_field!(data.rental_price, "rental_price");
        add_field!(data.late_fee_per_day, "late_fee_per_day");
        add_field!(data.replacement_price, "replacement_price");
        add_field!(data.is_available, "is_available");
        add_field!(data.stock, "stock");

        let query = format!(
            "UPDATE toys SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Toy>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.description);
        bind_field!(data.age_recommendation);
        bind_field!(data.condition);
        bind_field!(data.rental_price);
        bind_field!(data.late_fee_per_day);
        bind_field!(data.replacement_price);
        bind_field!(data.is_available);
        bind_field!(data.stock);

        let mut tx = self.pool.begin().await?;

        builder
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Toy with id {} not found", id)))?;

        if let Some(ref category_ids) = data.category_ids {
            sqlx::query("DELETE FROM toy_categories WHERE toy_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::link_categories(&mut tx, id, category_ids).await?;
        }

        tx.commit().await?;
        self.get(id).await
    }

    async fn link_categories(
        conn: &mut PgConnection,
        toy_id: Uuid,
        category_ids: &[Uuid],
    ) -> AppResult<()> {
        let linked = sqlx::query(
            r#"
            INSERT INTO toy_categories (toy_id, category_id)
            SELECT $1, c.id FROM categories c WHERE c.id = ANY($2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(toy_id)
        .bind(category_ids)
        .execute(&mut *conn)
        .await?;

        let distinct: std::collections::HashSet<&Uuid> = category_ids.iter().collect();
        if (linked.rows_affected() as usize) < distinct.len() {
            return Err(AppError::Validation("Unknown category in category_ids".to_string()));
        }
        Ok(())
    }

    /// Delete a toy that was never rented
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let rented: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM rental_items WHERE toy_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if rented {
            return Err(AppError::Conflict(
                "Toy has rental history and cannot be deleted".to_string(),
            ));
        }

        self.crud.delete_by_id(id).await
    }

    /// Record an image URL for a toy
    pub async fn add_image(&self, toy_id: Uuid, data: &CreateToyImage) -> AppResult<ToyImage> {
        self.crud.get_by_id(toy_id).await?;
        let is_primary = data.is_primary.unwrap_or(false);

        let mut tx = self.pool.begin().await?;
        if is_primary {
            sqlx::query("UPDATE toy_images SET is_primary = FALSE WHERE toy_id = $1")
                .bind(toy_id)
                .execute(&mut *tx)
                .await?;
        }

        let image = sqlx::query_as::<_, ToyImage>(
            r#"
            INSERT INTO toy_images (id, toy_id, image_url, is_primary)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(toy_id)
        .bind(&data.image_url)
        .bind(is_primary)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(image)
    }

    pub async fn delete_image(&self, toy_id: Uuid, image_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM toy_images WHERE id = $1 AND toy_id = $2")
            .bind(image_id)
            .bind(toy_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Image {} not found", image_id)));
        }
        Ok(())
    }

    /// Conditional stock movement on an open connection or transaction.
    ///
    /// The check and the write are one statement, so concurrent rentals of the
    /// same toy cannot both pass the check.
    pub async fn adjust_stock_in(conn: &mut PgConnection, id: Uuid, delta: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE toys SET stock = stock + $1, updated_at = NOW()
            WHERE id = $2 AND stock + $1 >= 0
            "#,
        )
        .bind(delta)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let name: Option<String> = sqlx::query_scalar("SELECT name FROM toys WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match name {
            Some(name) => Err(AppError::InsufficientStock(name)),
            None => Err(AppError::ToyNotFound(id)),
        }
    }
}

#[async_trait]
impl CatalogStore for ToysRepository {
    async fn find_toy_by_id(&self, id: Uuid) -> AppResult<Option<Toy>> {
        self.crud.find_by_id(id).await
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::adjust_stock_in(&mut conn, id, delta).await
    }
}
