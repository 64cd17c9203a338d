//! Rentals repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres, Row};
use uuid::Uuid;

use super::{toys::ToysRepository, RentalStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RentalStatus,
        rental::{Rental, RentalItem, ReturnSettlement, SettledItem},
    },
};

const RENTAL_COLUMNS: &str = r#"
    id, user_id, status, rental_date, expected_return_date, actual_return_date,
    total_rental_price, late_fee, damage_fee, payment_status, notes
"#;

const ITEM_COLUMNS: &str = r#"
    id, rental_id, toy_id, quantity, price_per_unit, condition_before,
    condition_after, damage_description, damage_fee, status
"#;

#[derive(Clone)]
pub struct RentalsRepository {
    pool: Pool<Postgres>,
}

impl RentalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get rental by ID with its items
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Rental> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::RentalNotFound(id))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Rental>> {
        let query = format!("SELECT {} FROM rentals WHERE id = $1", RENTAL_COLUMNS);
        let rental = sqlx::query_as::<_, Rental>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match rental {
            Some(rental) => {
                let mut rentals = vec![rental];
                self.load_items(&mut rentals).await?;
                Ok(rentals.pop())
            }
            None => Ok(None),
        }
    }

    /// List rentals, newest first, optionally for one user
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Rental>, i64)> {
        let query = format!(
            r#"
            SELECT {} FROM rentals
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY rental_date DESC, id
            LIMIT $2 OFFSET $3
            "#,
            RENTAL_COLUMNS
        );
        let mut rentals = sqlx::query_as::<_, Rental>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rentals WHERE ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        self.load_items(&mut rentals).await?;
        Ok((rentals, total))
    }

    async fn load_items(&self, rentals: &mut [Rental]) -> AppResult<()> {
        if rentals.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = rentals.iter().map(|r| r.id).collect();
        let query = format!(
            "SELECT {} FROM rental_items WHERE rental_id = ANY($1) ORDER BY rental_id, position",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, RentalItem>(&query)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_rental: HashMap<Uuid, Vec<RentalItem>> = HashMap::new();
        for item in items {
            by_rental.entry(item.rental_id).or_default().push(item);
        }
        for rental in rentals.iter_mut() {
            rental.items = by_rental.remove(&rental.id).unwrap_or_default();
        }
        Ok(())
    }

    /// Update one settled item; intact returns go back into stock
    pub async fn update_rental_item(conn: &mut PgConnection, item: &SettledItem) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE rental_items
            SET condition_after = $1, damage_description = $2, damage_fee = $3, status = $4
            WHERE id = $5 AND status = 'rented'
            "#,
        )
        .bind(item.condition_after)
        .bind(&item.damage_description)
        .bind(item.damage_fee)
        .bind(item.status)
        .bind(item.item_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidRentalState(format!(
                "rental item {} has already been returned",
                item.item_id
            )));
        }

        if item.restocks() {
            ToysRepository::adjust_stock_in(conn, item.toy_id, item.quantity).await?;
        }
        Ok(())
    }

    /// Write the status, return date, fees and notes of a settled rental
    pub async fn update_rental_summary(
        conn: &mut PgConnection,
        settlement: &ReturnSettlement,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE rentals
            SET status = $1, actual_return_date = $2, late_fee = $3, damage_fee = $4,
                notes = COALESCE($5, notes), updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(settlement.status)
        .bind(settlement.actual_return_date)
        .bind(settlement.late_fee)
        .bind(settlement.damage_fee)
        .bind(&settlement.notes)
        .bind(settlement.rental_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RentalStore for RentalsRepository {
    async fn find_rental_by_id(&self, id: Uuid) -> AppResult<Option<Rental>> {
        self.find_by_id(id).await
    }

    async fn list_rentals(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Rental>, i64)> {
        self.list(user_id, limit, offset).await
    }

    async fn insert_rental_with_items(&self, rental: &Rental) -> AppResult<()> {
        rental.check_dates()?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rentals (id, user_id, status, rental_date, expected_return_date,
                                 actual_return_date, total_rental_price, late_fee, damage_fee,
                                 payment_status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(rental.id)
        .bind(rental.user_id)
        .bind(rental.status)
        .bind(rental.rental_date)
        .bind(rental.expected_return_date)
        .bind(rental.actual_return_date)
        .bind(rental.total_rental_price)
        .bind(rental.late_fee)
        .bind(rental.damage_fee)
        .bind(rental.payment_status)
        .bind(&rental.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound(format!("User with id {} not found", rental.user_id))
            }
            e => e.into(),
        })?;

        for (position, item) in rental.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO rental_items (id, rental_id, toy_id, position, quantity, price_per_unit,
                                          condition_before, condition_after, damage_description,
                                          damage_fee, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(item.id)
            .bind(rental.id)
            .bind(item.toy_id)
            .bind(position as i32)
            .bind(item.quantity)
            .bind(item.price_per_unit)
            .bind(item.condition_before)
            .bind(item.condition_after)
            .bind(&item.damage_description)
            .bind(item.damage_fee)
            .bind(item.status)
            .execute(&mut *tx)
            .await?;

            // Dropping `tx` on error rolls back the rows inserted so far
            ToysRepository::adjust_stock_in(&mut tx, item.toy_id, -item.quantity).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn settle_return(&self, settlement: &ReturnSettlement) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT status, actual_return_date FROM rentals WHERE id = $1 FOR UPDATE",
        )
        .bind(settlement.rental_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::RentalNotFound(settlement.rental_id))?;

        let status: RentalStatus = row.try_get("status")?;
        let returned_at: Option<DateTime<Utc>> = row.try_get("actual_return_date")?;
        if status.is_terminal() || returned_at.is_some() {
            return Err(AppError::InvalidRentalState(format!(
                "rental {} is already {}",
                settlement.rental_id, status
            )));
        }

        for item in &settlement.items {
            Self::update_rental_item(&mut tx, item).await?;
        }
        Self::update_rental_summary(&mut tx, settlement).await?;

        tx.commit().await?;
        Ok(())
    }
}
