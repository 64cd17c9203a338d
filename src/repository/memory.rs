//! In-memory catalog and rental store.
//!
//! Backs the rental engine in tests and local experiments. Every write works
//! on a copy of the state and swaps it in only on success, so multi-row
//! operations are all-or-nothing like their Postgres counterparts.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, RentalStore};
use crate::{
    error::{AppError, AppResult},
    models::{Rental, RentalItemStatus, ReturnSettlement, Toy},
};

#[derive(Clone, Default)]
struct MemoryState {
    toys: HashMap<Uuid, Toy>,
    rentals: HashMap<Uuid, Rental>,
}

impl MemoryState {
    fn adjust_stock(&mut self, id: Uuid, delta: i32) -> AppResult<()> {
        let toy = self.toys.get_mut(&id).ok_or(AppError::ToyNotFound(id))?;
        match toy.stock.checked_add(delta) {
            Some(stock) if stock >= 0 => {
                toy.stock = stock;
                Ok(())
            }
            _ => Err(AppError::InsufficientStock(toy.name.clone())),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    /// Number of settled items after which `settle_return` fails
    fail_settle_after: RwLock<Option<usize>>,
    writes: RwLock<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_toy(&self, toy: Toy) {
        self.state.write().await.toys.insert(toy.id, toy);
    }

    pub async fn toy(&self, id: Uuid) -> Option<Toy> {
        self.state.read().await.toys.get(&id).cloned()
    }

    pub async fn rental(&self, id: Uuid) -> Option<Rental> {
        self.state.read().await.rentals.get(&id).cloned()
    }

    pub async fn rental_count(&self) -> usize {
        self.state.read().await.rentals.len()
    }

    /// Make the next settlements fail after `items` item updates
    pub async fn fail_settle_after(&self, items: Option<usize>) {
        *self.fail_settle_after.write().await = items;
    }

    /// Number of successful write operations
    pub async fn write_count(&self) -> usize {
        *self.writes.read().await
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_toy_by_id(&self, id: Uuid) -> AppResult<Option<Toy>> {
        Ok(self.toy(id).await)
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> AppResult<()> {
        self.state.write().await.adjust_stock(id, delta)?;
        *self.writes.write().await += 1;
        Ok(())
    }
}

#[async_trait]
impl RentalStore for MemoryStore {
    async fn find_rental_by_id(&self, id: Uuid) -> AppResult<Option<Rental>> {
        Ok(self.rental(id).await)
    }

    async fn list_rentals(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Rental>, i64)> {
        let state = self.state.read().await;
        let mut rentals: Vec<Rental> = state
            .rentals
            .values()
            .filter(|r| user_id.map_or(true, |id| r.user_id == id))
            .cloned()
            .collect();
        rentals.sort_by(|a, b| b.rental_date.cmp(&a.rental_date).then(a.id.cmp(&b.id)));

        let total = rentals.len() as i64;
        let page = rentals
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn insert_rental_with_items(&self, rental: &Rental) -> AppResult<()> {
        rental.check_dates()?;

        let mut state = self.state.write().await;
        let mut next = state.clone();
        for item in &rental.items {
            next.adjust_stock(item.toy_id, -item.quantity)?;
        }
        next.rentals.insert(rental.id, rental.clone());
        *state = next;

        *self.writes.write().await += 1;
        Ok(())
    }

    async fn settle_return(&self, settlement: &ReturnSettlement) -> AppResult<()> {
        let fail_after = *self.fail_settle_after.read().await;

        let mut state = self.state.write().await;
        let mut next = state.clone();
        let rental = next
            .rentals
            .get(&settlement.rental_id)
            .cloned()
            .ok_or(AppError::RentalNotFound(settlement.rental_id))?;

        if rental.status.is_terminal() || rental.is_settled() {
            return Err(AppError::InvalidRentalState(format!(
                "rental {} is already {}",
                rental.id, rental.status
            )));
        }

        for (applied, settled) in settlement.items.iter().enumerate() {
            if fail_after == Some(applied) {
                return Err(sqlx::Error::PoolClosed.into());
            }
            let current = rental
                .items
                .iter()
                .find(|item| item.id == settled.item_id)
                .ok_or(AppError::UnknownRentalItem(settled.item_id))?;
            if current.status != RentalItemStatus::Rented {
                return Err(AppError::InvalidRentalState(format!(
                    "rental item {} has already been returned",
                    settled.item_id
                )));
            }
            if settled.restocks() {
                next.adjust_stock(settled.toy_id, settled.quantity)?;
            }
        }

        let mut rental = rental;
        settlement.apply_to(&mut rental);
        next.rentals.insert(rental.id, rental);
        *state = next;

        *self.writes.write().await += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::models::ItemCondition;

    fn toy(stock: i32) -> Toy {
        let now = Utc::now();
        Toy {
            id: Uuid::new_v4(),
            name: "Spinning top".to_string(),
            description: None,
            age_recommendation: None,
            condition: ItemCondition::Good,
            rental_price: Decimal::from(500),
            late_fee_per_day: Decimal::from(50),
            replacement_price: Decimal::from(3000),
            is_available: true,
            stock,
            created_at: now,
            updated_at: now,
            categories: vec![],
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_adjust_stock_never_goes_negative() {
        let store = MemoryStore::new();
        let top = toy(2);
        store.insert_toy(top.clone()).await;

        store.adjust_stock(top.id, -2).await.unwrap();
        assert_eq!(store.toy(top.id).await.unwrap().stock, 0);

        let err = store.adjust_stock(top.id, -1).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(name) if name == "Spinning top"));
        assert_eq!(store.toy(top.id).await.unwrap().stock, 0);

        store.adjust_stock(top.id, 3).await.unwrap();
        assert_eq!(store.toy(top.id).await.unwrap().stock, 3);
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_toy() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let err = store.adjust_stock(id, 1).await.unwrap_err();
        assert!(matches!(err, AppError::ToyNotFound(missing) if missing == id));
        assert_eq!(store.write_count().await, 0);
    }
}
