//! Rental lifecycle: creation and return settlement

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::fees;
use crate::{
    config::RentalConfig,
    error::{AppError, AppResult},
    models::{
        rental::{NewRental, ReturnRental},
        ItemCondition, PaymentStatus, Rental, RentalItem, RentalItemStatus, RentalStatus,
        ReturnSettlement, SettledItem, Toy,
    },
    repository::{CatalogStore, RentalStore},
};

#[derive(Clone)]
pub struct RentalsService {
    catalog: Arc<dyn CatalogStore>,
    rentals: Arc<dyn RentalStore>,
    config: RentalConfig,
}

impl RentalsService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        rentals: Arc<dyn RentalStore>,
        config: RentalConfig,
    ) -> Self {
        Self {
            catalog,
            rentals,
            config,
        }
    }

    /// Get a rental with its items
    pub async fn get_rental(&self, id: Uuid) -> AppResult<Rental> {
        self.rentals
            .find_rental_by_id(id)
            .await?
            .ok_or(AppError::RentalNotFound(id))
    }

    /// List rentals, optionally only those of one user
    pub async fn list_rentals(
        &self,
        user_id: Option<Uuid>,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<(Vec<Rental>, i64, i64, i64)> {
        let (page, per_page, offset) = self.config.page_bounds(page, per_page);
        let (rentals, total) = self.rentals.list_rentals(user_id, per_page, offset).await?;
        Ok((rentals, total, page, per_page))
    }

    /// Create a rental, snapshotting toy prices and taking the requested
    /// quantities out of stock.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, items = request.items.len()))]
    pub async fn create_rental(&self, request: NewRental) -> AppResult<Rental> {
        if request.expected_return_date <= request.rental_date {
            return Err(AppError::InvalidReturnDate(
                "expected return date must be after the rental date".to_string(),
            ));
        }
        if request.items.is_empty() {
            return Err(AppError::Validation(
                "At least one item is required".to_string(),
            ));
        }

        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            if item.quantity < 1 {
                return Err(AppError::Validation(
                    "Quantity must be at least 1".to_string(),
                ));
            }
            let condition = parse_condition(&item.condition_before)?;
            if !condition.is_grade() {
                return Err(AppError::InvalidCondition(format!(
                    "{} is not a valid condition for a rented toy",
                    condition
                )));
            }
            lines.push((item.toy_id, item.quantity, condition));
        }

        let rental_id = Uuid::new_v4();
        let mut toys: HashMap<Uuid, Toy> = HashMap::new();
        let mut requested: HashMap<Uuid, i32> = HashMap::new();
        let mut items = Vec::with_capacity(lines.len());
        let mut total_rental_price = Decimal::ZERO;

        for (toy_id, quantity, condition) in lines {
            if !toys.contains_key(&toy_id) {
                let toy = self
                    .catalog
                    .find_toy_by_id(toy_id)
                    .await?
                    .ok_or(AppError::ToyNotFound(toy_id))?;
                toys.insert(toy_id, toy);
            }
            let toy = &toys[&toy_id];

            let wanted = requested.entry(toy_id).or_insert(0);
            match wanted.checked_add(quantity) {
                Some(total) if total <= toy.stock => *wanted = total,
                total => {
                    tracing::warn!(toy_id = %toy_id, stock = toy.stock, requested = ?total, "Insufficient stock");
                    return Err(AppError::InsufficientStock(toy.name.clone()));
                }
            }

            let item = RentalItem {
                id: Uuid::new_v4(),
                rental_id,
                toy_id,
                quantity,
                price_per_unit: toy.rental_price,
                condition_before: condition,
                condition_after: condition,
                damage_description: None,
                damage_fee: Decimal::ZERO,
                status: RentalItemStatus::Rented,
            };
            total_rental_price += item.subtotal();
            items.push(item);
        }

        let rental = Rental {
            id: rental_id,
            user_id: request.user_id,
            status: RentalStatus::Pending,
            rental_date: request.rental_date,
            expected_return_date: request.expected_return_date,
            actual_return_date: None,
            total_rental_price,
            late_fee: Decimal::ZERO,
            damage_fee: Decimal::ZERO,
            payment_status: PaymentStatus::Unpaid,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            items,
        };

        self.rentals.insert_rental_with_items(&rental).await?;

        tracing::info!(rental_id = %rental.id, total = %rental.total_rental_price, "Rental created");
        Ok(rental)
    }

    /// Settle a return: late fees over every item, damage fees over the
    /// reported ones, restock of intact items. Written as one unit.
    #[tracing::instrument(skip(self, request), fields(reports = request.items.len()))]
    pub async fn return_rental(&self, rental_id: Uuid, request: ReturnRental) -> AppResult<Rental> {
        let mut rental = self.get_rental(rental_id).await?;

        if rental.status.is_terminal() || rental.is_settled() {
            tracing::warn!(status = %rental.status, "Return refused");
            return Err(AppError::InvalidRentalState(format!(
                "rental {} is already {}",
                rental.id, rental.status
            )));
        }
        if request.actual_return_date < rental.rental_date {
            return Err(AppError::InvalidReturnDate(
                "actual return date cannot be before the rental date".to_string(),
            ));
        }

        let index: HashMap<Uuid, usize> = rental
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id, i))
            .collect();

        let mut toys: HashMap<Uuid, Toy> = HashMap::new();
        for item in &rental.items {
            if !toys.contains_key(&item.toy_id) {
                let toy = self
                    .catalog
                    .find_toy_by_id(item.toy_id)
                    .await?
                    .ok_or(AppError::ToyNotFound(item.toy_id))?;
                toys.insert(item.toy_id, toy);
            }
        }

        let days_late = fees::days_late(
            rental.expected_return_date,
            request.actual_return_date,
            self.config.late_fee_bucket_hours,
        );
        let (status, late_fee) = match days_late {
            Some(days) => {
                let fee: Decimal = rental
                    .items
                    .iter()
                    .map(|item| fees::late_fee(toys[&item.toy_id].late_fee_per_day, days, item.quantity))
                    .sum();
                (RentalStatus::Overdue, fee)
            }
            None => (RentalStatus::Completed, Decimal::ZERO),
        };

        let mut reported = HashSet::new();
        let mut settled = Vec::with_capacity(request.items.len());
        let mut damage_fee = Decimal::ZERO;

        for report in &request.items {
            let item = index
                .get(&report.rental_item_id)
                .map(|&i| &rental.items[i])
                .ok_or(AppError::UnknownRentalItem(report.rental_item_id))?;
            let condition_after = parse_condition(&report.condition_after)?;

            if item.status != RentalItemStatus::Rented || !reported.insert(item.id) {
                return Err(AppError::InvalidRentalState(format!(
                    "rental item {} has already been returned",
                    item.id
                )));
            }

            let damage_description = report
                .damage_description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());
            if condition_after == ItemCondition::Damaged && damage_description.is_none() {
                return Err(AppError::Validation(
                    "A damage description is required for damaged items".to_string(),
                ));
            }

            let toy = &toys[&item.toy_id];
            let (fee, item_status) = fees::assess_damage(
                item.condition_before,
                condition_after,
                toy.replacement_price,
                item.quantity,
            );
            damage_fee += fee;

            settled.push(SettledItem {
                item_id: item.id,
                toy_id: item.toy_id,
                quantity: item.quantity,
                condition_after,
                damage_description,
                damage_fee: fee,
                status: item_status,
            });
        }

        let settlement = ReturnSettlement {
            rental_id: rental.id,
            status,
            actual_return_date: request.actual_return_date,
            late_fee,
            damage_fee,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            items: settled,
        };

        self.rentals.settle_return(&settlement).await?;
        settlement.apply_to(&mut rental);

        tracing::info!(
            rental_id = %rental.id,
            status = %rental.status,
            late_fee = %rental.late_fee,
            damage_fee = %rental.damage_fee,
            "Rental returned"
        );
        Ok(rental)
    }
}

fn parse_condition(value: &str) -> AppResult<ItemCondition> {
    value
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| AppError::InvalidCondition(format!("unknown condition '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rental::{NewRentalItem, ReturnItemReport};
    use crate::repository::{memory::MemoryStore, MockCatalogStore, MockRentalStore};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn due() -> DateTime<Utc> {
        start() + Duration::days(7)
    }

    fn toy(name: &str, stock: i32, rental_price: i64, late_fee: i64, replacement: i64) -> Toy {
        let now = Utc::now();
        Toy {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            age_recommendation: None,
            condition: ItemCondition::New,
            rental_price: Decimal::from(rental_price),
            late_fee_per_day: Decimal::from(late_fee),
            replacement_price: Decimal::from(replacement),
            is_available: true,
            stock,
            created_at: now,
            updated_at: now,
            categories: vec![],
            images: vec![],
        }
    }

    fn line(toy_id: Uuid, quantity: i32, condition: &str) -> NewRentalItem {
        NewRentalItem {
            toy_id,
            quantity,
            condition_before: condition.to_string(),
        }
    }

    fn new_rental(items: Vec<NewRentalItem>) -> NewRental {
        NewRental {
            user_id: Uuid::new_v4(),
            rental_date: start(),
            expected_return_date: due(),
            items,
            notes: None,
        }
    }

    fn report(item: &RentalItem, condition: &str, description: Option<&str>) -> ReturnItemReport {
        ReturnItemReport {
            rental_item_id: item.id,
            condition_after: condition.to_string(),
            damage_description: description.map(str::to_string),
        }
    }

    fn return_request(at: DateTime<Utc>, items: Vec<ReturnItemReport>) -> ReturnRental {
        ReturnRental {
            actual_return_date: at,
            items,
            notes: None,
        }
    }

    async fn setup(toys: Vec<Toy>) -> (Arc<MemoryStore>, RentalsService) {
        let store = Arc::new(MemoryStore::new());
        for toy in toys {
            store.insert_toy(toy).await;
        }
        let service = RentalsService::new(store.clone(), store.clone(), RentalConfig::default());
        (store, service)
    }

    #[tokio::test]
    async fn test_create_snapshots_prices_and_takes_stock() {
        let car = toy("Race car", 5, 15000, 1000, 100000);
        let blocks = toy("Blocks", 3, 5000, 500, 40000);
        let (store, service) = setup(vec![car.clone(), blocks.clone()]).await;

        let rental = service
            .create_rental(new_rental(vec![line(car.id, 2, "new"), line(blocks.id, 1, "Good")]))
            .await
            .unwrap();

        assert_eq!(rental.status, RentalStatus::Pending);
        assert_eq!(rental.payment_status, PaymentStatus::Unpaid);
        assert_eq!(rental.total_rental_price, Decimal::from(35000));
        assert_eq!(rental.late_fee, Decimal::ZERO);
        assert_eq!(rental.items.len(), 2);
        assert_eq!(rental.items[0].toy_id, car.id);
        assert_eq!(rental.items[0].price_per_unit, Decimal::from(15000));
        assert_eq!(rental.items[1].condition_after, ItemCondition::Good);
        assert!(rental.items.iter().all(|i| i.status == RentalItemStatus::Rented));

        assert_eq!(store.toy(car.id).await.unwrap().stock, 3);
        assert_eq!(store.toy(blocks.id).await.unwrap().stock, 2);
        assert!(store.rental(rental.id).await.is_some());
    }

    #[tokio::test]
    async fn test_create_insufficient_stock_has_no_side_effects() {
        let car = toy("Race car", 1, 15000, 1000, 100000);
        let (store, service) = setup(vec![car.clone()]).await;

        let err = service
            .create_rental(new_rental(vec![line(car.id, 2, "new")]))
            .await
            .unwrap_err();

        match err {
            AppError::InsufficientStock(name) => assert_eq!(name, "Race car"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.toy(car.id).await.unwrap().stock, 1);
        assert_eq!(store.rental_count().await, 0);
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_sums_lines_for_the_same_toy() {
        let car = toy("Race car", 3, 15000, 1000, 100000);
        let (store, service) = setup(vec![car.clone()]).await;

        let err = service
            .create_rental(new_rental(vec![line(car.id, 2, "new"), line(car.id, 2, "good")]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientStock(_)));
        assert_eq!(store.toy(car.id).await.unwrap().stock, 3);
    }

    #[tokio::test]
    async fn test_create_quantity_overflow_is_insufficient_stock() {
        let bin = toy("Marble bin", i32::MAX, 10, 1, 100);
        let (store, service) = setup(vec![bin.clone()]).await;

        let err = service
            .create_rental(new_rental(vec![line(bin.id, i32::MAX, "new"), line(bin.id, 1, "new")]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientStock(_)));
        assert_eq!(store.toy(bin.id).await.unwrap().stock, i32::MAX);
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_unknown_toy() {
        let (store, service) = setup(vec![]).await;
        let missing = Uuid::new_v4();

        let err = service
            .create_rental(new_rental(vec![line(missing, 1, "new")]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ToyNotFound(id) if id == missing));
        assert_eq!(store.rental_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_condition_before() {
        let car = toy("Race car", 3, 15000, 1000, 100000);
        let (_, service) = setup(vec![car.clone()]).await;

        let err = service
            .create_rental(new_rental(vec![line(car.id, 1, "shiny")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCondition(_)));

        let err = service
            .create_rental(new_rental(vec![line(car.id, 1, "lost")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCondition(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_request() {
        let (_, service) = setup(vec![]).await;
        let err = service.create_rental(new_rental(vec![])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_bad_dates_never_reach_the_stores() {
        // Mocks without expectations panic on any call
        let service = RentalsService::new(
            Arc::new(MockCatalogStore::new()),
            Arc::new(MockRentalStore::new()),
            RentalConfig::default(),
        );

        let mut same_day = new_rental(vec![line(Uuid::new_v4(), 1, "new")]);
        same_day.expected_return_date = same_day.rental_date;
        let err = service.create_rental(same_day).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReturnDate(_)));

        let mut backwards = new_rental(vec![line(Uuid::new_v4(), 1, "new")]);
        backwards.expected_return_date = backwards.rental_date - Duration::hours(1);
        let err = service.create_rental(backwards).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReturnDate(_)));
    }

    #[tokio::test]
    async fn test_on_time_return_completes_and_restocks() {
        let car = toy("Race car", 4, 15000, 1000, 100000);
        let (store, service) = setup(vec![car.clone()]).await;
        let rental = service
            .create_rental(new_rental(vec![line(car.id, 2, "good")]))
            .await
            .unwrap();

        let returned = service
            .return_rental(
                rental.id,
                return_request(due(), vec![report(&rental.items[0], "good", None)]),
            )
            .await
            .unwrap();

        assert_eq!(returned.status, RentalStatus::Completed);
        assert_eq!(returned.actual_return_date, Some(due()));
        assert_eq!(returned.late_fee, Decimal::ZERO);
        assert_eq!(returned.damage_fee, Decimal::ZERO);
        assert_eq!(returned.items[0].status, RentalItemStatus::Returned);
        assert_eq!(store.toy(car.id).await.unwrap().stock, 4);

        let stored = store.rental(rental.id).await.unwrap();
        assert_eq!(stored.status, RentalStatus::Completed);
    }

    #[tokio::test]
    async fn test_late_return_charges_every_item() {
        let car = toy("Race car", 4, 15000, 1000, 100000);
        let ball = toy("Ball", 4, 2000, 300, 8000);
        let (_, service) = setup(vec![car.clone(), ball.clone()]).await;
        let rental = service
            .create_rental(new_rental(vec![line(car.id, 2, "new"), line(ball.id, 1, "good")]))
            .await
            .unwrap();

        // Only the car is reported, the ball still accrues a late fee
        let returned = service
            .return_rental(
                rental.id,
                return_request(
                    due() + Duration::hours(49),
                    vec![report(&rental.items[0], "new", None)],
                ),
            )
            .await
            .unwrap();

        assert_eq!(returned.status, RentalStatus::Overdue);
        assert_eq!(returned.late_fee, Decimal::from(4000 + 600));
        assert_eq!(returned.items[1].status, RentalItemStatus::Rented);
    }

    #[tokio::test]
    async fn test_damage_tiers_and_total() {
        let good = toy("Puzzle", 1, 1000, 100, 100000);
        let broken = toy("Kite", 1, 1000, 100, 100000);
        let missing = toy("Robot", 1, 1000, 100, 100000);
        let (store, service) = setup(vec![good.clone(), broken.clone(), missing.clone()]).await;
        let rental = service
            .create_rental(new_rental(vec![
                line(good.id, 1, "new"),
                line(broken.id, 1, "new"),
                line(missing.id, 1, "new"),
            ]))
            .await
            .unwrap();

        let returned = service
            .return_rental(
                rental.id,
                return_request(
                    start() + Duration::days(2),
                    vec![
                        report(&rental.items[0], "good", None),
                        report(&rental.items[1], "damaged", Some("Torn sail")),
                        report(&rental.items[2], "LOST", None),
                    ],
                ),
            )
            .await
            .unwrap();

        assert_eq!(returned.items[0].damage_fee, Decimal::from(30000));
        assert_eq!(returned.items[1].damage_fee, Decimal::from(70000));
        assert_eq!(returned.items[2].damage_fee, Decimal::from(100000));
        assert_eq!(returned.items[1].damage_description.as_deref(), Some("Torn sail"));
        assert_eq!(returned.items[1].status, RentalItemStatus::Damaged);
        assert_eq!(returned.items[2].status, RentalItemStatus::Lost);
        assert_eq!(returned.damage_fee, Decimal::from(200000));
        assert_eq!(
            returned.total_amount(),
            returned.total_rental_price + returned.late_fee + returned.damage_fee
        );
        assert_eq!(returned.total_amount(), Decimal::from(203000));

        assert_eq!(store.toy(good.id).await.unwrap().stock, 1);
        assert_eq!(store.toy(broken.id).await.unwrap().stock, 0);
        assert_eq!(store.toy(missing.id).await.unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_returned_fees_match_stored_cents() {
        let mut robot = toy("Robot", 2, 1000, 100, 0);
        robot.replacement_price = Decimal::new(9999, 2);
        let mut kite = toy("Kite", 2, 1000, 100, 0);
        kite.replacement_price = Decimal::new(9999, 2);
        let (store, service) = setup(vec![robot.clone(), kite.clone()]).await;
        let rental = service
            .create_rental(new_rental(vec![line(robot.id, 1, "new"), line(kite.id, 1, "new")]))
            .await
            .unwrap();

        let returned = service
            .return_rental(
                rental.id,
                return_request(
                    due(),
                    vec![
                        report(&rental.items[0], "good", None),
                        report(&rental.items[1], "damaged", Some("Snapped spar")),
                    ],
                ),
            )
            .await
            .unwrap();

        assert_eq!(returned.items[0].damage_fee, Decimal::new(3000, 2));
        assert_eq!(returned.items[1].damage_fee, Decimal::new(6999, 2));
        assert_eq!(returned.damage_fee, Decimal::new(9999, 2));
        assert!(returned.damage_fee.scale() <= 2);

        let stored = store.rental(rental.id).await.unwrap();
        assert_eq!(stored.damage_fee, returned.damage_fee);
        assert_eq!(stored.total_amount(), returned.total_amount());
    }

    #[tokio::test]
    async fn test_unreported_items_stay_out_after_overdue_return() {
        let car = toy("Race car", 2, 15000, 1000, 100000);
        let ball = toy("Ball", 2, 2000, 300, 8000);
        let (store, service) = setup(vec![car.clone(), ball.clone()]).await;
        let rental = service
            .create_rental(new_rental(vec![line(car.id, 1, "new"), line(ball.id, 1, "good")]))
            .await
            .unwrap();

        let returned = service
            .return_rental(
                rental.id,
                return_request(
                    due() + Duration::hours(3),
                    vec![report(&rental.items[0], "new", None)],
                ),
            )
            .await
            .unwrap();
        assert_eq!(returned.status, RentalStatus::Overdue);
        assert!(returned.is_settled());
        let writes = store.write_count().await;

        // The settled rental is closed, so the ball cannot be brought back later
        let err = service
            .return_rental(
                rental.id,
                return_request(
                    due() + Duration::days(5),
                    vec![report(&rental.items[1], "good", None)],
                ),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidRentalState(_)));
        assert_eq!(store.write_count().await, writes);
        let stored = store.rental(rental.id).await.unwrap();
        assert_eq!(stored.items[1].status, RentalItemStatus::Rented);
        assert_eq!(stored.late_fee, returned.late_fee);
        assert_eq!(store.toy(car.id).await.unwrap().stock, 2);
        assert_eq!(store.toy(ball.id).await.unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_second_return_is_refused_without_writes() {
        let car = toy("Race car", 2, 15000, 1000, 100000);
        let (store, service) = setup(vec![car.clone()]).await;
        let rental = service
            .create_rental(new_rental(vec![line(car.id, 1, "new")]))
            .await
            .unwrap();
        let request = return_request(due(), vec![report(&rental.items[0], "new", None)]);
        service.return_rental(rental.id, request.clone()).await.unwrap();
        let writes = store.write_count().await;

        let err = service.return_rental(rental.id, request).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidRentalState(_)));
        assert_eq!(store.write_count().await, writes);
        assert_eq!(store.toy(car.id).await.unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_cancelled_rental_cannot_be_returned() {
        let car = toy("Race car", 2, 15000, 1000, 100000);
        let (store, service) = setup(vec![car.clone()]).await;
        let mut rental = service
            .create_rental(new_rental(vec![line(car.id, 1, "new")]))
            .await
            .unwrap();
        let item = rental.items[0].clone();

        rental.id = Uuid::new_v4();
        rental.status = RentalStatus::Cancelled;
        store.insert_rental_with_items(&rental).await.unwrap();
        let writes = store.write_count().await;

        let err = service
            .return_rental(rental.id, return_request(due(), vec![report(&item, "new", None)]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidRentalState(_)));
        assert_eq!(store.write_count().await, writes);
    }

    #[tokio::test]
    async fn test_return_before_rental_date() {
        let car = toy("Race car", 2, 15000, 1000, 100000);
        let (_, service) = setup(vec![car.clone()]).await;
        let rental = service
            .create_rental(new_rental(vec![line(car.id, 1, "new")]))
            .await
            .unwrap();

        let err = service
            .return_rental(
                rental.id,
                return_request(
                    start() - Duration::minutes(1),
                    vec![report(&rental.items[0], "new", None)],
                ),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidReturnDate(_)));
    }

    #[tokio::test]
    async fn test_return_unknown_rental() {
        let (_, service) = setup(vec![]).await;
        let id = Uuid::new_v4();
        let err = service
            .return_rental(id, return_request(due(), vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RentalNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_invalid_reports_write_nothing() {
        let car = toy("Race car", 2, 15000, 1000, 100000);
        let (store, service) = setup(vec![car.clone()]).await;
        let rental = service
            .create_rental(new_rental(vec![line(car.id, 1, "new")]))
            .await
            .unwrap();
        let writes = store.write_count().await;
        let item = &rental.items[0];

        let stranger = ReturnItemReport {
            rental_item_id: Uuid::new_v4(),
            condition_after: "good".to_string(),
            damage_description: None,
        };
        let err = service
            .return_rental(
                rental.id,
                return_request(due(), vec![report(item, "good", None), stranger]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownRentalItem(_)));

        let err = service
            .return_rental(rental.id, return_request(due(), vec![report(item, "sparkly", None)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCondition(_)));

        let err = service
            .return_rental(rental.id, return_request(due(), vec![report(item, "damaged", Some("  "))]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .return_rental(
                rental.id,
                return_request(due(), vec![report(item, "good", None), report(item, "fair", None)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRentalState(_)));

        assert_eq!(store.write_count().await, writes);
        let stored = store.rental(rental.id).await.unwrap();
        assert_eq!(stored.status, RentalStatus::Pending);
        assert_eq!(stored.items[0].status, RentalItemStatus::Rented);
    }

    #[tokio::test]
    async fn test_failed_settlement_rolls_back_everything() {
        let car = toy("Race car", 2, 15000, 1000, 100000);
        let ball = toy("Ball", 2, 2000, 300, 8000);
        let (store, service) = setup(vec![car.clone(), ball.clone()]).await;
        let rental = service
            .create_rental(new_rental(vec![line(car.id, 1, "new"), line(ball.id, 1, "new")]))
            .await
            .unwrap();
        store.fail_settle_after(Some(1)).await;

        let err = service
            .return_rental(
                rental.id,
                return_request(
                    due(),
                    vec![
                        report(&rental.items[0], "new", None),
                        report(&rental.items[1], "new", None),
                    ],
                ),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        let stored = store.rental(rental.id).await.unwrap();
        assert_eq!(stored.status, RentalStatus::Pending);
        assert!(stored.actual_return_date.is_none());
        assert!(stored.items.iter().all(|i| i.status == RentalItemStatus::Rented));
        assert_eq!(store.toy(car.id).await.unwrap().stock, 1);
        assert_eq!(store.toy(ball.id).await.unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_stock_tracks_items_out() {
        let car = toy("Race car", 5, 15000, 1000, 100000);
        let (store, service) = setup(vec![car.clone()]).await;

        let first = service
            .create_rental(new_rental(vec![line(car.id, 2, "new")]))
            .await
            .unwrap();
        let second = service
            .create_rental(new_rental(vec![line(car.id, 3, "new")]))
            .await
            .unwrap();
        assert_eq!(store.toy(car.id).await.unwrap().stock, 0);

        service
            .return_rental(first.id, return_request(due(), vec![report(&first.items[0], "fair", None)]))
            .await
            .unwrap();
        assert_eq!(store.toy(car.id).await.unwrap().stock, 2);

        service
            .return_rental(second.id, return_request(due(), vec![report(&second.items[0], "lost", None)]))
            .await
            .unwrap();
        assert_eq!(store.toy(car.id).await.unwrap().stock, 2);

        let (rentals, total, _, _) = service.list_rentals(None, None, None).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rentals.len(), 2);
    }
}
