//! Rental and rental item models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{ItemCondition, PaymentStatus, RentalItemStatus, RentalStatus};
use crate::error::{AppError, AppResult};

/// Rental aggregate: the rental row plus its items in insertion order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rental {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: RentalStatus,
    pub rental_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub actual_return_date: Option<DateTime<Utc>>,
    /// Sum of item subtotals, fixed at creation
    #[schema(value_type = String)]
    pub total_rental_price: Decimal,
    #[schema(value_type = String)]
    pub late_fee: Decimal,
    #[schema(value_type = String)]
    pub damage_fee: Decimal,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub items: Vec<RentalItem>,
}

impl Rental {
    /// Amount owed: rental price plus both fees. Never stored.
    pub fn total_amount(&self) -> Decimal {
        self.total_rental_price + self.late_fee + self.damage_fee
    }

    /// Date invariants every persisted rental satisfies
    pub fn check_dates(&self) -> AppResult<()> {
        if self.expected_return_date <= self.rental_date {
            return Err(AppError::InvalidReturnDate(
                "expected return date must be after the rental date".to_string(),
            ));
        }
        if let Some(actual) = self.actual_return_date {
            if actual < self.rental_date {
                return Err(AppError::InvalidReturnDate(
                    "actual return date cannot be before the rental date".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// A rental is settled once a return has been processed
    pub fn is_settled(&self) -> bool {
        self.actual_return_date.is_some()
    }
}

/// One toy line of a rental
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RentalItem {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub toy_id: Uuid,
    pub quantity: i32,
    /// Toy rental price at creation time
    #[schema(value_type = String)]
    pub price_per_unit: Decimal,
    pub condition_before: ItemCondition,
    /// Mirrors `condition_before` until the item is returned
    pub condition_after: ItemCondition,
    pub damage_description: Option<String>,
    #[schema(value_type = String)]
    pub damage_fee: Decimal,
    pub status: RentalItemStatus,
}

impl RentalItem {
    pub fn subtotal(&self) -> Decimal {
        self.price_per_unit * Decimal::from(self.quantity)
    }
}

/// Rental as returned by the API, with the derived total
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RentalDetails {
    #[serde(flatten)]
    pub rental: Rental,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
}

impl From<Rental> for RentalDetails {
    fn from(rental: Rental) -> Self {
        let total_amount = rental.total_amount();
        Self {
            rental,
            total_amount,
        }
    }
}

/// Rental list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RentalQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Input of rental creation
#[derive(Debug, Clone)]
pub struct NewRental {
    pub user_id: Uuid,
    pub rental_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub items: Vec<NewRentalItem>,
    pub notes: Option<String>,
}

/// Requested toy line
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewRentalItem {
    pub toy_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// One of new, excellent, good, fair, poor
    pub condition_before: String,
}

/// Return request: one report per returned item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReturnRental {
    pub actual_return_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "At least one item report is required"))]
    pub items: Vec<ReturnItemReport>,
    pub notes: Option<String>,
}

/// Post-return condition of a single rental item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReturnItemReport {
    pub rental_item_id: Uuid,
    /// One of new, excellent, good, fair, poor, damaged, lost
    pub condition_after: String,
    pub damage_description: Option<String>,
}

/// Computed outcome of a return, applied by the store as one unit of work
#[derive(Debug, Clone)]
pub struct ReturnSettlement {
    pub rental_id: Uuid,
    pub status: RentalStatus,
    pub actual_return_date: DateTime<Utc>,
    pub late_fee: Decimal,
    pub damage_fee: Decimal,
    /// Replaces the rental notes when present
    pub notes: Option<String>,
    pub items: Vec<SettledItem>,
}

#[derive(Debug, Clone)]
pub struct SettledItem {
    pub item_id: Uuid,
    pub toy_id: Uuid,
    pub quantity: i32,
    pub condition_after: ItemCondition,
    pub damage_description: Option<String>,
    pub damage_fee: Decimal,
    pub status: RentalItemStatus,
}

impl SettledItem {
    /// Only intact returns go back on the shelf
    pub fn restocks(&self) -> bool {
        self.status == RentalItemStatus::Returned
    }
}

impl ReturnSettlement {
    /// Apply the settlement to an in-memory rental
    pub fn apply_to(&self, rental: &mut Rental) {
        rental.status = self.status;
        rental.actual_return_date = Some(self.actual_return_date);
        rental.late_fee = self.late_fee;
        rental.damage_fee = self.damage_fee;
        if let Some(notes) = &self.notes {
            rental.notes = Some(notes.clone());
        }
        for settled in &self.items {
            if let Some(item) = rental.items.iter_mut().find(|i| i.id == settled.item_id) {
                item.condition_after = settled.condition_after;
                item.damage_description = settled.damage_description.clone();
                item.damage_fee = settled.damage_fee;
                item.status = settled.status;
            }
        }
    }
}
