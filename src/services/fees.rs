//! Late and damage fee formulas

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{ItemCondition, RentalItemStatus};

/// Share of the replacement price charged for a damaged toy
fn damaged_rate() -> Decimal {
    Decimal::new(70, 2)
}

/// Share of the replacement price charged per grade lost
fn grade_step_rate() -> Decimal {
    Decimal::new(15, 2)
}

/// Money columns are stored with two decimal places
const MONEY_SCALE: u32 = 2;

/// Round an amount to the stored scale, halves away from zero as `NUMERIC` does
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of late buckets to charge, or `None` when returned on time.
///
/// Any lateness counts as one bucket, plus one per full `bucket_hours`
/// elapsed past the expected return date.
pub fn days_late(
    expected: DateTime<Utc>,
    actual: DateTime<Utc>,
    bucket_hours: i64,
) -> Option<i64> {
    if actual <= expected {
        return None;
    }
    let bucket_seconds = bucket_hours.max(1) * 3600;
    let overdue_seconds = (actual - expected).num_seconds();
    Some(overdue_seconds / bucket_seconds + 1)
}

pub fn late_fee(late_fee_per_day: Decimal, days_late: i64, quantity: i32) -> Decimal {
    late_fee_per_day * Decimal::from(days_late) * Decimal::from(quantity)
}

/// Damage fee, rounded to cents, and final item status for a returned line
pub fn assess_damage(
    before: ItemCondition,
    after: ItemCondition,
    replacement_price: Decimal,
    quantity: i32,
) -> (Decimal, RentalItemStatus) {
    let (fee, status) = raw_damage(before, after, replacement_price, Decimal::from(quantity));
    (round_money(fee), status)
}

fn raw_damage(
    before: ItemCondition,
    after: ItemCondition,
    replacement_price: Decimal,
    quantity: Decimal,
) -> (Decimal, RentalItemStatus) {
    match after {
        ItemCondition::Lost => (replacement_price * quantity, RentalItemStatus::Lost),
        ItemCondition::Damaged => (
            replacement_price * damaged_rate() * quantity,
            RentalItemStatus::Damaged,
        ),
        grade => {
            let before = before.ordinal().unwrap_or(0);
            let after = grade.ordinal().unwrap_or(0);
            let fee = if after < before {
                replacement_price * grade_step_rate() * Decimal::from(before - after) * quantity
            } else {
                Decimal::ZERO
            };
            (fee, RentalItemStatus::Returned)
        }
    }
}
