//! Toy catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::category::Category;
use super::enums::ItemCondition;

/// Toy record with its loaded categories and images
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Toy {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Recommended age range, e.g. "3-5" or "5+"
    pub age_recommendation: Option<String>,
    pub condition: ItemCondition,
    /// Price per unit for one rental period
    #[schema(value_type = String)]
    pub rental_price: Decimal,
    #[schema(value_type = String)]
    pub late_fee_per_day: Decimal,
    /// Basis for damage and loss fees
    #[schema(value_type = String)]
    pub replacement_price: Decimal,
    pub is_available: bool,
    /// Units currently on the shelf
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub categories: Vec<Category>,
    #[sqlx(skip)]
    #[serde(default)]
    pub images: Vec<ToyImage>,
}

/// Image attached to a toy
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ToyImage {
    pub id: Uuid,
    pub toy_id: Uuid,
    pub image_url: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Toy list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ToyQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create toy request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateToy {
    #[validate(length(min = 3, max = 255, message = "Name must be between 3 and 255 characters"))]
    pub name: String,
    #[validate(length(min = 10, max = 5000, message = "Description must be between 10 and 5000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "Age recommendation is too long"))]
    pub age_recommendation: Option<String>,
    pub condition: ItemCondition,
    #[schema(value_type = String)]
    pub rental_price: Decimal,
    #[schema(value_type = String)]
    pub late_fee_per_day: Decimal,
    #[schema(value_type = String)]
    pub replacement_price: Decimal,
    pub is_available: Option<bool>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    #[validate(length(min = 1, message = "At least one category is required"))]
    pub category_ids: Vec<Uuid>,
}

/// Update toy request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateToy {
    #[validate(length(min = 3, max = 255, message = "Name must be between 3 and 255 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 10, max = 5000, message = "Description must be between 10 and 5000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "Age recommendation is too long"))]
    pub age_recommendation: Option<String>,
    pub condition: Option<ItemCondition>,
    #[schema(value_type = Option<String>)]
    pub rental_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub late_fee_per_day: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub replacement_price: Option<Decimal>,
    pub is_available: Option<bool>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub category_ids: Option<Vec<Uuid>>,
}

/// Attach image request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateToyImage {
    #[validate(url(message = "Invalid image URL"), length(max = 255))]
    pub image_url: String,
    pub is_primary: Option<bool>,
}

/// Checks shared by create and update: prices non-negative, condition a grade
pub fn check_toy_values(
    condition: Option<ItemCondition>,
    prices: &[Option<Decimal>],
) -> Result<(), String> {
    if let Some(condition) = condition {
        if !condition.is_grade() {
            return Err(format!("Toy condition cannot be {}", condition));
        }
    }
    if prices.iter().flatten().any(|price| price.is_sign_negative()) {
        return Err("Prices cannot be negative".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_toy_values() {
        assert!(check_toy_values(Some(ItemCondition::Good), &[Some(Decimal::ONE)]).is_ok());
        assert!(check_toy_values(Some(ItemCondition::Lost), &[]).is_err());
        assert!(check_toy_values(None, &[None, Some(Decimal::NEGATIVE_ONE)]).is_err());
    }
}
