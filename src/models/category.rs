//! Toy category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create category request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 3, max = 25, message = "Category name must be between 3 and 25 characters"))]
    pub name: String,
    #[validate(length(min = 10, max = 5000, message = "Description must be between 10 and 5000 characters"))]
    pub description: Option<String>,
}

/// Update category request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 3, max = 25, message = "Category name must be between 3 and 25 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 10, max = 5000, message = "Description must be between 10 and 5000 characters"))]
    pub description: Option<String>,
}
