//! Rental endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::rental::{NewRental, NewRentalItem, RentalDetails, RentalQuery, ReturnRental},
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Create rental request
#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateRentalRequest {
    /// Renter; defaults to the caller. Only administrators may rent for someone else.
    pub user_id: Option<Uuid>,
    /// Start of the rental; defaults to now
    pub rental_date: Option<DateTime<Utc>>,
    pub expected_return_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<NewRentalItem>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

/// Rent one or more toys
#[utoipa::path(
    post,
    path = "/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    request_body = CreateRentalRequest,
    responses(
        (status = 201, description = "Rental created", body = RentalDetails),
        (status = 400, description = "Invalid dates or condition"),
        (status = 404, description = "Toy not found"),
        (status = 409, description = "Insufficient stock")
    )
)]
pub async fn create_rental(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateRentalRequest>,
) -> AppResult<(StatusCode, Json<RentalDetails>)> {
    request.validate()?;

    let user_id = request.user_id.unwrap_or(claims.user_id);
    claims.require_self_or_admin(user_id)?;

    let rental = state
        .services
        .rentals
        .create_rental(NewRental {
            user_id,
            rental_date: request.rental_date.unwrap_or_else(Utc::now),
            expected_return_date: request.expected_return_date,
            items: request.items,
            notes: request.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(rental.into())))
}

/// List all rentals
#[utoipa::path(
    get,
    path = "/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(RentalQuery),
    responses(
        (status = 200, description = "Rentals, newest first", body = PaginatedResponse<RentalDetails>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_rentals(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RentalQuery>,
) -> AppResult<Json<PaginatedResponse<RentalDetails>>> {
    claims.require_admin()?;

    let page = state
        .services
        .rentals
        .list_rentals(None, query.page, query.per_page)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

/// List the caller's rentals
#[utoipa::path(
    get,
    path = "/rentals/mine",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(RentalQuery),
    responses(
        (status = 200, description = "Caller's rentals, newest first", body = PaginatedResponse<RentalDetails>)
    )
)]
pub async fn my_rentals(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RentalQuery>,
) -> AppResult<Json<PaginatedResponse<RentalDetails>>> {
    let page = state
        .services
        .rentals
        .list_rentals(Some(claims.user_id), query.page, query.per_page)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Get a rental with its items
#[utoipa::path(
    get,
    path = "/rentals/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Rental ID")
    ),
    responses(
        (status = 200, description = "Rental details", body = RentalDetails),
        (status = 403, description = "Not the renter"),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn get_rental(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RentalDetails>> {
    let rental = state.services.rentals.get_rental(id).await?;
    claims.require_self_or_admin(rental.user_id)?;
    Ok(Json(rental.into()))
}

/// Process the return of a rental
#[utoipa::path(
    post,
    path = "/rentals/{id}/return",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Rental ID")
    ),
    request_body = ReturnRental,
    responses(
        (status = 200, description = "Return settled", body = RentalDetails),
        (status = 400, description = "Invalid return date or condition"),
        (status = 404, description = "Rental not found"),
        (status = 409, description = "Rental already closed"),
        (status = 422, description = "Unknown rental item")
    )
)]
pub async fn return_rental(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReturnRental>,
) -> AppResult<Json<RentalDetails>> {
    claims.require_admin()?;
    request.validate()?;

    let rental = state.services.rentals.return_rental(id, request).await?;
    Ok(Json(rental.into()))
}
