//! Toy catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::toy::{CreateToy, CreateToyImage, Toy, ToyImage, ToyQuery, UpdateToy},
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List toys with pagination
#[utoipa::path(
    get,
    path = "/toys",
    tag = "toys",
    params(ToyQuery),
    responses(
        (status = 200, description = "List of toys", body = PaginatedResponse<Toy>)
    )
)]
pub async fn list_toys(
    State(state): State<AppState>,
    Query(query): Query<ToyQuery>,
) -> AppResult<Json<PaginatedResponse<Toy>>> {
    let page = state
        .services
        .catalog
        .list_toys(query.page, query.per_page)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Get toy details with categories and images
#[utoipa::path(
    get,
    path = "/toys/{id}",
    tag = "toys",
    params(
        ("id" = Uuid, Path, description = "Toy ID")
    ),
    responses(
        (status = 200, description = "Toy details", body = Toy),
        (status = 404, description = "Toy not found")
    )
)]
pub async fn get_toy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Toy>> {
    let toy = state.services.catalog.get_toy(id).await?;
    Ok(Json(toy))
}

/// Create a toy
#[utoipa::path(
    post,
    path = "/toys",
    tag = "toys",
    security(("bearer_auth" = [])),
    request_body = CreateToy,
    responses(
        (status = 201, description = "Toy created", body = Toy),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_toy(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(toy): Json<CreateToy>,
) -> AppResult<(StatusCode, Json<Toy>)> {
    claims.require_admin()?;

    let created = state.services.catalog.create_toy(toy).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a toy
#[utoipa::path(
    put,
    path = "/toys/{id}",
    tag = "toys",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Toy ID")
    ),
    request_body = UpdateToy,
    responses(
        (status = 200, description = "Toy updated", body = Toy),
        (status = 404, description = "Toy not found")
    )
)]
pub async fn update_toy(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(toy): Json<UpdateToy>,
) -> AppResult<Json<Toy>> {
    claims.require_admin()?;

    let updated = state.services.catalog.update_toy(id, toy).await?;
    Ok(Json(updated))
}

/// Delete a toy that has never been rented
#[utoipa::path(
    delete,
    path = "/toys/{id}",
    tag = "toys",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Toy ID")
    ),
    responses(
        (status = 204, description = "Toy deleted"),
        (status = 404, description = "Toy not found"),
        (status = 409, description = "Toy has rental history")
    )
)]
pub async fn delete_toy(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_toy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach an image URL to a toy
#[utoipa::path(
    post,
    path = "/toys/{id}/images",
    tag = "toys",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Toy ID")
    ),
    request_body = CreateToyImage,
    responses(
        (status = 201, description = "Image attached", body = ToyImage),
        (status = 404, description = "Toy not found")
    )
)]
pub async fn add_image(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(image): Json<CreateToyImage>,
) -> AppResult<(StatusCode, Json<ToyImage>)> {
    claims.require_admin()?;

    let created = state.services.catalog.add_toy_image(id, image).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Remove an image from a toy
#[utoipa::path(
    delete,
    path = "/toys/{id}/images/{image_id}",
    tag = "toys",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Toy ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn delete_image(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_toy_image(id, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
