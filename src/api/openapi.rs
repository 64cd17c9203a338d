//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, categories, health, rentals, toys, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Toyrent API",
        version = "1.0.0",
        description = "Toy rental management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::get_user,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Toys
        toys::list_toys,
        toys::get_toy,
        toys::create_toy,
        toys::update_toy,
        toys::delete_toy,
        toys::add_image,
        toys::delete_image,
        // Rentals
        rentals::create_rental,
        rentals::list_rentals,
        rentals::my_rentals,
        rentals::get_rental,
        rentals::return_rental,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::RegisterUser,
            crate::models::enums::UserRole,
            // Catalog
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            crate::models::toy::Toy,
            crate::models::toy::ToyImage,
            crate::models::toy::CreateToy,
            crate::models::toy::UpdateToy,
            crate::models::toy::CreateToyImage,
            crate::models::enums::ItemCondition,
            // Rentals
            rentals::CreateRentalRequest,
            crate::models::rental::Rental,
            crate::models::rental::RentalItem,
            crate::models::rental::RentalDetails,
            crate::models::rental::NewRentalItem,
            crate::models::rental::ReturnRental,
            crate::models::rental::ReturnItemReport,
            crate::models::enums::RentalStatus,
            crate::models::enums::RentalItemStatus,
            crate::models::enums::PaymentStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User accounts"),
        (name = "categories", description = "Toy categories"),
        (name = "toys", description = "Toy catalog"),
        (name = "rentals", description = "Rentals and returns")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
