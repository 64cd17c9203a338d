//! Business logic services

pub mod catalog;
pub mod fees;
pub mod rentals;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub rentals: rentals::RentalsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), config.rentals.clone()),
            users: users::UsersService::new(
                repository.clone(),
                config.auth.clone(),
                config.rentals.clone(),
            ),
            rentals: rentals::RentalsService::new(
                Arc::new(repository.toys.clone()),
                Arc::new(repository.rentals.clone()),
                config.rentals.clone(),
            ),
            repository,
        }
    }
}
