//! Toyrent toy rental server
//!
//! REST JSON API for a toy rental shop: customer accounts, a toy catalog with
//! categories and images, and the rental lifecycle from checkout to the
//! settlement of late and damage fees on return.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
