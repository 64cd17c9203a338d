//! Catalog management service: toys, categories and toy images

use uuid::Uuid;
use validator::Validate;

use crate::{
    config::RentalConfig,
    error::{AppError, AppResult},
    models::{
        category::{Category, CreateCategory, UpdateCategory},
        toy::{check_toy_values, CreateToy, CreateToyImage, Toy, ToyImage, UpdateToy},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: RentalConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: RentalConfig) -> Self {
        Self { repository, config }
    }

    /// List toys, returning (toys, total, page, per_page)
    pub async fn list_toys(
        &self,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<(Vec<Toy>, i64, i64, i64)> {
        let (page, per_page, offset) = self.config.page_bounds(page, per_page);
        let (toys, total) = self.repository.toys.list(per_page, offset).await?;
        Ok((toys, total, page, per_page))
    }

    pub async fn get_toy(&self, id: Uuid) -> AppResult<Toy> {
        self.repository.toys.get(id).await
    }

    pub async fn create_toy(&self, data: CreateToy) -> AppResult<Toy> {
        data.validate()?;
        check_toy_values(
            Some(data.condition),
            &[
                Some(data.rental_price),
                Some(data.late_fee_per_day),
                Some(data.replacement_price),
            ],
        )
        .map_err(AppError::Validation)?;

        let toy = self.repository.toys.create(&data).await?;
        tracing::info!("Toy created: {} ({})", toy.name, toy.id);
        Ok(toy)
    }

    pub async fn update_toy(&self, id: Uuid, data: UpdateToy) -> AppResult<Toy> {
        data.validate()?;
        check_toy_values(
            data.condition,
            &[data.rental_price, data.late_fee_per_day, data.replacement_price],
        )
        .map_err(AppError::Validation)?;
        if matches!(&data.category_ids, Some(ids) if ids.is_empty()) {
            return Err(AppError::Validation(
                "At least one category is required".to_string(),
            ));
        }

        self.repository.toys.update(id, &data).await
    }

    pub async fn delete_toy(&self, id: Uuid) -> AppResult<()> {
        self.repository.toys.delete(id).await?;
        tracing::info!("Toy deleted: {}", id);
        Ok(())
    }

    pub async fn add_toy_image(&self, toy_id: Uuid, data: CreateToyImage) -> AppResult<ToyImage> {
        data.validate()?;
        self.repository.toys.add_image(toy_id, &data).await
    }

    pub async fn delete_toy_image(&self, toy_id: Uuid, image_id: Uuid) -> AppResult<()> {
        self.repository.toys.delete_image(toy_id, image_id).await
    }

    /// List categories, returning (categories, total, page, per_page)
    pub async fn list_categories(
        &self,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<(Vec<Category>, i64, i64, i64)> {
        let (page, per_page, offset) = self.config.page_bounds(page, per_page);
        let (categories, total) = self
            .repository
            .categories
            .crud
            .find_all(per_page, offset)
            .await?;
        Ok((categories, total, page, per_page))
    }

    pub async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        self.repository.categories.crud.get_by_id(id).await
    }

    pub async fn create_category(&self, data: CreateCategory) -> AppResult<Category> {
        data.validate()?;
        self.repository.categories.create(&data).await
    }

    pub async fn update_category(&self, id: Uuid, data: UpdateCategory) -> AppResult<Category> {
        data.validate()?;
        self.repository.categories.update(id, &data).await
    }

    pub async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        self.repository.categories.crud.delete_by_id(id).await
    }
}
