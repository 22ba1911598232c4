//! Categories and products.

use sea_orm::DatabaseConnection;
use std::path::Path;

use crate::server::{
    data::{category::CategoryRepository, product::ProductRepository},
    error::AppError,
    model::catalog::{Category, CreateProductParams, Product, UpdateProductParams},
    service::storage::StorageService,
    util::pagination::{Page, PaginationParams},
};

pub struct CatalogService<'a> {
    db: &'a DatabaseConnection,
    storage: StorageService<'a>,
}

impl<'a> CatalogService<'a> {
    pub fn new(db: &'a DatabaseConnection, upload_dir: &'a Path) -> Self {
        Self {
            db,
            storage: StorageService::new(upload_dir),
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(CategoryRepository::new(self.db).list().await?)
    }

    /// Creates a category with a unique, non-empty name.
    pub async fn create_category(&self, name: String) -> Result<Category, AppError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Category name cannot be empty".to_string(),
            ));
        }

        let repo = CategoryRepository::new(self.db);
        if repo.name_exists(&name).await? {
            return Err(AppError::Conflict(format!(
                "Category '{}' already exists",
                name
            )));
        }

        Ok(repo.create(name).await?)
    }

    pub async fn create_product(&self, mut params: CreateProductParams) -> Result<Product, AppError> {
        params.name = params.name.trim().to_string();
        validate_product(Some(&params.name), Some(params.price), Some(params.quantity))?;
        self.check_category(params.category_id).await?;

        params.image_url = self.storage.commit_optional(params.image_url).await?;

        let product = ProductRepository::new(self.db).create(params).await?;
        tracing::info!("Shop {} created product {}", product.shop_id, product.id);

        Ok(product)
    }

    pub async fn update_product(&self, mut params: UpdateProductParams) -> Result<Product, AppError> {
        params.name = params.name.map(|n| n.trim().to_string());
        validate_product(params.name.as_deref(), params.price, params.quantity)?;
        self.check_category(params.category_id).await?;

        params.image_url = self.storage.commit_optional(params.image_url).await?;

        ProductRepository::new(self.db)
            .update(params)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn delete_product(&self, id: i32, shop_id: i32) -> Result<(), AppError> {
        let deleted = ProductRepository::new(self.db)
            .delete(id, shop_id)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to delete product {}: {}", id, e);
                AppError::Conflict("Product is referenced by existing orders".to_string())
            })?;

        if !deleted {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        Ok(())
    }

    pub async fn get_product(&self, id: i32) -> Result<Product, AppError> {
        ProductRepository::new(self.db)
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn list_by_shop(
        &self,
        shop_id: i32,
        pagination: PaginationParams,
    ) -> Result<Page<Product>, AppError> {
        let pagination = pagination.clamped();
        let (products, total) = ProductRepository::new(self.db)
            .list_by_shop(shop_id, pagination.page, pagination.per_page)
            .await?;

        Ok(Page::new(products, total, pagination))
    }

    /// Searches products by name, optionally within a category.
    pub async fn search(
        &self,
        q: Option<String>,
        category_id: Option<i32>,
        pagination: PaginationParams,
    ) -> Result<Page<Product>, AppError> {
        let pagination = pagination.clamped();
        let q = q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty());

        let (products, total) = ProductRepository::new(self.db)
            .search(q.as_deref(), category_id, pagination.page, pagination.per_page)
            .await?;

        Ok(Page::new(products, total, pagination))
    }

    async fn check_category(&self, category_id: Option<i32>) -> Result<(), AppError> {
        if let Some(category_id) = category_id {
            if !CategoryRepository::new(self.db).exists(category_id).await? {
                return Err(AppError::BadRequest(format!(
                    "Category {} does not exist",
                    category_id
                )));
            }
        }
        Ok(())
    }
}

fn validate_product(name: Option<&str>, price: Option<i64>, quantity: Option<i32>) -> Result<(), AppError> {
    if name.is_some_and(str::is_empty) {
        return Err(AppError::BadRequest("Product name cannot be empty".to_string()));
    }
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("Price cannot be negative".to_string()));
    }
    if quantity.is_some_and(|q| q < 0) {
        return Err(AppError::BadRequest("Quantity cannot be negative".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    fn params(shop_id: i32) -> CreateProductParams {
        CreateProductParams {
            shop_id,
            category_id: None,
            name: "  Banh mi ".to_string(),
            description: None,
            price: 25_000,
            quantity: 10,
            image_url: None,
        }
    }

    /// Tests product creation with a trimmed name.
    ///
    /// Expected: product stored with zero rating summary
    #[tokio::test]
    async fn creates_product() {
        let test = TestBuilder::new().with_catalog_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let shop = factory::create_shop(db).await.unwrap();

        let product = CatalogService::new(db, dir.path())
            .create_product(params(shop.id))
            .await
            .unwrap();

        assert_eq!(product.name, "Banh mi");
        assert_eq!(product.rating.count, 0);
    }

    /// Tests product validation.
    ///
    /// Expected: BadRequest for negative price, negative stock and unknown category
    #[tokio::test]
    async fn rejects_invalid_products() {
        let test = TestBuilder::new().with_catalog_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let service = CatalogService::new(db, dir.path());

        let mut p = params(shop.id);
        p.price = -1;
        assert!(matches!(service.create_product(p).await, Err(AppError::BadRequest(_))));

        let mut p = params(shop.id);
        p.quantity = -1;
        assert!(matches!(service.create_product(p).await, Err(AppError::BadRequest(_))));

        let mut p = params(shop.id);
        p.category_id = Some(999);
        assert!(matches!(service.create_product(p).await, Err(AppError::BadRequest(_))));
    }

    /// Tests that shops can only modify their own products.
    ///
    /// Expected: NotFound for another shop's product
    #[tokio::test]
    async fn scopes_updates_to_owner() {
        let test = TestBuilder::new().with_catalog_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let owner = factory::create_shop(db).await.unwrap();
        let other = factory::create_shop(db).await.unwrap();
        let product = factory::create_product(db, owner.id).await.unwrap();
        let service = CatalogService::new(db, dir.path());

        let result = service
            .update_product(UpdateProductParams {
                id: product.id,
                shop_id: other.id,
                price: Some(1),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = service.delete_product(product.id, other.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let updated = service
            .update_product(UpdateProductParams {
                id: product.id,
                shop_id: owner.id,
                price: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.price, 1);
    }

    /// Tests category name uniqueness.
    ///
    /// Expected: Conflict on the second create
    #[tokio::test]
    async fn rejects_duplicate_category() {
        let test = TestBuilder::new().with_catalog_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let service = CatalogService::new(db, dir.path());

        service.create_category("Noodles".to_string()).await.unwrap();
        let result = service.create_category(" Noodles ".to_string()).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(service.list_categories().await.unwrap().len(), 1);
    }
}
