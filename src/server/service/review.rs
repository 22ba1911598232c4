use sea_orm::DatabaseConnection;

use crate::server::{
    data::{order::OrderRepository, product::ProductRepository, review::ReviewRepository},
    error::AppError,
    model::{
        order::OrderStatus,
        review::{Review, UpsertReviewParams},
    },
    util::pagination::{Page, PaginationParams},
};

pub const MAX_REVIEW_LENGTH: usize = 2000;

pub struct ReviewService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReviewService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates or replaces the user's review of a product bought in an order.
    ///
    /// # Returns
    /// - `Err(AppError::NotFound)` - Order not the user's
    /// - `Err(AppError::BadRequest)` - Rating out of range, order not completed,
    ///   or the product is not part of the order
    pub async fn upsert(&self, mut params: UpsertReviewParams) -> Result<Review, AppError> {
        if !(1..=5).contains(&params.rating) {
            return Err(AppError::BadRequest("Rating must be between 1 and 5".to_string()));
        }
        params.content = params.content.trim().to_string();
        if params.content.chars().count() > MAX_REVIEW_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Review must be at most {} characters",
                MAX_REVIEW_LENGTH
            )));
        }

        let order = OrderRepository::new(self.db)
            .find_by_id(params.order_id)
            .await?
            .filter(|o| o.user_id == params.user_id)
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.status != OrderStatus::Completed {
            return Err(AppError::BadRequest(
                "Only completed orders can be reviewed".to_string(),
            ));
        }
        if !order.items.iter().any(|i| i.product_id == params.product_id) {
            return Err(AppError::BadRequest(
                "Product is not part of this order".to_string(),
            ));
        }

        Ok(ReviewRepository::new(self.db).upsert(params).await?)
    }

    pub async fn list_for_product(
        &self,
        product_id: i32,
        pagination: PaginationParams,
    ) -> Result<Page<Review>, AppError> {
        if ProductRepository::new(self.db)
            .find_by_id(product_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        let pagination = pagination.clamped();
        let (reviews, total) = ReviewRepository::new(self.db)
            .list_by_product(product_id, pagination.page, pagination.per_page)
            .await?;

        Ok(Page::new(reviews, total, pagination))
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> Result<(), AppError> {
        if !ReviewRepository::new(self.db).delete(id, user_id).await? {
            return Err(AppError::NotFound("Review not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    fn review(user_id: i32, order_id: i32, product_id: i32, rating: i32) -> UpsertReviewParams {
        UpsertReviewParams {
            user_id,
            order_id,
            product_id,
            rating,
            content: " Tasty ".to_string(),
        }
    }

    /// Tests reviewing a product from a completed order twice.
    ///
    /// Expected: second call updates the same review and the product summary
    /// reflects it
    #[tokio::test]
    async fn upserts_reviews() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let customer = factory::create_user(db).await.unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let address = factory::create_address(db, customer.id).await.unwrap();
        let product = factory::create_product(db, shop.id).await.unwrap();
        let order = factory::order::OrderFactory::new(db, customer.id, shop.id, address.id)
            .item(&product, 1)
            .status("COMPLETED")
            .build()
            .await
            .unwrap();
        let service = ReviewService::new(db);

        let first = service
            .upsert(review(customer.id, order.id, product.id, 4))
            .await
            .unwrap();
        assert_eq!(first.content, "Tasty");

        let second = service
            .upsert(review(customer.id, order.id, product.id, 2))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);

        let summaries = ProductRepository::new(db)
            .rating_summaries(vec![product.id])
            .await
            .unwrap();
        assert_eq!(summaries[&product.id].count, 1);
    }

    /// Tests review preconditions.
    ///
    /// Expected: 400 for a pending order, a product outside the order and a
    /// rating of 6; 404 for another customer's order
    #[tokio::test]
    async fn rejects_ineligible_reviews() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let (customer, shop, _, product, pending) =
            factory::helpers::create_order_with_dependencies(db).await.unwrap();
        let other_product = factory::create_product(db, shop.id).await.unwrap();
        let stranger = factory::create_user(db).await.unwrap();
        let service = ReviewService::new(db);

        assert!(matches!(
            service.upsert(review(customer.id, pending.id, product.id, 5)).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.upsert(review(customer.id, pending.id, product.id, 6)).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.upsert(review(stranger.id, pending.id, product.id, 5)).await,
            Err(AppError::NotFound(_))
        ));

        OrderRepository::new(db)
            .update_status(pending.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert!(matches!(
            service
                .upsert(review(customer.id, pending.id, other_product.id, 5))
                .await,
            Err(AppError::BadRequest(_))
        ));
    }
}
