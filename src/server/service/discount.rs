//! Shop discounts and customer vouchers.
//!
//! Eligibility and amounts are computed by [`Discount::evaluate`]; redemption
//! happens during checkout in the order service.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{discount::DiscountRepository, product::ProductRepository, voucher::VoucherRepository},
    error::AppError,
    model::discount::{
        CreateDiscountParams, Discount, DiscountKind, UpdateDiscountParams, Voucher,
    },
};

/// The terms of a discount that must hold together after any change.
struct Terms {
    kind: DiscountKind,
    value: i64,
    max_discount_amount: Option<i64>,
    min_order_total: i64,
    max_uses: Option<i32>,
    max_uses_per_user: i32,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl Terms {
    fn validate(&self) -> Result<(), AppError> {
        match self.kind {
            DiscountKind::Percentage if !(1..=100).contains(&self.value) => {
                return Err(AppError::BadRequest(
                    "Percentage discounts must be between 1 and 100".to_string(),
                ));
            }
            DiscountKind::Fixed if self.value <= 0 => {
                return Err(AppError::BadRequest(
                    "Fixed discounts must be greater than 0".to_string(),
                ));
            }
            _ => {}
        }

        if self.max_discount_amount.is_some_and(|m| m <= 0) {
            return Err(AppError::BadRequest(
                "Maximum discount amount must be greater than 0".to_string(),
            ));
        }
        if self.min_order_total < 0 {
            return Err(AppError::BadRequest(
                "Minimum order total cannot be negative".to_string(),
            ));
        }
        if self.max_uses.is_some_and(|m| m < 1) || self.max_uses_per_user < 1 {
            return Err(AppError::BadRequest(
                "Usage limits must be at least 1".to_string(),
            ));
        }
        if self.ends_at <= self.starts_at {
            return Err(AppError::BadRequest(
                "Discount must end after it starts".to_string(),
            ));
        }

        Ok(())
    }
}

pub struct DiscountService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DiscountService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, mut params: CreateDiscountParams) -> Result<Discount, AppError> {
        if params.code.is_empty() {
            return Err(AppError::BadRequest("Discount code is required".to_string()));
        }

        Terms {
            kind: params.kind,
            value: params.value,
            max_discount_amount: params.max_discount_amount,
            min_order_total: params.min_order_total,
            max_uses: params.max_uses,
            max_uses_per_user: params.max_uses_per_user,
            starts_at: params.starts_at,
            ends_at: params.ends_at,
        }
        .validate()?;

        let repo = DiscountRepository::new(self.db);
        if repo.code_exists(params.shop_id, &params.code, None).await? {
            return Err(AppError::Conflict(format!(
                "Discount code {} already exists",
                params.code
            )));
        }

        params.product_ids = self.check_products(params.shop_id, params.product_ids).await?;

        let discount = repo.create(params).await?;
        tracing::info!("Shop {} created discount {}", discount.shop_id, discount.code);

        Ok(discount)
    }

    /// Applies changes and re-validates the resulting terms.
    pub async fn update(
        &self,
        id: i32,
        shop_id: i32,
        mut params: UpdateDiscountParams,
    ) -> Result<Discount, AppError> {
        let repo = DiscountRepository::new(self.db);
        let current = repo
            .find_by_id(id)
            .await?
            .filter(|d| d.shop_id == shop_id)
            .ok_or_else(|| AppError::NotFound("Discount not found".to_string()))?;

        Terms {
            kind: current.kind,
            value: params.value.unwrap_or(current.value),
            max_discount_amount: params.max_discount_amount.or(current.max_discount_amount),
            min_order_total: params.min_order_total.unwrap_or(current.min_order_total),
            max_uses: params.max_uses.or(current.max_uses),
            max_uses_per_user: params.max_uses_per_user.unwrap_or(current.max_uses_per_user),
            starts_at: params.starts_at.unwrap_or(current.starts_at),
            ends_at: params.ends_at.unwrap_or(current.ends_at),
        }
        .validate()?;

        if let Some(product_ids) = params.product_ids.take() {
            params.product_ids = Some(self.check_products(shop_id, product_ids).await?);
        }

        repo.update(id, shop_id, params)
            .await?
            .ok_or_else(|| AppError::NotFound("Discount not found".to_string()))
    }

    pub async fn delete(&self, id: i32, shop_id: i32) -> Result<(), AppError> {
        let deleted = DiscountRepository::new(self.db)
            .delete(id, shop_id)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to delete discount {}: {}", id, e);
                AppError::Conflict(
                    "Discount has been used by orders; deactivate it instead".to_string(),
                )
            })?;

        if !deleted {
            return Err(AppError::NotFound("Discount not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_own(&self, shop_id: i32) -> Result<Vec<Discount>, AppError> {
        Ok(DiscountRepository::new(self.db).list_by_shop(shop_id).await?)
    }

    /// Active, in-window discounts a shop currently offers.
    pub async fn list_for_shop(&self, shop_id: i32) -> Result<Vec<Discount>, AppError> {
        Ok(DiscountRepository::new(self.db)
            .list_live_by_shop(shop_id, Utc::now())
            .await?)
    }

    /// Saves a discount to the customer's vouchers; saving twice is a no-op.
    pub async fn save_voucher(&self, user_id: i32, discount_id: i32) -> Result<Voucher, AppError> {
        let discount = DiscountRepository::new(self.db)
            .find_by_id(discount_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Discount not found".to_string()))?;

        if !discount.active || discount.ends_at < Utc::now() {
            return Err(AppError::BadRequest(format!(
                "Discount {} is no longer available",
                discount.code
            )));
        }

        Ok(VoucherRepository::new(self.db).save(user_id, discount).await?)
    }

    pub async fn list_vouchers(&self, user_id: i32) -> Result<Vec<Voucher>, AppError> {
        Ok(VoucherRepository::new(self.db).list(user_id).await?)
    }

    pub async fn remove_voucher(&self, user_id: i32, voucher_id: i32) -> Result<(), AppError> {
        if !VoucherRepository::new(self.db)
            .remove(voucher_id, user_id)
            .await?
        {
            return Err(AppError::NotFound("Voucher not found".to_string()));
        }
        Ok(())
    }

    async fn check_products(&self, shop_id: i32, mut product_ids: Vec<i32>) -> Result<Vec<i32>, AppError> {
        product_ids.sort_unstable();
        product_ids.dedup();

        let owned = ProductRepository::new(self.db)
            .owned_ids(shop_id, product_ids.clone())
            .await?;
        if owned.len() != product_ids.len() {
            return Err(AppError::BadRequest(
                "Discounts can only target your own products".to_string(),
            ));
        }

        Ok(product_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_utils::{builder::TestBuilder, factory};

    fn params(shop_id: i32, kind: DiscountKind, value: i64) -> CreateDiscountParams {
        let now = Utc::now();
        CreateDiscountParams {
            shop_id,
            code: "WELCOME".to_string(),
            description: None,
            kind,
            value,
            max_discount_amount: None,
            min_order_total: 0,
            max_uses: None,
            max_uses_per_user: 1,
            starts_at: now - Duration::hours(1),
            ends_at: now + Duration::days(7),
            product_ids: vec![],
        }
    }

    /// Tests the value rules per discount kind.
    ///
    /// Expected: BadRequest for 0%, 101% and a zero fixed amount
    #[tokio::test]
    async fn validates_values() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let service = DiscountService::new(db);

        for (kind, value) in [
            (DiscountKind::Percentage, 0),
            (DiscountKind::Percentage, 101),
            (DiscountKind::Fixed, 0),
        ] {
            let result = service.create(params(shop.id, kind, value)).await;
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }

        assert!(service
            .create(params(shop.id, DiscountKind::Percentage, 100))
            .await
            .is_ok());
    }

    /// Tests the validity window rule.
    ///
    /// Expected: BadRequest when ends_at is not after starts_at
    #[tokio::test]
    async fn requires_window_to_end_after_start() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let shop = factory::create_shop(db).await.unwrap();

        let mut p = params(shop.id, DiscountKind::Fixed, 10_000);
        p.ends_at = p.starts_at;

        let result = DiscountService::new(db).create(p).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    /// Tests code uniqueness per shop.
    ///
    /// Expected: Conflict within one shop, allowed for another shop
    #[tokio::test]
    async fn codes_are_unique_per_shop() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let other = factory::create_shop(db).await.unwrap();
        let service = DiscountService::new(db);

        service
            .create(params(shop.id, DiscountKind::Fixed, 5_000))
            .await
            .unwrap();
        assert!(matches!(
            service.create(params(shop.id, DiscountKind::Fixed, 5_000)).await,
            Err(AppError::Conflict(_))
        ));
        assert!(service
            .create(params(other.id, DiscountKind::Fixed, 5_000))
            .await
            .is_ok());
    }

    /// Tests that updates are validated against the merged terms.
    ///
    /// Expected: BadRequest when a new end date precedes the stored start
    #[tokio::test]
    async fn validates_merged_terms_on_update() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let service = DiscountService::new(db);

        let discount = service
            .create(params(shop.id, DiscountKind::Percentage, 10))
            .await
            .unwrap();

        let result = service
            .update(
                discount.id,
                shop.id,
                UpdateDiscountParams {
                    ends_at: Some(discount.starts_at - Duration::days(1)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let updated = service
            .update(
                discount.id,
                shop.id,
                UpdateDiscountParams {
                    value: Some(20),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.value, 20);
    }

    /// Tests idempotent voucher saving.
    ///
    /// Expected: a single voucher after saving twice
    #[tokio::test]
    async fn saves_voucher_once() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let customer = factory::create_user(db).await.unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let discount = factory::create_discount(db, shop.id).await.unwrap();
        let service = DiscountService::new(db);

        let first = service.save_voucher(customer.id, discount.id).await.unwrap();
        let second = service.save_voucher(customer.id, discount.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(service.list_vouchers(customer.id).await.unwrap().len(), 1);

        service.remove_voucher(customer.id, first.id).await.unwrap();
        assert!(service.list_vouchers(customer.id).await.unwrap().is_empty());
    }
}
