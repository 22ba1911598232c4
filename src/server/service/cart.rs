use sea_orm::DatabaseConnection;

use crate::server::{
    data::{cart::CartRepository, product::ProductRepository, user::UserRepository},
    error::AppError,
    model::cart::{Cart, CartLine, CartShop},
};

pub struct CartService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CartService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds units of a product, merging into an existing line.
    ///
    /// # Returns
    /// - `Ok(Cart)` - The updated cart
    /// - `Err(AppError::BadRequest)` - Quantity below one or the total would exceed stock
    /// - `Err(AppError::NotFound)` - Product does not exist
    pub async fn add(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<Cart, AppError> {
        if quantity < 1 {
            return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
        }

        let product = ProductRepository::new(self.db)
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let repo = CartRepository::new(self.db);
        let existing = repo.find_line(user_id, product_id).await?;
        let total = existing.as_ref().map(|l| l.quantity).unwrap_or(0) + quantity;

        if total > product.quantity {
            return Err(AppError::BadRequest(format!(
                "Only {} of {} left in stock",
                product.quantity, product.name
            )));
        }

        match existing {
            Some(line) => repo.set_quantity(line.id, total).await?,
            None => repo.insert(user_id, product_id, quantity).await?,
        }

        self.get(user_id).await
    }

    /// Sets a line's quantity; zero removes the line.
    pub async fn update(&self, user_id: i32, item_id: i32, quantity: i32) -> Result<Cart, AppError> {
        if quantity < 0 {
            return Err(AppError::BadRequest("Quantity cannot be negative".to_string()));
        }

        let repo = CartRepository::new(self.db);
        let line = repo
            .find_owned(item_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;

        if quantity == 0 {
            repo.delete(line.id, user_id).await?;
            return self.get(user_id).await;
        }

        let product = ProductRepository::new(self.db)
            .find_by_id(line.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
        if quantity > product.quantity {
            return Err(AppError::BadRequest(format!(
                "Only {} of {} left in stock",
                product.quantity, product.name
            )));
        }

        repo.set_quantity(line.id, quantity).await?;
        self.get(user_id).await
    }

    pub async fn remove(&self, user_id: i32, item_id: i32) -> Result<Cart, AppError> {
        if !CartRepository::new(self.db).delete(item_id, user_id).await? {
            return Err(AppError::NotFound("Cart item not found".to_string()));
        }
        self.get(user_id).await
    }

    pub async fn get(&self, user_id: i32) -> Result<Cart, AppError> {
        let lines = CartRepository::new(self.db).list_lines(user_id, None).await?;
        self.group(lines).await
    }

    /// Groups lines by shop, keeping the order in which shops first appear.
    pub async fn group(&self, lines: Vec<CartLine>) -> Result<Cart, AppError> {
        let mut shop_ids: Vec<i32> = lines.iter().map(|l| l.shop_id).collect();
        shop_ids.dedup();
        let names = UserRepository::new(self.db)
            .display_names(shop_ids)
            .await?;

        let mut shops: Vec<CartShop> = Vec::new();
        for line in lines {
            match shops.iter_mut().find(|s| s.shop_id == line.shop_id) {
                Some(shop) => shop.items.push(line),
                None => shops.push(CartShop {
                    shop_id: line.shop_id,
                    shop_name: names.get(&line.shop_id).cloned().unwrap_or_default(),
                    items: vec![line],
                }),
            }
        }

        Ok(Cart { shops })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests that adding the same product twice merges the lines.
    ///
    /// Expected: one line with the summed quantity
    #[tokio::test]
    async fn merges_lines() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let customer = factory::create_user(db).await.unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let product = factory::create_product(db, shop.id).await.unwrap();
        let service = CartService::new(db);

        service.add(customer.id, product.id, 2).await.unwrap();
        let cart = service.add(customer.id, product.id, 3).await.unwrap();

        assert_eq!(cart.shops.len(), 1);
        assert_eq!(cart.shops[0].items.len(), 1);
        assert_eq!(cart.shops[0].items[0].quantity, 5);
        assert_eq!(cart.shops[0].subtotal(), product.price * 5);
    }

    /// Tests the stock ceiling on merged quantities.
    ///
    /// Expected: BadRequest when the total exceeds stock
    #[tokio::test]
    async fn rejects_quantities_over_stock() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let customer = factory::create_user(db).await.unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let product = factory::product::ProductFactory::new(db, shop.id)
            .quantity(3)
            .build()
            .await
            .unwrap();
        let service = CartService::new(db);

        service.add(customer.id, product.id, 2).await.unwrap();
        let result = service.add(customer.id, product.id, 2).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = service.add(customer.id, product.id, 0).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    /// Tests that updating to zero removes the line.
    ///
    /// Expected: empty cart
    #[tokio::test]
    async fn zero_quantity_removes_line() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let customer = factory::create_user(db).await.unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let product = factory::create_product(db, shop.id).await.unwrap();
        let service = CartService::new(db);

        let cart = service.add(customer.id, product.id, 1).await.unwrap();
        let item_id = cart.shops[0].items[0].id;

        let cart = service.update(customer.id, item_id, 0).await.unwrap();
        assert!(cart.shops.is_empty());
    }

    /// Tests grouping lines from several shops.
    ///
    /// Expected: one group per shop, named after the shop
    #[tokio::test]
    async fn groups_by_shop() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let customer = factory::create_user(db).await.unwrap();
        let first_shop = factory::create_shop(db).await.unwrap();
        let second_shop = factory::create_shop(db).await.unwrap();
        let a = factory::create_product(db, first_shop.id).await.unwrap();
        let b = factory::create_product(db, second_shop.id).await.unwrap();
        let c = factory::create_product(db, first_shop.id).await.unwrap();
        let service = CartService::new(db);

        service.add(customer.id, a.id, 1).await.unwrap();
        service.add(customer.id, b.id, 1).await.unwrap();
        let cart = service.add(customer.id, c.id, 1).await.unwrap();

        assert_eq!(cart.shops.len(), 2);
        assert_eq!(cart.shops[0].shop_id, first_shop.id);
        assert_eq!(cart.shops[0].shop_name, first_shop.display_name);
        assert_eq!(cart.shops[0].items.len(), 2);
        assert_eq!(cart.shops[1].items.len(), 1);
    }

    /// Tests removing another user's line.
    ///
    /// Expected: NotFound
    #[tokio::test]
    async fn cannot_remove_foreign_lines() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let owner = factory::create_user(db).await.unwrap();
        let other = factory::create_user(db).await.unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let product = factory::create_product(db, shop.id).await.unwrap();
        let service = CartService::new(db);

        let cart = service.add(owner.id, product.id, 1).await.unwrap();
        let item_id = cart.shops[0].items[0].id;

        assert!(matches!(
            service.remove(other.id, item_id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
