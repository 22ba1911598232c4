use entity::prelude::*;
use sea_orm::{sea_query::TableCreateStatement, EntityTrait, Schema};

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with customizable database schemas.
///
/// Provides a fluent interface for configuring test environments with in-memory SQLite
/// databases. Use the builder pattern to add entity tables, then call `build()` to
/// create the configured test context.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::builder::TestBuilder;
/// use entity::prelude::{User, Address};
///
/// let test = TestBuilder::new()
///     .with_table(User)
///     .with_table(Address)
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    /// CREATE TABLE statements executed in insertion order during `build()`.
    tables: Vec<TableCreateStatement>,
}

impl TestBuilder {
    /// Creates a new test builder with no tables configured.
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds an entity table to the test database schema.
    ///
    /// Generates a CREATE TABLE statement from the provided SeaORM entity using SQLite
    /// backend syntax. Tables should be added in dependency order (tables with foreign
    /// keys after the tables they reference).
    ///
    /// # Arguments
    /// - `entity` - SeaORM entity model implementing `EntityTrait` to create table for
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Adds the user and auth token tables.
    pub fn with_user_tables(self) -> Self {
        self.with_table(User).with_table(AuthToken)
    }

    /// Adds the tables required for catalog operations.
    ///
    /// This convenience method adds, in dependency order:
    /// - User
    /// - Category
    /// - Product
    pub fn with_catalog_tables(self) -> Self {
        self.with_table(User)
            .with_table(Category)
            .with_table(Product)
    }

    /// Adds the tables required for video feed operations on top of the catalog.
    pub fn with_video_tables(self) -> Self {
        self.with_catalog_tables()
            .with_table(UserFollow)
            .with_table(Video)
            .with_table(VideoProduct)
            .with_table(VideoLike)
            .with_table(Comment)
    }

    /// Adds every table needed for checkout, orders, delivery and payments.
    ///
    /// Use this when testing order or delivery functionality. It includes the
    /// catalog, addresses, carts, discounts, payments, reviews and notifications.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let test = TestBuilder::new()
    ///     .with_order_tables()
    ///     .build()
    ///     .await?;
    /// ```
    pub fn with_order_tables(self) -> Self {
        self.with_catalog_tables()
            .with_table(Address)
            .with_table(CartItem)
            .with_table(ShopDeliveryOption)
            .with_table(Payment)
            .with_table(PaymentCard)
            .with_table(Order)
            .with_table(OrderItem)
            .with_table(Discount)
            .with_table(DiscountProduct)
            .with_table(DiscountUsage)
            .with_table(OrderDiscount)
            .with_table(Voucher)
            .with_table(Review)
            .with_table(Notification)
    }

    /// Adds every table in the schema.
    pub fn with_all_tables(self) -> Self {
        self.with_order_tables()
            .with_table(AuthToken)
            .with_table(UserFollow)
            .with_table(Video)
            .with_table(VideoProduct)
            .with_table(VideoLike)
            .with_table(Comment)
            .with_table(Analytic)
    }

    /// Builds and initializes the test context with configured tables.
    ///
    /// Creates an in-memory SQLite database connection and executes all CREATE TABLE
    /// statements that were added via `with_table()`.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Fully initialized test context with database and tables ready
    /// - `Err(TestError::Database)`- Failed to connect to database or create tables
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut setup = TestContext::new();

        setup.with_tables(self.tables).await?;

        Ok(setup)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
