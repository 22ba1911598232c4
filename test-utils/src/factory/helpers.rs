//! Shared helper utilities for factory methods.
//!
//! This module provides common utilities used across all factory modules,
//! including ID generation and convenience methods for creating entities
//! with their dependencies.

use sea_orm::{DatabaseConnection, DbErr};

/// Counter for generating unique values in tests.
static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Gets the next unique counter value for test data.
///
/// This function provides monotonically increasing values for use in
/// generating unique usernames, emails and codes across all factories.
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Creates a complete order hierarchy with all dependencies.
///
/// This is a convenience method that creates:
/// 1. Customer user
/// 2. Shop user
/// 3. Customer delivery address
/// 4. Product owned by the shop
/// 5. Pending order of one product unit with a matching order item
///
/// # Arguments
/// - `db` - Database connection
///
/// # Returns
/// - `Ok((customer, shop, address, product, order))` - Tuple of all created entities
/// - `Err(DbErr)` - Database error during creation
pub async fn create_order_with_dependencies(
    db: &DatabaseConnection,
) -> Result<
    (
        entity::user::Model,
        entity::user::Model,
        entity::address::Model,
        entity::product::Model,
        entity::order::Model,
    ),
    DbErr,
> {
    let customer = crate::factory::user::create_user(db).await?;
    let shop = crate::factory::user::create_shop(db).await?;
    let address = crate::factory::address::create_address(db, customer.id).await?;
    let product = crate::factory::product::create_product(db, shop.id).await?;
    let order = crate::factory::order::OrderFactory::new(db, customer.id, shop.id, address.id)
        .item(&product, 1)
        .build()
        .await?;

    Ok((customer, shop, address, product, order))
}
