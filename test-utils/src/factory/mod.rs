//! Factory methods for creating test data.
//!
//! This module provides factory methods for creating test entities with sensible defaults,
//! reducing boilerplate in tests. Factories take explicit foreign keys, and `helpers`
//! offers shortcuts that create a whole dependency chain at once.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), sea_orm::DbErr> {
//!     let db = /* ... */;
//!
//!     // Create with defaults
//!     let customer = factory::user::create_user(&db).await?;
//!     let shop = factory::user::create_shop(&db).await?;
//!
//!     // Create with all dependencies
//!     let (customer, shop, address, product, order) =
//!         factory::helpers::create_order_with_dependencies(&db).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Customization
//!
//! ```rust,ignore
//! let product = factory::product::ProductFactory::new(&db, shop.id)
//!     .price(25_000)
//!     .quantity(3)
//!     .build()
//!     .await?;
//! ```

pub mod address;
pub mod category;
pub mod delivery_option;
pub mod discount;
pub mod helpers;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;
pub mod video;

// Re-export commonly used factory functions for concise usage
pub use address::create_address;
pub use category::create_category;
pub use discount::create_discount;
pub use order::create_order;
pub use product::create_product;
pub use user::{create_shop, create_user};
pub use video::create_video;
