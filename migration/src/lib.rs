pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_user_table;
mod m20260105_000002_create_auth_token_table;
mod m20260105_000003_create_address_table;
mod m20260105_000004_create_category_table;
mod m20260105_000005_create_product_table;
mod m20260105_000006_create_video_table;
mod m20260105_000007_create_video_product_table;
mod m20260105_000008_create_video_like_table;
mod m20260105_000009_create_comment_table;
mod m20260105_000010_create_user_follow_table;
mod m20260105_000011_create_cart_item_table;
mod m20260105_000012_create_shop_delivery_option_table;
mod m20260105_000013_create_payment_table;
mod m20260105_000014_create_order_table;
mod m20260105_000015_create_order_item_table;
mod m20260105_000016_create_discount_table;
mod m20260105_000017_create_discount_product_table;
mod m20260105_000018_create_discount_usage_table;
mod m20260105_000019_create_order_discount_table;
mod m20260105_000020_create_voucher_table;
mod m20260105_000021_create_payment_card_table;
mod m20260105_000022_create_review_table;
mod m20260105_000023_create_analytic_table;
mod m20260105_000024_create_notification_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_user_table::Migration),
            Box::new(m20260105_000002_create_auth_token_table::Migration),
            Box::new(m20260105_000003_create_address_table::Migration),
            Box::new(m20260105_000004_create_category_table::Migration),
            Box::new(m20260105_000005_create_product_table::Migration),
            Box::new(m20260105_000006_create_video_table::Migration),
            Box::new(m20260105_000007_create_video_product_table::Migration),
            Box::new(m20260105_000008_create_video_like_table::Migration),
            Box::new(m20260105_000009_create_comment_table::Migration),
            Box::new(m20260105_000010_create_user_follow_table::Migration),
            Box::new(m20260105_000011_create_cart_item_table::Migration),
            Box::new(m20260105_000012_create_shop_delivery_option_table::Migration),
            Box::new(m20260105_000013_create_payment_table::Migration),
            Box::new(m20260105_000014_create_order_table::Migration),
            Box::new(m20260105_000015_create_order_item_table::Migration),
            Box::new(m20260105_000016_create_discount_table::Migration),
            Box::new(m20260105_000017_create_discount_product_table::Migration),
            Box::new(m20260105_000018_create_discount_usage_table::Migration),
            Box::new(m20260105_000019_create_order_discount_table::Migration),
            Box::new(m20260105_000020_create_voucher_table::Migration),
            Box::new(m20260105_000021_create_payment_card_table::Migration),
            Box::new(m20260105_000022_create_review_table::Migration),
            Box::new(m20260105_000023_create_analytic_table::Migration),
            Box::new(m20260105_000024_create_notification_table::Migration),
        ]
    }
}
