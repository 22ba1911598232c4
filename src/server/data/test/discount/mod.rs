use crate::server::data::discount::DiscountRepository;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod list_live_by_shop;
mod redeem;
