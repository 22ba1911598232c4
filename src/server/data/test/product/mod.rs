use crate::server::data::product::ProductRepository;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod decrement_stock;
mod rating_summaries;
mod search;
