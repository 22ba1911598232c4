//! Daily shop analytics rollup.
//!
//! Figures are derived from the orders created on a given UTC day, grouped by
//! their current status. `video_views` is a snapshot of the shop's total views
//! at rollup time.

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{
        analytic::AnalyticRepository, order::OrderRepository, user::UserRepository,
        video::VideoRepository,
    },
    error::AppError,
    model::{
        analytic::{Analytic, AnalyticsReport, DailyStats},
        order::{Order, OrderStatus},
        user::Role,
    },
};

/// Longest range a report may span, in days.
pub const MAX_REPORT_DAYS: i64 = 366;

pub struct AnalyticsService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AnalyticsService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Rows for a shop between two dates inclusive.
    pub async fn get(&self, shop_id: i32, from: NaiveDate, to: NaiveDate) -> Result<AnalyticsReport, AppError> {
        if to < from {
            return Err(AppError::BadRequest("`to` must not be before `from`".to_string()));
        }
        if (to - from).num_days() + 1 > MAX_REPORT_DAYS {
            return Err(AppError::BadRequest(format!(
                "Range may span at most {} days",
                MAX_REPORT_DAYS
            )));
        }

        let rows = AnalyticRepository::new(self.db)
            .list_range(shop_id, from, to)
            .await?;

        Ok(AnalyticsReport {
            shop_id,
            from,
            to,
            rows,
        })
    }

    /// Recomputes one day for a shop on demand.
    pub async fn recompute(&self, shop_id: i32, date: NaiveDate) -> Result<Analytic, AppError> {
        if date > Utc::now().date_naive() {
            return Err(AppError::BadRequest("Cannot compute a future date".to_string()));
        }

        let stats = self.compute(shop_id, date).await?;
        Ok(AnalyticRepository::new(self.db)
            .upsert(shop_id, date, stats)
            .await?)
    }

    /// Recomputes today and yesterday for every shop.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of rows written
    pub async fn rollup(&self) -> Result<usize, AppError> {
        let today = Utc::now().date_naive();
        let days = [today - Duration::days(1), today];
        let shops = UserRepository::new(self.db).ids_by_role(Role::Shop).await?;

        let mut written = 0;
        for shop_id in shops {
            for date in days {
                self.recompute(shop_id, date).await?;
                written += 1;
            }
        }

        Ok(written)
    }

    async fn compute(&self, shop_id: i32, date: NaiveDate) -> Result<DailyStats, AppError> {
        let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let orders = OrderRepository::new(self.db)
            .list_created_between(shop_id, start, start + Duration::days(1))
            .await?;

        let mut stats = summarize(&orders);
        stats.video_views = VideoRepository::new(self.db).total_views(shop_id).await?;

        Ok(stats)
    }
}

fn summarize(orders: &[Order]) -> DailyStats {
    let mut stats = DailyStats {
        order_count: orders.len() as i32,
        ..Default::default()
    };

    for order in orders {
        match order.status {
            OrderStatus::Completed => {
                stats.completed_count += 1;
                stats.revenue += order.total;
                stats.items_sold += order.items.iter().map(|i| i.quantity as i64).sum::<i64>();
            }
            OrderStatus::Cancelled => stats.cancelled_count += 1,
            _ => {}
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests today's rollup for a shop.
    ///
    /// Expected: all orders counted, only the completed one contributing
    /// revenue and items, views summed from the shop's videos
    #[tokio::test]
    async fn rolls_up_today() {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let customer = factory::create_user(db).await.unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let address = factory::create_address(db, customer.id).await.unwrap();
        let product = factory::create_product(db, shop.id).await.unwrap();
        factory::video::VideoFactory::new(db, shop.id)
            .view_count(40)
            .build()
            .await
            .unwrap();

        let completed = factory::order::OrderFactory::new(db, customer.id, shop.id, address.id)
            .item(&product, 3)
            .status("COMPLETED")
            .build()
            .await
            .unwrap();
        for status in ["CANCELLED", "PENDING"] {
            factory::order::OrderFactory::new(db, customer.id, shop.id, address.id)
                .item(&product, 1)
                .status(status)
                .build()
                .await
                .unwrap();
        }

        let service = AnalyticsService::new(db);
        assert_eq!(service.rollup().await.unwrap(), 2);

        let today = Utc::now().date_naive();
        let report = service.get(shop.id, today, today).await.unwrap();
        let stats = &report.rows[0].stats;
        assert_eq!(stats.order_count, 3);
        assert_eq!(stats.completed_count, 1);
        assert_eq!(stats.cancelled_count, 1);
        assert_eq!(stats.revenue, completed.total);
        assert_eq!(stats.items_sold, 3);
        assert_eq!(stats.video_views, 40);
    }

    /// Tests report range validation.
    ///
    /// Expected: Err(BadRequest) for reversed and over-long ranges
    #[tokio::test]
    async fn validates_ranges() {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let service = AnalyticsService::new(db);
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        assert!(service.get(1, day, day - Duration::days(1)).await.is_err());
        assert!(service.get(1, day, day + Duration::days(366)).await.is_err());
        assert!(service.get(1, day, day + Duration::days(365)).await.is_ok());
    }
}
