//! Daily shop analytics.

use chrono::NaiveDate;

use crate::model::analytic::{AnalyticDto, AnalyticTotalsDto, AnalyticsReportDto};

/// Aggregated figures for one shop and day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyStats {
    pub order_count: i32,
    pub completed_count: i32,
    pub cancelled_count: i32,
    pub revenue: i64,
    pub items_sold: i64,
    pub video_views: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analytic {
    pub shop_id: i32,
    pub date: NaiveDate,
    pub stats: DailyStats,
}

impl Analytic {
    pub fn from_entity(entity: entity::analytic::Model) -> Self {
        Self {
            shop_id: entity.shop_id,
            date: entity.date,
            stats: DailyStats {
                order_count: entity.order_count,
                completed_count: entity.completed_count,
                cancelled_count: entity.cancelled_count,
                revenue: entity.revenue,
                items_sold: entity.items_sold,
                video_views: entity.video_views,
            },
        }
    }

    pub fn into_dto(self) -> AnalyticDto {
        AnalyticDto {
            date: self.date,
            order_count: self.stats.order_count,
            completed_count: self.stats.completed_count,
            cancelled_count: self.stats.cancelled_count,
            revenue: self.stats.revenue,
            items_sold: self.stats.items_sold,
            video_views: self.stats.video_views,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsReport {
    pub shop_id: i32,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<Analytic>,
}

impl AnalyticsReport {
    pub fn into_dto(self) -> AnalyticsReportDto {
        let totals = self
            .rows
            .iter()
            .fold(AnalyticTotalsDto::default(), |mut acc, row| {
                acc.order_count += row.stats.order_count as i64;
                acc.completed_count += row.stats.completed_count as i64;
                acc.cancelled_count += row.stats.cancelled_count as i64;
                acc.revenue += row.stats.revenue;
                acc.items_sold += row.stats.items_sold;
                acc
            });

        AnalyticsReportDto {
            shop_id: self.shop_id,
            from: self.from,
            to: self.to,
            rows: self.rows.into_iter().map(Analytic::into_dto).collect(),
            totals,
        }
    }
}
