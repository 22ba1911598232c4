use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyticDto {
    pub date: NaiveDate,
    pub order_count: i32,
    pub completed_count: i32,
    pub cancelled_count: i32,
    pub revenue: i64,
    pub items_sold: i64,
    pub video_views: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyticTotalsDto {
    pub order_count: i64,
    pub completed_count: i64,
    pub cancelled_count: i64,
    pub revenue: i64,
    pub items_sold: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsReportDto {
    pub shop_id: i32,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<AnalyticDto>,
    pub totals: AnalyticTotalsDto,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    /// First day, inclusive (YYYY-MM-DD)
    pub from: NaiveDate,
    /// Last day, inclusive (YYYY-MM-DD)
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecomputeAnalyticsDto {
    pub date: NaiveDate,
}
