use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::analytic::{Analytic, DailyStats};

pub struct AnalyticRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AnalyticRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Writes the shop's figures for the date, replacing any previous row.
    pub async fn upsert(
        &self,
        shop_id: i32,
        date: NaiveDate,
        stats: DailyStats,
    ) -> Result<Analytic, DbErr> {
        let existing = entity::prelude::Analytic::find()
            .filter(entity::analytic::Column::ShopId.eq(shop_id))
            .filter(entity::analytic::Column::Date.eq(date))
            .one(self.db)
            .await?;

        let is_new = existing.is_none();
        let mut active: entity::analytic::ActiveModel = match existing {
            Some(entity) => entity.into(),
            None => entity::analytic::ActiveModel {
                shop_id: ActiveValue::Set(shop_id),
                date: ActiveValue::Set(date),
                ..Default::default()
            },
        };
        active.order_count = ActiveValue::Set(stats.order_count);
        active.completed_count = ActiveValue::Set(stats.completed_count);
        active.cancelled_count = ActiveValue::Set(stats.cancelled_count);
        active.revenue = ActiveValue::Set(stats.revenue);
        active.items_sold = ActiveValue::Set(stats.items_sold);
        active.video_views = ActiveValue::Set(stats.video_views);
        active.updated_at = ActiveValue::Set(Utc::now());

        let entity = if is_new {
            active.insert(self.db).await?
        } else {
            active.update(self.db).await?
        };

        Ok(Analytic::from_entity(entity))
    }

    /// Rows for the shop between both dates inclusive, oldest first.
    pub async fn list_range(
        &self,
        shop_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Analytic>, DbErr> {
        let entities = entity::prelude::Analytic::find()
            .filter(entity::analytic::Column::ShopId.eq(shop_id))
            .filter(entity::analytic::Column::Date.gte(from))
            .filter(entity::analytic::Column::Date.lte(to))
            .order_by_asc(entity::analytic::Column::Date)
            .all(self.db)
            .await?;

        Ok(entities.into_iter().map(Analytic::from_entity).collect())
    }
}
