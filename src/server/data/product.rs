//! Product data repository.
//!
//! Product reads attach the review rating summary. Stock changes go through
//! `decrement_stock`/`increment_stock`, which never let the quantity go negative.

use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, ExprTrait},
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use std::collections::HashMap;

use crate::server::model::catalog::{
    CreateProductParams, Product, RatingSummary, UpdateProductParams,
};

pub struct ProductRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProductRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, params: CreateProductParams) -> Result<Product, DbErr> {
        let now = Utc::now();
        let entity = entity::product::ActiveModel {
            shop_id: ActiveValue::Set(params.shop_id),
            category_id: ActiveValue::Set(params.category_id),
            name: ActiveValue::Set(params.name),
            description: ActiveValue::Set(params.description),
            price: ActiveValue::Set(params.price),
            quantity: ActiveValue::Set(params.quantity),
            image_url: ActiveValue::Set(params.image_url),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Product::from_entity(entity, RatingSummary::default()))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Product>, DbErr> {
        let Some(entity) = entity::prelude::Product::find_by_id(id).one(self.db).await? else {
            return Ok(None);
        };

        let mut ratings = self.rating_summaries(vec![entity.id]).await?;
        let rating = ratings.remove(&entity.id).unwrap_or_default();
        Ok(Some(Product::from_entity(entity, rating)))
    }

    /// Updates a product owned by the shop.
    ///
    /// # Returns
    /// - `Ok(Some(Product))` - Updated product
    /// - `Ok(None)` - Product not found or owned by another shop
    pub async fn update(&self, params: UpdateProductParams) -> Result<Option<Product>, DbErr> {
        let Some(entity) = entity::prelude::Product::find_by_id(params.id)
            .filter(entity::product::Column::ShopId.eq(params.shop_id))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: entity::product::ActiveModel = entity.into();
        if let Some(name) = params.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(description) = params.description {
            active.description = ActiveValue::Set(Some(description));
        }
        if let Some(category_id) = params.category_id {
            active.category_id = ActiveValue::Set(Some(category_id));
        }
        if let Some(price) = params.price {
            active.price = ActiveValue::Set(price);
        }
        if let Some(quantity) = params.quantity {
            active.quantity = ActiveValue::Set(quantity);
        }
        if let Some(image_url) = params.image_url {
            active.image_url = ActiveValue::Set(Some(image_url));
        }
        active.updated_at = ActiveValue::Set(Utc::now());

        let entity = active.update(self.db).await?;
        self.find_by_id(entity.id).await
    }

    /// Deletes a product owned by the shop.
    ///
    /// # Returns
    /// - `Ok(true)` - Product deleted
    /// - `Ok(false)` - Product not found or owned by another shop
    pub async fn delete(&self, id: i32, shop_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Product::delete_many()
            .filter(entity::product::Column::Id.eq(id))
            .filter(entity::product::Column::ShopId.eq(shop_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Gets a page of a shop's products, newest first.
    ///
    /// # Returns
    /// - `Ok((products, total))` - Products on the page and the total count
    pub async fn list_by_shop(
        &self,
        shop_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Product>, u64), DbErr> {
        let query = entity::prelude::Product::find()
            .filter(entity::product::Column::ShopId.eq(shop_id))
            .order_by_desc(entity::product::Column::CreatedAt)
            .order_by_desc(entity::product::Column::Id);

        self.paginate(query, page, per_page).await
    }

    /// Searches products by name fragment and optional category.
    pub async fn search(
        &self,
        q: Option<&str>,
        category_id: Option<i32>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Product>, u64), DbErr> {
        let mut query = entity::prelude::Product::find();
        if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
            query = query.filter(entity::product::Column::Name.contains(q));
        }
        if let Some(category_id) = category_id {
            query = query.filter(entity::product::Column::CategoryId.eq(category_id));
        }
        let query = query
            .order_by_desc(entity::product::Column::CreatedAt)
            .order_by_desc(entity::product::Column::Id);

        self.paginate(query, page, per_page).await
    }

    async fn paginate(
        &self,
        query: Select<entity::product::Entity>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Product>, u64), DbErr> {
        let paginator = query.paginate(self.db, per_page);
        let total = paginator.num_items().await?;
        let entities = paginator.fetch_page(page).await?;

        let mut ratings = self
            .rating_summaries(entities.iter().map(|p| p.id).collect())
            .await?;
        let products = entities
            .into_iter()
            .map(|p| {
                let rating = ratings.remove(&p.id).unwrap_or_default();
                Product::from_entity(p, rating)
            })
            .collect();

        Ok((products, total))
    }

    /// Computes review rating summaries for the given products.
    ///
    /// Products without reviews are absent from the map.
    pub async fn rating_summaries(
        &self,
        product_ids: Vec<i32>,
    ) -> Result<HashMap<i32, RatingSummary>, DbErr> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i32)> = entity::prelude::Review::find()
            .select_only()
            .column(entity::review::Column::ProductId)
            .column(entity::review::Column::Rating)
            .filter(entity::review::Column::ProductId.is_in(product_ids))
            .into_tuple()
            .all(self.db)
            .await?;

        let mut totals: HashMap<i32, (i64, u64)> = HashMap::new();
        for (product_id, rating) in rows {
            let entry = totals.entry(product_id).or_default();
            entry.0 += rating as i64;
            entry.1 += 1;
        }

        Ok(totals
            .into_iter()
            .map(|(id, (sum, count))| (id, RatingSummary::from_totals(sum, count)))
            .collect())
    }

    /// Takes `quantity` units out of stock if enough remain.
    ///
    /// # Returns
    /// - `Ok(true)` - Stock decremented
    /// - `Ok(false)` - Not enough stock, nothing changed
    pub async fn decrement_stock(&self, id: i32, quantity: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Product::update_many()
            .col_expr(
                entity::product::Column::Quantity,
                Expr::col(entity::product::Column::Quantity).sub(quantity),
            )
            .filter(entity::product::Column::Id.eq(id))
            .filter(entity::product::Column::Quantity.gte(quantity))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Returns `quantity` units to stock.
    pub async fn increment_stock(&self, id: i32, quantity: i32) -> Result<(), DbErr> {
        entity::prelude::Product::update_many()
            .col_expr(
                entity::product::Column::Quantity,
                Expr::col(entity::product::Column::Quantity).add(quantity),
            )
            .filter(entity::product::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// IDs among `ids` that belong to the shop.
    pub async fn owned_ids(&self, shop_id: i32, ids: Vec<i32>) -> Result<Vec<i32>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        entity::prelude::Product::find()
            .select_only()
            .column(entity::product::Column::Id)
            .filter(entity::product::Column::ShopId.eq(shop_id))
            .filter(entity::product::Column::Id.is_in(ids))
            .into_tuple()
            .all(self.db)
            .await
    }
}
