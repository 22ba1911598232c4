//! Cart views grouped by shop.

use crate::model::cart::{CartDto, CartLineDto, CartShopDto};

/// A cart line joined with its product.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: i32,
    pub product_id: i32,
    pub shop_id: i32,
    pub product_name: String,
    pub image_url: Option<String>,
    pub price: i64,
    pub quantity: i32,
    /// Units currently in stock.
    pub stock: i32,
}

impl CartLine {
    pub fn from_entities(item: entity::cart_item::Model, product: entity::product::Model) -> Self {
        Self {
            id: item.id,
            product_id: product.id,
            shop_id: product.shop_id,
            product_name: product.name,
            image_url: product.image_url,
            price: product.price,
            quantity: item.quantity,
            stock: product.quantity,
        }
    }

    pub fn line_total(&self) -> i64 {
        self.price * self.quantity as i64
    }

    pub fn into_dto(self) -> CartLineDto {
        let line_total = self.line_total();
        CartLineDto {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name,
            image_url: self.image_url,
            price: self.price,
            quantity: self.quantity,
            line_total,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartShop {
    pub shop_id: i32,
    pub shop_name: String,
    pub items: Vec<CartLine>,
}

impl CartShop {
    pub fn subtotal(&self) -> i64 {
        self.items.iter().map(CartLine::line_total).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cart {
    pub shops: Vec<CartShop>,
}

impl Cart {
    pub fn into_dto(self) -> CartDto {
        let total = self.shops.iter().map(CartShop::subtotal).sum();
        CartDto {
            shops: self
                .shops
                .into_iter()
                .map(|shop| {
                    let subtotal = shop.subtotal();
                    CartShopDto {
                        shop_id: shop.shop_id,
                        shop_name: shop.shop_name,
                        items: shop.items.into_iter().map(CartLine::into_dto).collect(),
                        subtotal,
                    }
                })
                .collect(),
            total,
        }
    }
}
