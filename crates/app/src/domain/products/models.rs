//! Product Models

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Catalog entry.
#[derive(Debug, Clone)]
pub struct Product {
    pub uuid: ProductUuid,
    pub title: String,
    pub author: String,
    pub image: String,
    pub original_price: u64,
    pub discount_price: Option<u64>,
    pub stock: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// Price charged at checkout: the discounted price when one is set.
    #[must_use]
    pub fn effective_price(&self) -> u64 {
        self.discount_price.unwrap_or(self.original_price)
    }
}

/// New Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub title: String,
    pub author: String,
    pub image: String,
    pub original_price: u64,
    pub discount_price: Option<u64>,
    pub stock: i64,
}

/// Product Update Model
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub title: String,
    pub author: String,
    pub image: String,
    pub original_price: u64,
    pub discount_price: Option<u64>,
    pub stock: i64,
}
