//! Cart Models

use crate::domain::products::models::{Product, ProductUuid};

/// Server-persisted cart line resolved against the live catalog.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product: Product,
    pub quantity: i64,
}

/// Raw cart entry, as pushed by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    pub product_uuid: ProductUuid,
    pub quantity: i64,
}
