//! Product Handlers

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::products::models::Product;

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod update;

/// Product Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductResponse {
    /// Product UUID
    pub uuid: Uuid,

    /// Title
    pub title: String,

    /// Author
    pub author: String,

    /// Cover image URL
    pub image: String,

    /// List price in cents
    pub original_price: u64,

    /// Discounted price in cents, when set
    pub discount_price: Option<u64>,

    /// Units in stock
    pub stock: i64,

    /// Creation time
    pub created_at: String,

    /// Last update time
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            uuid: product.uuid.into_uuid(),
            title: product.title,
            author: product.author,
            image: product.image,
            original_price: product.original_price,
            discount_price: product.discount_price,
            stock: product.stock,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}
