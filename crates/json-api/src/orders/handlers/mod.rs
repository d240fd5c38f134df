//! Order Handlers

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::orders::models::{Order, OrderLine};

pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod my_orders;
pub(crate) mod update;

/// Snapshotted order line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    /// Line UUID
    pub uuid: Uuid,

    /// Purchased product UUID
    pub product_uuid: Uuid,

    /// Title at purchase time
    pub title: String,

    /// Image URL at purchase time
    pub image: String,

    /// Unit price in cents at purchase time
    pub unit_price: u64,

    /// Purchased quantity
    pub quantity: i64,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            uuid: line.uuid.into_uuid(),
            product_uuid: line.product_uuid.into_uuid(),
            title: line.title,
            image: line.image,
            unit_price: line.unit_price,
            quantity: line.quantity,
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// Order UUID
    pub uuid: Uuid,

    /// Owning user UUID
    pub user_uuid: Uuid,

    /// Declared total in cents
    pub total_amount: u64,

    /// Current status
    pub status: String,

    /// Snapshotted lines
    pub lines: Vec<OrderLineResponse>,

    /// Creation time
    pub created_at: String,

    /// Last status change time
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            user_uuid: order.user_uuid.into_uuid(),
            total_amount: order.total_amount,
            status: order.status.as_str().to_string(),
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}
