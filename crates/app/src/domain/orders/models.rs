//! Order Models

use std::str::FromStr;

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    auth::models::UserUuid, domain::products::models::ProductUuid, uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order Line UUID
pub type OrderLineUuid = TypedUuid<OrderLine>;

/// Order lifecycle status.
///
/// Any status is reachable from any status; there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Error for status strings outside the enumeration.
#[derive(Debug, Error)]
#[error("unknown order status \"{0}\"")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownOrderStatus(value.to_string())),
        }
    }
}

/// Order Model
#[derive(Debug, Clone)]
pub struct Order {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub total_amount: u64,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Snapshotted order line.
///
/// Captured from the product row at purchase time and never updated, so
/// later catalog edits cannot alter order history.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub uuid: OrderLineUuid,
    pub product_uuid: ProductUuid,
    pub title: String,
    pub image: String,
    pub unit_price: u64,
    pub quantity: i64,
}

/// Requested order line, as submitted at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineRequest {
    pub product_uuid: ProductUuid,
    pub quantity: i64,
}

/// New Order Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub lines: Vec<OrderLineRequest>,
    pub declared_total: u64,
}

/// Order plus the owning user's contact details, for admin listings.
#[derive(Debug, Clone)]
pub struct OrderWithUser {
    pub order: Order,
    pub user_name: String,
    pub user_email: String,
}
