//! List Orders Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::orders::models::OrderWithUser;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, handlers::{OrderLineResponse, OrderResponse}},
    state::State,
};

/// Order listing entry with owner contact details.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AdminOrderResponse {
    /// Order UUID
    pub uuid: Uuid,

    /// Owning user UUID
    pub user_uuid: Uuid,

    /// Owner display name
    pub user_name: String,

    /// Owner email
    pub user_email: String,

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

impl From<OrderWithUser> for AdminOrderResponse {
    fn from(entry: OrderWithUser) -> Self {
        let order = OrderResponse::from(entry.order);

        Self {
            uuid: order.uuid,
            user_uuid: order.user_uuid,
            user_name: entry.user_name,
            user_email: entry.user_email,
            total_amount: order.total_amount,
            status: order.status,
            lines: order.lines,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// List Orders Handler
///
/// Admin-only listing of all orders, newest first.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "All orders"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing authentication"),
        (status_code = StatusCode::FORBIDDEN, description = "Admins only"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<AdminOrderResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let _claims = depot.admin_or_403()?;

    let orders = state
        .app
        .orders
        .list_orders()
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        orders.into_iter().map(AdminOrderResponse::from).collect(),
    ))
}
