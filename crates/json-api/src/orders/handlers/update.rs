//! Update Order Status Handler

use std::{str::FromStr, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::{JsonBody, PathParam}},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::orders::models::OrderStatus;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, handlers::OrderResponse},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// New status value
    pub status: String,
}

/// Update Order Status Handler
///
/// Admin-only. Overwrites the status unconditionally; any enumerated status
/// is reachable from any other.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Status updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status value"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing authentication"),
        (status_code = StatusCode::FORBIDDEN, description = "Admins only"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let _claims = depot.admin_or_403()?;

    let status = OrderStatus::from_str(&json.into_inner().status)
        .map_err(|unknown| StatusError::bad_request().brief(unknown.to_string()))?;

    let order = state
        .app
        .orders
        .update_status(order.into_inner().into(), status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrderResponse::from(order)))
}
