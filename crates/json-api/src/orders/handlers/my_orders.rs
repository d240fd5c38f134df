//! My Orders Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, handlers::OrderResponse},
    state::State,
};

/// My Orders Handler
///
/// Returns the authenticated user's orders, newest first.
#[endpoint(
    tags("orders"),
    summary = "My Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The caller's orders"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing authentication"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<OrderResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let claims = depot.claims_or_401()?;

    let orders = state
        .app
        .orders
        .list_orders_by_user(claims.user_uuid())
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}
