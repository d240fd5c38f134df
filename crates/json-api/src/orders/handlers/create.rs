//! Create Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::orders::models::{NewOrder, OrderLineRequest, OrderUuid};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, handlers::OrderResponse},
    state::State,
};

/// One requested checkout line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderLine {
    pub product_uuid: Uuid,
    pub quantity: i64,
}

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderRequest {
    pub lines: Vec<CreateOrderLine>,
    pub total_amount: u64,
}

/// Create Order Handler
///
/// Places an order for the authenticated user: stock is reserved per line
/// and the purchased product data is snapshotted into the order.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid order payload"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown product"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing authentication"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let claims = depot.claims_or_401()?;
    let request = json.into_inner();

    let order = state
        .app
        .orders
        .place_order(NewOrder {
            uuid: OrderUuid::new(),
            user_uuid: claims.user_uuid(),
            lines: request
                .lines
                .into_iter()
                .map(|line| OrderLineRequest {
                    product_uuid: line.product_uuid.into(),
                    quantity: line.quantity,
                })
                .collect(),
            declared_total: request.total_amount,
        })
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(OrderResponse::from(order)))
}
