//! Sync Cart Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use folio_app::domain::carts::{CartsServiceError, models::CartEntry};

use crate::{auth::handlers::MessageResponse, extensions::*, state::State};

/// One pushed cart line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SyncCartLine {
    pub product_uuid: Uuid,
    pub quantity: i64,
}

/// Sync Cart Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SyncCartRequest {
    pub cart: Vec<SyncCartLine>,
}

fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::UserNotFound => StatusError::not_found().brief("User not found"),
        CartsServiceError::UnknownProduct => {
            StatusError::bad_request().brief("Cart references an unknown product")
        }
        CartsServiceError::InvalidData => StatusError::bad_request().brief("Invalid cart payload"),
        CartsServiceError::Sql(source) => {
            error!("failed to sync cart: {source}");

            StatusError::internal_server_error()
        }
    }
}

/// Sync Cart Handler
///
/// Overwrites the server cart wholesale with the pushed lines. The client
/// debounces these pushes; the last write wins.
#[endpoint(
    tags("auth"),
    summary = "Sync cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart synced"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing authentication"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid cart payload"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<SyncCartRequest>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let claims = depot.claims_or_401()?;

    let entries = json
        .into_inner()
        .cart
        .into_iter()
        .map(|line| CartEntry {
            product_uuid: line.product_uuid.into(),
            quantity: line.quantity,
        })
        .collect();

    state
        .app
        .carts
        .replace_cart(claims.user_uuid(), entries)
        .await
        .map_err(into_status_error)?;

    Ok(Json(MessageResponse {
        message: "Cart synced".to_string(),
    }))
}
