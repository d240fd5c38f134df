//! Profile Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::carts::models::CartItem;

use crate::{
    auth::{errors::into_status_error, handlers::UserResponse},
    extensions::*,
    state::State,
};

/// Server cart line resolved against the live catalog.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProfileCartItemResponse {
    /// Product UUID
    pub product_uuid: Uuid,

    /// Current product title
    pub title: String,

    /// Current product author
    pub author: String,

    /// Current product image URL
    pub image: String,

    /// Current list price in cents
    pub original_price: u64,

    /// Current discounted price in cents, when set
    pub discount_price: Option<u64>,

    /// Advertised stock count
    pub stock: i64,

    /// Quantity in the cart
    pub quantity: i64,
}

impl From<CartItem> for ProfileCartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            product_uuid: item.product.uuid.into_uuid(),
            title: item.product.title,
            author: item.product.author,
            image: item.product.image,
            original_price: item.product.original_price,
            discount_price: item.product.discount_price,
            stock: item.product.stock,
            quantity: item.quantity,
        }
    }
}

/// Profile Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProfileResponse {
    /// The authenticated user
    pub user: UserResponse,

    /// The server-persisted cart
    pub cart: Vec<ProfileCartItemResponse>,
}

/// Profile Handler
///
/// Returns the authenticated user and their server cart, which the client
/// merges with its local cart after login.
#[endpoint(
    tags("auth"),
    summary = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "User and server cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing authentication"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ProfileResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let claims = depot.claims_or_401()?;

    let profile = state
        .app
        .auth
        .profile(claims.user_uuid())
        .await
        .map_err(into_status_error)?;

    Ok(Json(ProfileResponse {
        user: UserResponse::from(profile.user),
        cart: profile
            .cart
            .into_iter()
            .map(ProfileCartItemResponse::from)
            .collect(),
    }))
}
