//! Update Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::{JsonBody, PathParam}},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::products::models::ProductUpdate;

use crate::{
    extensions::*,
    products::{errors::into_status_error, handlers::ProductResponse},
    state::State,
};

/// Update Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateProductRequest {
    pub title: String,
    pub author: String,
    pub image: String,
    pub original_price: u64,
    pub discount_price: Option<u64>,
    pub stock: i64,
}

/// Update Product Handler
///
/// Admin-only catalog update. Existing order snapshots are unaffected.
#[endpoint(
    tags("products"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid product payload"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing authentication"),
        (status_code = StatusCode::FORBIDDEN, description = "Admins only"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let _claims = depot.admin_or_403()?;
    let request = json.into_inner();

    if request.stock < 0 {
        return Err(StatusError::bad_request().brief("Stock cannot be negative"));
    }

    let product = state
        .app
        .products
        .update_product(
            product.into_inner().into(),
            ProductUpdate {
                title: request.title,
                author: request.author,
                image: request.image,
                original_price: request.original_price,
                discount_price: request.discount_price,
                stock: request.stock,
            },
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(ProductResponse::from(product)))
}
