//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::products::models::{NewProduct, ProductUuid};

use crate::{
    extensions::*,
    products::{errors::into_status_error, handlers::ProductResponse},
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateProductRequest {
    pub title: String,
    pub author: String,
    pub image: String,
    pub original_price: u64,
    pub discount_price: Option<u64>,
    pub stock: i64,
}

/// Create Product Handler
///
/// Admin-only catalog insert.
#[endpoint(
    tags("products"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid product payload"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing authentication"),
        (status_code = StatusCode::FORBIDDEN, description = "Admins only"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let _claims = depot.admin_or_403()?;
    let request = json.into_inner();

    if request.title.trim().is_empty() {
        return Err(StatusError::bad_request().brief("Title is required"));
    }

    if request.stock < 0 {
        return Err(StatusError::bad_request().brief("Stock cannot be negative"));
    }

    let product = state
        .app
        .products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            title: request.title,
            author: request.author,
            image: request.image,
            original_price: request.original_price,
            discount_price: request.discount_price,
            stock: request.stock,
        })
        .await
        .map_err(into_status_error)?;

    let uuid: Uuid = product.uuid.into_uuid();

    res.add_header(LOCATION, format!("/products/{uuid}"), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(ProductResponse::from(product)))
}
