//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use folio_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::EmptyOrder => {
            StatusError::bad_request().brief("Order must contain at least one line")
        }
        OrdersServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Line quantity must be at least 1")
        }
        OrdersServiceError::InvalidTotal => {
            StatusError::bad_request().brief("Order total must be positive")
        }
        OrdersServiceError::ProductNotFound { product } => {
            StatusError::not_found().brief(format!("Product not found: {product}"))
        }
        OrdersServiceError::InsufficientStock {
            title,
            requested,
            available,
            ..
        } => StatusError::conflict().brief(format!(
            "Insufficient stock for \"{title}\": requested {requested}, available {available}"
        )),
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::UnknownStatus(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        OrdersServiceError::InvalidReference => {
            StatusError::bad_request().brief("Order references an unknown resource")
        }
        OrdersServiceError::InvalidAmount(source) => {
            error!("order amount out of range: {source}");

            StatusError::bad_request().brief("Invalid order amount")
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
