//! Orders service errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{orders::models::UnknownOrderStatus, products::models::ProductUuid};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order must contain at least one line")]
    EmptyOrder,

    #[error("line quantity must be at least 1")]
    InvalidQuantity,

    #[error("order total must be positive")]
    InvalidTotal,

    #[error("product not found: {product}")]
    ProductNotFound { product: ProductUuid },

    #[error(
        "insufficient stock for \"{title}\": requested {requested}, available {available}"
    )]
    InsufficientStock {
        product: ProductUuid,
        title: String,
        requested: i64,
        available: i64,
    },

    #[error("order not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error(transparent)]
    UnknownStatus(#[from] UnknownOrderStatus),

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid amount value")]
    InvalidAmount(#[from] TryFromIntError),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            _ => Self::Sql(error),
        }
    }
}
