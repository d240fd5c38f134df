//! Auth service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("email already registered")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired access token")]
    InvalidToken,

    #[error("invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("user not found")]
    NotFound,

    #[error("password hashing error")]
    PasswordHash,

    #[error("token encoding error")]
    Jwt(#[source] jsonwebtoken::errors::Error),

    #[error("time computation error")]
    Time(#[source] jiff::Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AuthServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::EmailTaken,
            _ => Self::Sql(error),
        }
    }
}
