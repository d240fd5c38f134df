//! Auth Errors

use salvo::http::StatusError;
use tracing::error;

use folio_app::auth::AuthServiceError;

pub(crate) fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::EmailTaken => StatusError::bad_request().brief("Email already exists"),
        AuthServiceError::InvalidCredentials => {
            StatusError::bad_request().brief("Invalid email or password")
        }
        AuthServiceError::InvalidToken => {
            StatusError::unauthorized().brief("Invalid or expired token")
        }
        AuthServiceError::InvalidRefreshToken => {
            StatusError::forbidden().brief("Refresh token expired or invalid")
        }
        AuthServiceError::NotFound => StatusError::not_found().brief("User not found"),
        AuthServiceError::PasswordHash => {
            error!("password hashing failed");

            StatusError::internal_server_error()
        }
        AuthServiceError::Jwt(source) => {
            error!("failed to encode access token: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Time(source) => {
            error!("failed to compute token expiry: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Sql(source) => {
            error!("auth storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
