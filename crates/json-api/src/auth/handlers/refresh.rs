//! Refresh Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{
        cookies::{REFRESH_COOKIE, refresh_cookie},
        errors::into_status_error,
    },
    extensions::*,
    state::State,
};

/// Refresh Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RefreshResponse {
    /// Fresh access token
    pub token: String,
}

/// Refresh Handler
///
/// Exchanges the refresh cookie for a new token pair. The server-stored
/// refresh token is rotated, so the previous cookie value stops working.
#[endpoint(
    tags("auth"),
    summary = "Refresh tokens",
    responses(
        (status_code = StatusCode::OK, description = "New token pair issued"),
        (status_code = StatusCode::UNAUTHORIZED, description = "No refresh token provided"),
        (status_code = StatusCode::FORBIDDEN, description = "Refresh token expired or invalid"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RefreshResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let Some(cookie) = req.cookie(REFRESH_COOKIE) else {
        return Err(StatusError::unauthorized().brief("No refresh token provided"));
    };

    let presented = cookie.value().to_string();

    let pair = state
        .app
        .auth
        .refresh(&presented)
        .await
        .map_err(into_status_error)?;

    res.add_cookie(refresh_cookie(pair.refresh_token));

    Ok(Json(RefreshResponse {
        token: pair.access_token,
    }))
}
