//! Login Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{
        cookies::refresh_cookie,
        errors::into_status_error,
        handlers::{AuthResponse, UserResponse},
    },
    extensions::*,
    state::State,
};

/// Login Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login Handler
///
/// Verifies credentials, issues a token pair, and sets the refresh cookie.
#[endpoint(
    tags("auth"),
    summary = "Login",
    responses(
        (status_code = StatusCode::OK, description = "Authenticated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid email or password"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<AuthResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    if request.email.is_empty() || request.password.is_empty() {
        return Err(StatusError::bad_request().brief("Email and password are required"));
    }

    let session = state
        .app
        .auth
        .login(&request.email, &request.password)
        .await
        .map_err(into_status_error)?;

    res.add_cookie(refresh_cookie(session.tokens.refresh_token));

    Ok(Json(AuthResponse {
        token: session.tokens.access_token,
        user: UserResponse::from(session.user),
    }))
}
