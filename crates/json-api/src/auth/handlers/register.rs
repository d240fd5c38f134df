//! Register Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use folio_app::auth::{NewUser, Role, UserUuid};

use crate::{
    auth::{
        cookies::refresh_cookie,
        errors::into_status_error,
        handlers::{AuthResponse, UserResponse},
    },
    extensions::*,
    state::State,
};

/// Register Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Register Handler
///
/// Creates an account, issues a token pair, and sets the refresh cookie.
/// Registration always yields the `user` role; admins are seeded out of band.
#[endpoint(
    tags("auth"),
    summary = "Register",
    responses(
        (status_code = StatusCode::CREATED, description = "Account created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid payload or email taken"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RegisterRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<AuthResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    if request.name.trim().is_empty() {
        return Err(StatusError::bad_request().brief("Name is required"));
    }

    if !request.email.contains('@') {
        return Err(StatusError::bad_request().brief("A valid email is required"));
    }

    if request.password.len() < 8 {
        return Err(StatusError::bad_request().brief("Password must be at least 8 characters"));
    }

    let session = state
        .app
        .auth
        .register(NewUser {
            uuid: UserUuid::new(),
            name: request.name,
            email: request.email,
            password: request.password,
            role: Role::User,
        })
        .await
        .map_err(into_status_error)?;

    res.add_cookie(refresh_cookie(session.tokens.refresh_token));
    res.status_code(StatusCode::CREATED);

    Ok(Json(AuthResponse {
        token: session.tokens.access_token,
        user: UserResponse::from(session.user),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use folio_app::auth::{AuthServiceError, MockAuthService};

    use crate::test_helpers::{auth_service, make_auth_session};

    use super::*;

    fn make_service(auth: MockAuthService) -> Service {
        auth_service(auth, Router::with_path("auth/register").post(handler))
    }

    #[tokio::test]
    async fn test_register_success_sets_refresh_cookie() -> TestResult {
        let session = make_auth_session(Role::User);
        let expected_uuid = session.user.uuid;

        let mut auth = MockAuthService::new();

        auth.expect_register()
            .once()
            .withf(|new_user| {
                new_user.name == "Ada"
                    && new_user.email == "ada@example.com"
                    && new_user.role == Role::User
            })
            .return_once(move |_| Ok(session));

        let mut res = TestClient::post("http://example.com/auth/register")
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "long enough password",
            }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let cookie_header = res
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        assert!(
            cookie_header.starts_with("refresh_token="),
            "refresh cookie must be set, got {cookie_header}"
        );
        assert!(cookie_header.contains("HttpOnly"), "cookie must be http-only");

        let body: AuthResponse = res.take_json().await?;

        assert_eq!(body.user.uuid, expected_uuid.into_uuid());
        assert_eq!(body.user.role, "user");
        assert!(!body.token.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_email_returns_400() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_register()
            .once()
            .return_once(|_| Err(AuthServiceError::EmailTaken));

        let res = TestClient::post("http://example.com/auth/register")
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "long enough password",
            }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_short_password_rejected_before_service() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_register().never();

        let res = TestClient::post("http://example.com/auth/register")
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "short",
            }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
