//! Logout Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    auth::{
        cookies::{REFRESH_COOKIE, expired_refresh_cookie},
        errors::into_status_error,
        handlers::MessageResponse,
    },
    extensions::*,
    state::State,
};

/// Logout Handler
///
/// Clears the server-stored refresh token and expires the cookie. Works
/// without a cookie too, so a half-logged-out client can always converge.
#[endpoint(
    tags("auth"),
    summary = "Logout",
    responses(
        (status_code = StatusCode::OK, description = "Logged out"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<MessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    if let Some(cookie) = req.cookie(REFRESH_COOKIE) {
        let presented = cookie.value().to_string();

        state
            .app
            .auth
            .logout(&presented)
            .await
            .map_err(into_status_error)?;
    }

    res.add_cookie(expired_refresh_cookie());

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::{http::header::COOKIE, test::TestClient};
    use testresult::TestResult;

    use folio_app::auth::MockAuthService;

    use crate::test_helpers::auth_service;

    use super::*;

    fn make_service(auth: MockAuthService) -> Service {
        auth_service(auth, Router::with_path("auth/logout").post(handler))
    }

    #[tokio::test]
    async fn test_logout_clears_stored_token_and_cookie() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_logout()
            .once()
            .withf(|token| token == "fr_v1_live.aa")
            .return_once(|_| Ok(()));

        let res = TestClient::post("http://example.com/auth/logout")
            .add_header(COOKIE, "refresh_token=fr_v1_live.aa", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let cookie_header = res
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        assert!(
            cookie_header.starts_with("refresh_token=;"),
            "cookie must be cleared, got {cookie_header}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_logout_without_cookie_still_succeeds() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_logout().never();

        let res = TestClient::post("http://example.com/auth/logout")
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
