//! Refresh token cookie construction.

use salvo::http::cookie::{Cookie, SameSite, time::Duration};

use folio_app::auth::DEFAULT_REFRESH_TTL_SECS;

/// Cookie carrying the opaque refresh token.
pub(crate) const REFRESH_COOKIE: &str = "refresh_token";

/// Build the http-only refresh cookie set on login, registration, and refresh.
pub(crate) fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::seconds(DEFAULT_REFRESH_TTL_SECS))
        .build()
}

/// Build an immediately-expiring cookie that clears the client's copy.
pub(crate) fn expired_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}
