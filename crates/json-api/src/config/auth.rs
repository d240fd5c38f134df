//! Auth Config

use clap::Args;

use folio_app::auth::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS, TokenConfig};

/// Token issuance settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Signing secret for access tokens
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    #[arg(long, env = "ACCESS_TOKEN_TTL_SECS", default_value_t = DEFAULT_ACCESS_TTL_SECS)]
    pub access_ttl_secs: i64,

    /// Refresh token lifetime in seconds
    #[arg(long, env = "REFRESH_TOKEN_TTL_SECS", default_value_t = DEFAULT_REFRESH_TTL_SECS)]
    pub refresh_ttl_secs: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            jwt_secret: self.jwt_secret.clone(),
            access_ttl_secs: self.access_ttl_secs,
            refresh_ttl_secs: self.refresh_ttl_secs,
        }
    }
}
