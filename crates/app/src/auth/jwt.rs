//! Access token encoding and validation.

use jiff::Timestamp;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::models::{Role, UserUuid};

/// Claims embedded in every access token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Owning user UUID.
    pub sub: Uuid,
    /// Role at issuance time.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl AccessClaims {
    #[must_use]
    pub fn user_uuid(&self) -> UserUuid {
        UserUuid::from_uuid(self.sub)
    }
}

pub(crate) fn issue_access_token(
    secret: &str,
    user: UserUuid,
    role: Role,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = Timestamp::now().as_second();

    let claims = AccessClaims {
        sub: user.into_uuid(),
        role,
        iat,
        exp: iat + ttl_secs,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub(crate) fn verify_access_token(
    secret: &str,
    token: &str,
) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);

    validation.leeway = 0;

    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_round_trips_claims() {
        let user = UserUuid::new();
        let token = issue_access_token(SECRET, user, Role::Admin, 900)
            .expect("token should encode");

        let claims = verify_access_token(SECRET, &token).expect("token should verify");

        assert_eq!(claims.sub, user.into_uuid());
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_access_token(SECRET, UserUuid::new(), Role::User, -10)
            .expect("token should encode");

        assert!(verify_access_token(SECRET, &token).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_access_token(SECRET, UserUuid::new(), Role::User, 900)
            .expect("token should encode");

        assert!(verify_access_token("other-secret", &token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify_access_token(SECRET, "not-a-jwt").is_err());
    }
}
