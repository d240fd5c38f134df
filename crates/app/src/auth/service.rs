//! Auth service.

use std::fmt;

use argon2::{
    Argon2,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    auth::{
        errors::AuthServiceError,
        jwt::{self, AccessClaims},
        models::{AuthSession, NewUser, Profile, TokenPair, User, UserUuid},
        repository::PgAuthRepository,
        token::{
            digest_refresh_token, format_refresh_token, generate_refresh_token_secret,
            parse_refresh_token,
        },
    },
    database::Db,
    domain::carts::repository::PgCartItemsRepository,
};

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Token issuance settings.
#[derive(Clone)]
pub struct TokenConfig {
    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl TokenConfig {
    #[must_use]
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret,
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("jwt_secret", &"**redacted**")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
    cart_items: PgCartItemsRepository,
    tokens: TokenConfig,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db, tokens: TokenConfig) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
            cart_items: PgCartItemsRepository::new(),
            tokens,
        }
    }

    fn hash_password(password: &str) -> Result<String, AuthServiceError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_hash_error| AuthServiceError::PasswordHash)
    }

    fn verify_password(password_hash: &str, password: &str) -> Result<(), AuthServiceError> {
        let parsed =
            PasswordHash::new(password_hash).map_err(|_parse| AuthServiceError::PasswordHash)?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(PasswordHashError::Password) => Err(AuthServiceError::InvalidCredentials),
            Err(_verify) => Err(AuthServiceError::PasswordHash),
        }
    }

    fn refresh_expiry(&self) -> Result<Timestamp, AuthServiceError> {
        Timestamp::from_second(Timestamp::now().as_second() + self.tokens.refresh_ttl_secs)
            .map_err(AuthServiceError::Time)
    }

    /// Issue a token pair and persist the refresh digest on the user row.
    ///
    /// The stored digest is overwritten, so at most one refresh token is
    /// live per user at any time.
    async fn issue_tokens(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
    ) -> Result<TokenPair, AuthServiceError> {
        let access_token = jwt::issue_access_token(
            &self.tokens.jwt_secret,
            user.uuid,
            user.role,
            self.tokens.access_ttl_secs,
        )
        .map_err(AuthServiceError::Jwt)?;

        let secret = generate_refresh_token_secret();
        let refresh_token = format_refresh_token(Uuid::now_v7(), &secret);
        let expires_at = self.refresh_expiry()?;

        self.repository
            .set_refresh_token(tx, user.uuid, &digest_refresh_token(&refresh_token), expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn register(&self, new_user: NewUser) -> Result<AuthSession, AuthServiceError> {
        let password_hash = Self::hash_password(&new_user.password)?;

        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .create_user(&mut tx, &new_user, &password_hash)
            .await?;

        let tokens = self.issue_tokens(&mut tx, &user).await?;

        tx.commit().await?;

        Ok(AuthSession { user, tokens })
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let credentials = self
            .repository
            .find_user_by_email(&mut tx, email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        Self::verify_password(&credentials.password_hash, password)?;

        let tokens = self.issue_tokens(&mut tx, &credentials.user).await?;

        tx.commit().await?;

        Ok(AuthSession {
            user: credentials.user,
            tokens,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        // Reject malformed tokens before touching storage.
        parse_refresh_token(refresh_token)
            .map_err(|_parse| AuthServiceError::InvalidRefreshToken)?;

        let secret = generate_refresh_token_secret();
        let new_refresh_token = format_refresh_token(Uuid::now_v7(), &secret);
        let expires_at = self.refresh_expiry()?;

        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .rotate_refresh_token(
                &mut tx,
                &digest_refresh_token(refresh_token),
                &digest_refresh_token(&new_refresh_token),
                expires_at,
            )
            .await?
            .ok_or(AuthServiceError::InvalidRefreshToken)?;

        let access_token = jwt::issue_access_token(
            &self.tokens.jwt_secret,
            user.uuid,
            user.role,
            self.tokens.access_ttl_secs,
        )
        .map_err(AuthServiceError::Jwt)?;

        tx.commit().await?;

        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh_token,
        })
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthServiceError> {
        let mut tx = self.db.begin().await?;

        // Best effort: logging out with an unknown token is not an error.
        let _cleared = self
            .repository
            .clear_refresh_token(&mut tx, &digest_refresh_token(refresh_token))
            .await?;

        tx.commit().await?;

        Ok(())
    }

    fn verify_access(&self, access_token: &str) -> Result<AccessClaims, AuthServiceError> {
        jwt::verify_access_token(&self.tokens.jwt_secret, access_token)
            .map_err(|_verify| AuthServiceError::InvalidToken)
    }

    async fn profile(&self, user: UserUuid) -> Result<Profile, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let found = self
            .repository
            .find_user_by_uuid(&mut tx, user)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let cart = self.cart_items.get_cart_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(Profile { user: found, cart })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and issue its first token pair.
    async fn register(&self, new_user: NewUser) -> Result<AuthSession, AuthServiceError>;

    /// Verify credentials and issue a fresh token pair.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthServiceError>;

    /// Exchange a live refresh token for a new pair, invalidating the old one.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError>;

    /// Invalidate the presented refresh token. Unknown tokens are ignored.
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthServiceError>;

    /// Validate an access token's signature and expiry.
    fn verify_access(&self, access_token: &str) -> Result<AccessClaims, AuthServiceError>;

    /// Fetch the user and their server cart.
    async fn profile(&self, user: UserUuid) -> Result<Profile, AuthServiceError>;
}
