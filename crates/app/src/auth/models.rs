//! Auth data models.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::carts::models::CartItem, uuids::TypedUuid};

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Account role carried inside access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Error for role strings outside the enumeration.
#[derive(Debug, Error)]
#[error("unknown role \"{0}\"")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

/// User Model
///
/// Password material never leaves the repository layer.
#[derive(Debug, Clone)]
pub struct User {
    pub uuid: UserUuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New account payload. The password is raw here and hashed by the service.
#[derive(Clone)]
pub struct NewUser {
    pub uuid: UserUuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .field("role", &self.role)
            .finish()
    }
}

/// Access/refresh token pair issued on login, registration, and refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authenticated session: the user plus a fresh token pair.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

/// Profile payload: the user and their server-persisted cart.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub cart: Vec<CartItem>,
}
