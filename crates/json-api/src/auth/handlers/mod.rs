//! Auth Handlers

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::auth::models::User;

pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod profile;
pub(crate) mod refresh;
pub(crate) mod register;
pub(crate) mod sync_cart;

/// User payload returned by auth endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserResponse {
    /// User UUID
    pub uuid: Uuid,

    /// Display name
    pub name: String,

    /// Login email
    pub email: String,

    /// Account role
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            uuid: user.uuid.into_uuid(),
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
        }
    }
}

/// Token plus user payload returned on login and registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AuthResponse {
    /// Access token for the Authorization header
    pub token: String,

    /// Authenticated user
    pub user: UserResponse,
}

/// Plain confirmation message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}
