//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use folio_app::auth::{AccessClaims, Role};

const CLAIMS_KEY: &str = "auth_claims";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_claims(&mut self, claims: AccessClaims);

    /// Claims placed by the auth middleware, or 401 when absent.
    fn claims_or_401(&self) -> Result<AccessClaims, StatusError>;

    /// Claims with the admin role, or 403 for any other caller.
    fn admin_or_403(&self) -> Result<AccessClaims, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_claims(&mut self, claims: AccessClaims) {
        self.insert(CLAIMS_KEY, claims);
    }

    fn claims_or_401(&self) -> Result<AccessClaims, StatusError> {
        self.get::<AccessClaims>(CLAIMS_KEY)
            .copied()
            .map_err(|_missing| StatusError::unauthorized().brief("Missing authentication"))
    }

    fn admin_or_403(&self) -> Result<AccessClaims, StatusError> {
        let claims = self.claims_or_401()?;

        if claims.role != Role::Admin {
            return Err(StatusError::forbidden().brief("Admins only"));
        }

        Ok(claims)
    }
}
