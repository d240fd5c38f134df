//! Auth repository.

use std::str::FromStr;

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::auth::models::{NewUser, Role, User, UserUuid};

const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const FIND_USER_BY_UUID_SQL: &str = include_str!("sql/find_user_by_uuid.sql");
const SET_REFRESH_TOKEN_SQL: &str = include_str!("sql/set_refresh_token.sql");
const ROTATE_REFRESH_TOKEN_SQL: &str = include_str!("sql/rotate_refresh_token.sql");
const CLEAR_REFRESH_TOKEN_SQL: &str = include_str!("sql/clear_refresh_token.sql");

/// User row with its password hash, used only during login.
#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAuthRepository;

impl PgAuthRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(&user.name)
            .bind(&user.email)
            .bind(password_hash)
            .bind(user.role.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_user_by_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        query_as::<Postgres, UserCredentials>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_user_by_uuid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<User>, sqlx::Error> {
        query_as::<Postgres, User>(FIND_USER_BY_UUID_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn set_refresh_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        token_digest: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(SET_REFRESH_TOKEN_SQL)
            .bind(user.into_uuid())
            .bind(token_digest)
            .bind(SqlxTimestamp::from(expires_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Swap the stored digest in one statement.
    ///
    /// Matching on the old digest makes rotation atomic: once a refresh
    /// succeeds, a replay of the superseded token matches nothing.
    pub(crate) async fn rotate_refresh_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        old_digest: &str,
        new_digest: &str,
        expires_at: Timestamp,
    ) -> Result<Option<User>, sqlx::Error> {
        query_as::<Postgres, User>(ROTATE_REFRESH_TOKEN_SQL)
            .bind(old_digest)
            .bind(new_digest)
            .bind(SqlxTimestamp::from(expires_at))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn clear_refresh_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_digest: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_REFRESH_TOKEN_SQL)
            .bind(token_digest)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn try_get_role(row: &PgRow) -> sqlx::Result<Role> {
    let role: String = row.try_get("role")?;

    Role::from_str(&role).map_err(|e| sqlx::Error::ColumnDecode {
        index: "role".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: try_get_role(row)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for UserCredentials {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user: User::from_row(row)?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}
