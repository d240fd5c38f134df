//! Cart Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    auth::models::UserUuid,
    domain::carts::models::{CartEntry, CartItem},
    domain::products::models::Product,
};

const GET_CART_ITEMS_SQL: &str = include_str!("sql/get_cart_items.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("sql/delete_cart_items.sql");
const CREATE_CART_ITEM_SQL: &str = include_str!("sql/create_cart_item.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        query_as::<Postgres, CartItem>(GET_CART_ITEMS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn delete_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEMS_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn create_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        entry: &CartEntry,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_CART_ITEM_SQL)
            .bind(user.into_uuid())
            .bind(entry.product_uuid.into_uuid())
            .bind(entry.quantity)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CartItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product: Product::from_row(row)?,
            quantity: row.try_get("quantity")?,
        })
    }
}
