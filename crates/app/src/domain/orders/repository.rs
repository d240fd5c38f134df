//! Orders Repository

use std::str::FromStr;

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    auth::models::UserUuid,
    domain::{
        orders::models::{OrderLine, OrderLineUuid, OrderStatus, OrderUuid},
        products::{
            models::ProductUuid,
            repository::{price_to_i64, try_get_price},
        },
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_LINE_SQL: &str = include_str!("sql/create_order_line.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_LINES_SQL: &str = include_str!("sql/get_order_lines.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const LIST_ORDERS_BY_USER_SQL: &str = include_str!("sql/list_orders_by_user.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");

/// Order row without its lines.
#[derive(Debug, Clone)]
pub(crate) struct OrderRow {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub total_amount: u64,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order row joined with the owning user's contact details.
#[derive(Debug, Clone)]
pub(crate) struct OrderWithUserRow {
    pub order: OrderRow,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        user: UserUuid,
        total_amount: u64,
        status: OrderStatus,
    ) -> Result<(Timestamp, Timestamp), sqlx::Error> {
        let (created_at, updated_at): (SqlxTimestamp, SqlxTimestamp) = query_as(CREATE_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .bind(price_to_i64(total_amount, "total_amount")?)
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await?;

        Ok((created_at.to_jiff(), updated_at.to_jiff()))
    }

    pub(crate) async fn create_order_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        position: i64,
        line: &OrderLine,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_ORDER_LINE_SQL)
            .bind(line.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(line.product_uuid.into_uuid())
            .bind(&line.title)
            .bind(&line.image)
            .bind(price_to_i64(line.unit_price, "unit_price")?)
            .bind(line.quantity)
            .bind(position)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn find_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<OrderRow>, sqlx::Error> {
        query_as::<Postgres, OrderRow>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderLine>, sqlx::Error> {
        query_as::<Postgres, OrderLine>(GET_ORDER_LINES_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<OrderWithUserRow>, sqlx::Error> {
        query_as::<Postgres, OrderWithUserRow>(LIST_ORDERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders_by_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRow>, sqlx::Error> {
        query_as::<Postgres, OrderRow>(LIST_ORDERS_BY_USER_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Option<OrderRow>, sqlx::Error> {
        query_as::<Postgres, OrderRow>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_optional(&mut **tx)
            .await
    }
}

fn try_get_status(row: &PgRow) -> sqlx::Result<OrderStatus> {
    let status: String = row.try_get("status")?;

    OrderStatus::from_str(&status).map_err(|e| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            total_amount: try_get_price(row, "total_amount")?,
            status: try_get_status(row)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderWithUserRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order: OrderRow::from_row(row)?,
            user_name: row.try_get("user_name")?,
            user_email: row.try_get("user_email")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderLineUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            title: row.try_get("title")?,
            image: row.try_get("image")?,
            unit_price: try_get_price(row, "unit_price")?,
            quantity: row.try_get("quantity")?,
        })
    }
}
