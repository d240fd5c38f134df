//! Products Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use jiff_sqlx::Timestamp as SqlxTimestamp;

use crate::domain::products::models::{NewProduct, Product, ProductUpdate, ProductUuid};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(LIST_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProduct,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(&product.title)
            .bind(&product.author)
            .bind(&product.image)
            .bind(price_to_i64(product.original_price, "original_price")?)
            .bind(
                product
                    .discount_price
                    .map(|price| price_to_i64(price, "discount_price"))
                    .transpose()?,
            )
            .bind(product.stock)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        update: &ProductUpdate,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(&update.title)
            .bind(&update.author)
            .bind(&update.image)
            .bind(price_to_i64(update.original_price, "original_price")?)
            .bind(
                update
                    .discount_price
                    .map(|price| price_to_i64(price, "discount_price"))
                    .transpose()?,
            )
            .bind(update.stock)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Conditionally decrement stock in a single atomic statement.
    ///
    /// Returns the updated product when the decrement matched, `None` when
    /// the product is missing or its stock is below `quantity`. The
    /// predicate is re-evaluated under the row lock, so concurrent
    /// reservations can never drive stock negative.
    pub(crate) async fn reserve_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<Option<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(RESERVE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(quantity)
            .fetch_optional(&mut **tx)
            .await
    }
}

pub(crate) fn price_to_i64(price: u64, column: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(price).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn try_get_price(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    let price_i64: i64 = row.try_get(column)?;

    u64::try_from(price_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_price = row
            .try_get::<Option<i64>, _>("discount_price")?
            .map(|price| {
                u64::try_from(price).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "discount_price".to_string(),
                    source: Box::new(e),
                })
            })
            .transpose()?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            image: row.try_get("image")?,
            original_price: try_get_price(row, "original_price")?,
            discount_price,
            stock: row.try_get("stock")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
