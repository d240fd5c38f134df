//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};

use crate::{
    auth::models::UserUuid,
    database::Db,
    domain::{
        orders::{
            errors::OrdersServiceError,
            models::{
                NewOrder, Order, OrderLine, OrderLineUuid, OrderStatus, OrderUuid, OrderWithUser,
            },
            repository::{OrderRow, PgOrdersRepository},
        },
        products::{models::ProductUuid, repository::PgProductsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
    products: PgProductsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
            products: PgProductsRepository::new(),
        }
    }

    /// Reserve stock for one requested line and snapshot the product.
    async fn reserve_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<OrderLine, OrdersServiceError> {
        let reserved = self.products.reserve_stock(tx, product, quantity).await?;

        let Some(snapshot) = reserved else {
            // The decrement matched no row: the product is either missing
            // or short on stock. Re-read to tell the two apart.
            return match self.products.find_product(tx, product).await? {
                None => Err(OrdersServiceError::ProductNotFound { product }),
                Some(found) => Err(OrdersServiceError::InsufficientStock {
                    product: found.uuid,
                    title: found.title,
                    requested: quantity,
                    available: found.stock,
                }),
            };
        };

        let unit_price = snapshot.effective_price();

        Ok(OrderLine {
            uuid: OrderLineUuid::new(),
            product_uuid: snapshot.uuid,
            title: snapshot.title,
            image: snapshot.image,
            unit_price,
            quantity,
        })
    }

    async fn load_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        row: OrderRow,
    ) -> Result<Order, OrdersServiceError> {
        let lines = self.repository.get_order_lines(tx, row.uuid).await?;

        Ok(Order {
            uuid: row.uuid,
            user_uuid: row.user_uuid,
            total_amount: row.total_amount,
            status: row.status,
            lines,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn place_order(&self, order: NewOrder) -> Result<Order, OrdersServiceError> {
        if order.lines.is_empty() {
            return Err(OrdersServiceError::EmptyOrder);
        }

        if order.lines.iter().any(|line| line.quantity < 1) {
            return Err(OrdersServiceError::InvalidQuantity);
        }

        if order.declared_total == 0 {
            return Err(OrdersServiceError::InvalidTotal);
        }

        // One transaction end to end: a failed line rolls back every
        // reservation made for earlier lines, so no stock is stranded on an
        // order that is never created.
        let mut tx = self.db.begin().await?;

        let mut lines = Vec::with_capacity(order.lines.len());

        for request in &order.lines {
            let line = self
                .reserve_line(&mut tx, request.product_uuid, request.quantity)
                .await?;

            lines.push(line);
        }

        let (created_at, updated_at) = self
            .repository
            .create_order(
                &mut tx,
                order.uuid,
                order.user_uuid,
                order.declared_total,
                OrderStatus::Pending,
            )
            .await?;

        for (position, line) in lines.iter().enumerate() {
            let position = i64::try_from(position)?;

            self.repository
                .create_order_line(&mut tx, order.uuid, position, line)
                .await?;
        }

        tx.commit().await?;

        Ok(Order {
            uuid: order.uuid,
            user_uuid: order.user_uuid,
            total_amount: order.declared_total,
            status: OrderStatus::Pending,
            lines,
            created_at,
            updated_at,
        })
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let row = self
            .repository
            .find_order(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let order = self.load_order(&mut tx, row).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<OrderWithUser>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows = self.repository.list_orders(&mut tx).await?;

        let mut orders = Vec::with_capacity(rows.len());

        for row in rows {
            let order = self.load_order(&mut tx, row.order).await?;

            orders.push(OrderWithUser {
                order,
                user_name: row.user_name,
                user_email: row.user_email,
            });
        }

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_orders_by_user(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows = self.repository.list_orders_by_user(&mut tx, user).await?;

        let mut orders = Vec::with_capacity(rows.len());

        for row in rows {
            orders.push(self.load_order(&mut tx, row).await?);
        }

        tx.commit().await?;

        Ok(orders)
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let row = self
            .repository
            .update_status(&mut tx, order, status)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let order = self.load_order(&mut tx, row).await?;

        tx.commit().await?;

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Reserve stock for every requested line and persist the order.
    ///
    /// The declared total is recorded as provided; it is not recomputed
    /// from the snapshotted unit prices.
    async fn place_order(&self, order: NewOrder) -> Result<Order, OrdersServiceError>;

    /// Retrieve a single order with its lines.
    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Retrieve all orders, newest first, with owner contact details.
    async fn list_orders(&self) -> Result<Vec<OrderWithUser>, OrdersServiceError>;

    /// Retrieve one user's orders, newest first.
    async fn list_orders_by_user(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// Overwrite an order's status. Any status is accepted from any status.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError>;
}
