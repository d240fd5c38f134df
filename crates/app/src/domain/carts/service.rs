//! Carts service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::models::UserUuid,
    database::Db,
    domain::carts::{
        errors::CartsServiceError,
        models::{CartEntry, CartItem},
        repository::PgCartItemsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    repository: PgCartItemsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<Vec<CartItem>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let items = self.repository.get_cart_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(items)
    }

    async fn replace_cart(
        &self,
        user: UserUuid,
        entries: Vec<CartEntry>,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.delete_cart_items(&mut tx, user).await?;

        for entry in &entries {
            // The client's advisory stock clamp is not trusted here;
            // quantities are only floored to keep the row check satisfied.
            let entry = CartEntry {
                product_uuid: entry.product_uuid,
                quantity: entry.quantity.max(1),
            };

            self.repository.create_cart_item(&mut tx, user, &entry).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.delete_cart_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's server cart, resolved against the live catalog.
    ///
    /// Lines whose product has since been deleted are omitted.
    async fn get_cart(&self, user: UserUuid) -> Result<Vec<CartItem>, CartsServiceError>;

    /// Overwrite the user's server cart wholesale.
    async fn replace_cart(
        &self,
        user: UserUuid,
        entries: Vec<CartEntry>,
    ) -> Result<(), CartsServiceError>;

    /// Empty the user's server cart.
    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::products::models::ProductUuid, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn replace_cart_overwrites_previous_contents() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.seed_user("Ada", "ada@example.com").await;
        let first = ctx.seed_product("First", 100, None, 10).await;
        let second = ctx.seed_product("Second", 200, None, 10).await;

        ctx.carts
            .replace_cart(
                user,
                vec![CartEntry {
                    product_uuid: first.uuid,
                    quantity: 2,
                }],
            )
            .await?;

        ctx.carts
            .replace_cart(
                user,
                vec![CartEntry {
                    product_uuid: second.uuid,
                    quantity: 4,
                }],
            )
            .await?;

        let items = ctx.carts.get_cart(user).await?;

        assert_eq!(items.len(), 1);

        let item = items.first().ok_or("missing item")?;

        assert_eq!(item.product.uuid, second.uuid);
        assert_eq!(item.quantity, 4);

        Ok(())
    }

    #[tokio::test]
    async fn replace_cart_floors_quantity_at_one() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.seed_user("Ada", "ada@example.com").await;
        let product = ctx.seed_product("Floored", 100, None, 10).await;

        ctx.carts
            .replace_cart(
                user,
                vec![CartEntry {
                    product_uuid: product.uuid,
                    quantity: 0,
                }],
            )
            .await?;

        let items = ctx.carts.get_cart(user).await?;

        assert_eq!(items.first().map(|i| i.quantity), Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn replace_cart_unknown_product_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.seed_user("Ada", "ada@example.com").await;

        let result = ctx
            .carts
            .replace_cart(
                user,
                vec![CartEntry {
                    product_uuid: ProductUuid::new(),
                    quantity: 1,
                }],
            )
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::UnknownProduct)),
            "expected UnknownProduct, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_empties_the_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.seed_user("Ada", "ada@example.com").await;
        let product = ctx.seed_product("Cleared", 100, None, 10).await;

        ctx.carts
            .replace_cart(
                user,
                vec![CartEntry {
                    product_uuid: product.uuid,
                    quantity: 3,
                }],
            )
            .await?;

        ctx.carts.clear_cart(user).await?;

        assert!(ctx.carts.get_cart(user).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn get_cart_empty_for_new_user() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.seed_user("Ada", "ada@example.com").await;

        assert!(ctx.carts.get_cart(user).await?.is_empty());

        Ok(())
    }
}
