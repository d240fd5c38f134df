//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use folio_app::auth::Role;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, handlers::OrderResponse},
    state::State,
};

/// Get Order Handler
///
/// Returns one order. Accessible to the order's owner and to admins.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The order"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing authentication"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the owner"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let claims = depot.claims_or_401()?;

    let order = state
        .app
        .orders
        .get_order(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    if claims.role != Role::Admin && order.user_uuid != claims.user_uuid() {
        return Err(StatusError::forbidden().brief("Access denied"));
    }

    Ok(Json(OrderResponse::from(order)))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use folio_app::{
        auth::UserUuid,
        domain::orders::{MockOrdersService, OrdersServiceError},
    };

    use crate::test_helpers::{
        TEST_USER_UUID, authed_orders_service, make_order, orders_service_as_admin,
    };

    use super::*;

    #[tokio::test]
    async fn test_get_own_order_returns_200() -> TestResult {
        let order = make_order(TEST_USER_UUID);
        let uuid = order.uuid;

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .withf(move |o| *o == uuid)
            .return_once(move |_| Ok(order));

        let service =
            authed_orders_service(orders, Router::with_path("orders/{order}").get(handler));

        let mut res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(body.uuid, uuid.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_other_users_order_returns_403() -> TestResult {
        let order = make_order(UserUuid::new());
        let uuid = order.uuid;

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .return_once(move |_| Ok(order));

        let service =
            authed_orders_service(orders, Router::with_path("orders/{order}").get(handler));

        let res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_can_get_any_order() -> TestResult {
        let order = make_order(UserUuid::new());
        let uuid = order.uuid;

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .return_once(move |_| Ok(order));

        let service =
            orders_service_as_admin(orders, Router::with_path("orders/{order}").get(handler));

        let res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_order_returns_404() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .return_once(|_| Err(OrdersServiceError::NotFound));

        let service =
            authed_orders_service(orders, Router::with_path("orders/{order}").get(handler));

        let res = TestClient::get(format!("http://example.com/orders/{}", Uuid::now_v7()))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
