//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use folio_app::{
    auth::{AccessClaims, AuthSession, MockAuthService, Role, TokenPair, User, UserUuid},
    context::AppContext,
    domain::{
        carts::{MockCartsService, models::CartItem},
        orders::{
            MockOrdersService,
            models::{Order, OrderLine, OrderLineUuid, OrderStatus, OrderUuid, OrderWithUser},
        },
        products::{MockProductsService, models::{Product, ProductUuid}},
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

fn claims(role: Role) -> AccessClaims {
    AccessClaims {
        sub: TEST_USER_UUID.into_uuid(),
        role,
        iat: 0,
        exp: i64::MAX,
    }
}

#[salvo::handler]
pub(crate) async fn inject_user_claims(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_claims(claims(Role::User));
    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
pub(crate) async fn inject_admin_claims(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_claims(claims(Role::Admin));
    ctrl.call_next(req, depot, res).await;
}

// ---- fixtures ----

pub(crate) fn make_user(uuid: UserUuid) -> User {
    User {
        uuid,
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        role: Role::User,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_auth_session(role: Role) -> AuthSession {
    let mut user = make_user(TEST_USER_UUID);

    user.role = role;

    AuthSession {
        user,
        tokens: TokenPair {
            access_token: "test-access-token".to_string(),
            refresh_token: "fr_v1_test.aa".to_string(),
        },
    }
}

pub(crate) fn make_product(uuid: ProductUuid) -> Product {
    Product {
        uuid,
        title: "A Wizard of Earthsea".to_string(),
        author: "Ursula K. Le Guin".to_string(),
        image: "https://img.example.com/earthsea.jpg".to_string(),
        original_price: 1200,
        discount_price: None,
        stock: 7,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_cart_item(quantity: i64) -> CartItem {
    CartItem {
        product: make_product(ProductUuid::new()),
        quantity,
    }
}

pub(crate) fn make_order(user: UserUuid) -> Order {
    let product = make_product(ProductUuid::new());

    Order {
        uuid: OrderUuid::new(),
        user_uuid: user,
        total_amount: 1800,
        status: OrderStatus::Pending,
        lines: vec![OrderLine {
            uuid: OrderLineUuid::new(),
            product_uuid: product.uuid,
            title: product.title,
            image: product.image,
            unit_price: 900,
            quantity: 2,
        }],
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_order_with_user(order: Order, name: &str, email: &str) -> OrderWithUser {
    OrderWithUser {
        order,
        user_name: name.to_string(),
        user_email: email.to_string(),
    }
}

// ---- strict mocks for the services a test does not exercise ----

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();
    products.expect_update_product().never();
    products.expect_delete_product().never();

    products
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_place_order().never();
    orders.expect_get_order().never();
    orders.expect_list_orders().never();
    orders.expect_list_orders_by_user().never();
    orders.expect_update_status().never();

    orders
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_replace_cart().never();
    carts.expect_clear_cart().never();

    carts
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_register().never();
    auth.expect_login().never();
    auth.expect_refresh().never();
    auth.expect_logout().never();
    auth.expect_verify_access().never();
    auth.expect_profile().never();

    auth
}

fn make_state(
    products: MockProductsService,
    orders: MockOrdersService,
    carts: MockCartsService,
    auth: MockAuthService,
) -> Arc<State> {
    Arc::new(State::new(AppContext {
        products: Arc::new(products),
        orders: Arc::new(orders),
        carts: Arc::new(carts),
        auth: Arc::new(auth),
    }))
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    make_state(
        strict_products_mock(),
        strict_orders_mock(),
        strict_carts_mock(),
        auth,
    )
}

// ---- service builders ----

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    let state = make_state(
        products,
        strict_orders_mock(),
        strict_carts_mock(),
        strict_auth_mock(),
    );

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_user_claims)
            .push(route),
    )
}

pub(crate) fn products_service_as_admin(products: MockProductsService, route: Router) -> Service {
    let state = make_state(
        products,
        strict_orders_mock(),
        strict_carts_mock(),
        strict_auth_mock(),
    );

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_admin_claims)
            .push(route),
    )
}

pub(crate) fn authed_orders_service(orders: MockOrdersService, route: Router) -> Service {
    let state = make_state(
        strict_products_mock(),
        orders,
        strict_carts_mock(),
        strict_auth_mock(),
    );

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_user_claims)
            .push(route),
    )
}

pub(crate) fn orders_service_as_admin(orders: MockOrdersService, route: Router) -> Service {
    let state = make_state(
        strict_products_mock(),
        orders,
        strict_carts_mock(),
        strict_auth_mock(),
    );

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_admin_claims)
            .push(route),
    )
}

pub(crate) fn auth_service(auth: MockAuthService, route: Router) -> Service {
    let state = state_with_auth(auth);

    Service::new(Router::new().hoop(inject(state)).push(route))
}

pub(crate) fn authed_auth_service(auth: MockAuthService, route: Router) -> Service {
    let state = state_with_auth(auth);

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_user_claims)
            .push(route),
    )
}

pub(crate) fn authed_carts_service(carts: MockCartsService, route: Router) -> Service {
    let state = make_state(
        strict_products_mock(),
        strict_orders_mock(),
        carts,
        strict_auth_mock(),
    );

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_user_claims)
            .push(route),
    )
}
