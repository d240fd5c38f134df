//! App Router

use salvo::Router;

use crate::{auth, orders, products};

pub fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("auth")
                .push(Router::with_path("register").post(auth::register::handler))
                .push(Router::with_path("login").post(auth::login::handler))
                .push(Router::with_path("refresh").post(auth::refresh::handler))
                .push(Router::with_path("logout").post(auth::logout::handler))
                .push(
                    Router::new()
                        .hoop(auth::middleware::handler)
                        .push(Router::with_path("profile").get(auth::profile::handler))
                        .push(Router::with_path("sync-cart").post(auth::sync_cart::handler)),
                ),
        )
        .push(
            Router::with_path("orders")
                .hoop(auth::middleware::handler)
                .get(orders::index::handler)
                .post(orders::create::handler)
                .push(Router::with_path("my-orders").get(orders::my_orders::handler))
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .put(orders::update::handler),
                ),
        )
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .push(
                    Router::new()
                        .hoop(auth::middleware::handler)
                        .post(products::create::handler),
                )
                .push(Router::with_path("{product}").get(products::get::handler))
                .push(
                    Router::new().hoop(auth::middleware::handler).push(
                        Router::with_path("{product}")
                            .put(products::update::handler)
                            .delete(products::delete::handler),
                    ),
                ),
        )
}
