//! Customer Order Routes
//!
//! The storefront's order surface. Authenticated customers only ever
//! see their own orders; DELETE is cancel-if-pending, not deletion.

use axum::Router;
use axum::routing::get;

use crate::handler;
use crate::server::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/orders",
            get(handler::customer_orders::list).post(handler::customer_orders::create),
        )
        .route(
            "/api/orders/{id}",
            get(handler::customer_orders::get)
                .patch(handler::customer_orders::patch)
                .delete(handler::customer_orders::cancel),
        )
}
