//! Admin Order Routes
//!
//! The admin console's order management surface. Every route requires
//! an authenticated administrator; any admin may invoke any transition.

use axum::Router;
use axum::routing::{get, post, put};

use crate::handler;
use crate::server::ServerState;
use crate::server::auth::require_admin;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/orders", get(handler::admin_orders::list))
        .route(
            "/api/admin/orders/statistics",
            get(handler::admin_orders::statistics),
        )
        .route(
            "/api/admin/orders/pending-count",
            get(handler::admin_orders::pending_count),
        )
        // Generic status update (console dropdown)
        .route(
            "/api/admin/orders/status",
            put(handler::admin_orders::update_status),
        )
        .route("/api/admin/orders/{id}", get(handler::admin_orders::get))
        .route(
            "/api/admin/orders/{id}/history",
            get(handler::admin_orders::history),
        )
        // Convenience routes, one per named transition
        .route(
            "/api/admin/orders/{id}/approve",
            post(handler::admin_orders::approve),
        )
        .route(
            "/api/admin/orders/{id}/delivering",
            post(handler::admin_orders::delivering),
        )
        .route(
            "/api/admin/orders/{id}/delivered",
            post(handler::admin_orders::delivered),
        )
        .route(
            "/api/admin/orders/{id}/complete",
            post(handler::admin_orders::complete),
        )
        .route(
            "/api/admin/orders/{id}/cancel",
            post(handler::admin_orders::cancel),
        )
        .route(
            "/api/admin/orders/{id}/payment-status",
            put(handler::admin_orders::payment_status),
        )
        .route(
            "/api/admin/orders/{id}/notes",
            put(handler::admin_orders::notes),
        )
        .route_layer(axum::middleware::from_fn(require_admin))
}
