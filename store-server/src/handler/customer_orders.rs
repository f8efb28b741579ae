//! Customer Order Handlers
//!
//! Storefront endpoints. Every read and write is scoped to the
//! authenticated customer; a foreign order is indistinguishable from a
//! missing one. DELETE cancels the order and only from `pending`.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{OrderCreate, OrderList, OrderWithDetails};
use shared::response::ApiResponse;

use crate::common::{AppError, ok};
use crate::orders::service::default_cancel_reason;
use crate::server::ServerState;
use crate::server::auth::CurrentUser;

/// PATCH body; `customer_notes` is the entire allow-list of
/// customer-mutable fields, other keys are ignored
#[derive(Debug, Deserialize)]
pub struct PatchOrderRequest {
    pub customer_notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// POST /api/orders - place an order
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(data): Json<OrderCreate>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let order = state.orders.create_order(user.id, data).await?;
    Ok(ok(order))
}

/// GET /api/orders - list own orders
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<OrderList>>, AppError> {
    let orders = state.orders.list_orders_for_customer(user.id).await?;
    let count = orders.len();
    Ok(ok(OrderList { orders, count }))
}

/// GET /api/orders/{id} - own order with items and history
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let order = state.orders.get_order_for_customer(id, user.id).await?;
    Ok(ok(order))
}

/// PATCH /api/orders/{id} - update allow-listed fields
pub async fn patch(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<PatchOrderRequest>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let Some(notes) = request.customer_notes else {
        return Err(AppError::Validation(
            "No valid fields to update".to_string(),
        ));
    };

    let order = state
        .orders
        .update_customer_notes(id, user.id, notes)
        .await?;
    Ok(ok(order))
}

/// DELETE /api/orders/{id} - cancel (only while pending)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    body: Option<Json<CancelRequest>>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let actor = user.actor();
    let reason = body
        .and_then(|Json(b)| b.reason)
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| default_cancel_reason(actor).to_string());

    let order = state.orders.cancel(id, reason, actor).await?;
    Ok(ok(order))
}
