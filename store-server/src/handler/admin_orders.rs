//! Admin Order Handlers
//!
//! Order management endpoints for the admin console. Authorization is
//! enforced by the route layer; transition legality belongs to the
//! policy, not here.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{
    OrderFilter, OrderList, OrderStatistics, OrderStatusHistory, OrderWithDetails,
};
use shared::response::ApiResponse;

use crate::common::{AppError, ok};
use crate::orders::policy::TransitionFields;
use crate::orders::service::default_cancel_reason;
use crate::server::ServerState;
use crate::server::auth::CurrentUser;

/// Body of the generic status-update route
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub order_id: i64,
    pub new_status: String,
    pub tracking_number: Option<String>,
    pub courier: Option<String>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApproveRequest {
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveringRequest {
    pub tracking_number: Option<String>,
    pub courier: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub payment_status: String,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct PendingCountResponse {
    pub count: i64,
}

/// GET /api/admin/orders - list with optional filters
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<ApiResponse<OrderList>>, AppError> {
    let orders = state.orders.list_orders(filter).await?;
    let count = orders.len();
    Ok(ok(OrderList { orders, count }))
}

/// GET /api/admin/orders/{id}
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let order = state.orders.get_order(id).await?;
    Ok(ok(order))
}

/// GET /api/admin/orders/{id}/history
pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<OrderStatusHistory>>>, AppError> {
    let rows = state.orders.get_status_history(id).await?;
    Ok(ok(rows))
}

/// PUT /api/admin/orders/status - generic status update
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let fields = TransitionFields {
        tracking_number: request.tracking_number,
        courier: request.courier,
        admin_notes: request.admin_notes,
        ..Default::default()
    };

    let order = state
        .orders
        .update_status(request.order_id, &request.new_status, user.actor(), fields)
        .await?;
    Ok(ok(order))
}

/// POST /api/admin/orders/{id}/approve
pub async fn approve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    body: Option<Json<ApproveRequest>>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let admin_notes = body.and_then(|Json(b)| b.admin_notes);
    let order = state.orders.approve(id, admin_notes, user.actor()).await?;
    Ok(ok(order))
}

/// POST /api/admin/orders/{id}/delivering
pub async fn delivering(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<DeliveringRequest>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    // Missing fields become empty strings; the policy rejects them with
    // the specific InvalidInput message
    let order = state
        .orders
        .mark_delivering(
            id,
            request.tracking_number.unwrap_or_default(),
            request.courier.unwrap_or_default(),
            user.actor(),
        )
        .await?;
    Ok(ok(order))
}

/// POST /api/admin/orders/{id}/delivered
pub async fn delivered(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let order = state.orders.mark_delivered(id, user.actor()).await?;
    Ok(ok(order))
}

/// POST /api/admin/orders/{id}/complete
pub async fn complete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let order = state.orders.mark_complete(id, user.actor()).await?;
    Ok(ok(order))
}

/// POST /api/admin/orders/{id}/cancel
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

/// PUT /api/admin/orders/{id}/payment-status
pub async fn payment_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(request): Json<PaymentStatusRequest>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    let order = state
        .orders
        .update_payment_status(id, &request.payment_status, request.payment_reference)
        .await?;
    Ok(ok(order))
}

/// PUT /api/admin/orders/{id}/notes
pub async fn notes(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(request): Json<NotesRequest>,
) -> Result<Json<ApiResponse<OrderWithDetails>>, AppError> {
    if request.notes.trim().is_empty() {
        return Err(AppError::Validation("notes is required".to_string()));
    }
    let order = state.orders.add_admin_notes(id, request.notes).await?;
    Ok(ok(order))
}

/// GET /api/admin/orders/statistics
pub async fn statistics(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<OrderStatistics>>, AppError> {
    let stats = state.orders.statistics().await?;
    Ok(ok(stats))
}

/// GET /api/admin/orders/pending-count - dashboard badge
pub async fn pending_count(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<PendingCountResponse>>, AppError> {
    let count = state.orders.pending_count().await?;
    Ok(ok(PendingCountResponse { count }))
}
