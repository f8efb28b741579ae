//! Order Lifecycle Service
//!
//! Orchestrates every order mutation: load, policy check, atomic store
//! apply, reload. Each public operation is a thin named wrapper over the
//! one generic `transition`, so behavior stays uniform. The service is
//! handed its pool at startup; nothing here reaches for globals.

use sqlx::SqlitePool;

use shared::models::{
    Actor, Order, OrderCreate, OrderFilter, OrderStatistics, OrderStatus, OrderStatusHistory,
    OrderWithDetails, PaymentStatus,
};

use crate::db::repository::order as order_repo;
use crate::db::repository::order::{HistoryEntry, StatusMutation, TransitionOutcome};

use super::error::{OrderError, OrderResult};
use super::policy::{self, TransitionFields};
use super::statistics;

#[derive(Clone, Debug)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========== Transitions ==========

    pub async fn approve(
        &self,
        order_id: i64,
        admin_notes: Option<String>,
        actor: Actor,
    ) -> OrderResult<OrderWithDetails> {
        let fields = TransitionFields {
            admin_notes,
            ..Default::default()
        };
        self.transition(order_id, OrderStatus::Approved, actor, fields)
            .await
    }

    pub async fn mark_delivering(
        &self,
        order_id: i64,
        tracking_number: String,
        courier: String,
        actor: Actor,
    ) -> OrderResult<OrderWithDetails> {
        let fields = TransitionFields {
            tracking_number: Some(tracking_number),
            courier: Some(courier),
            ..Default::default()
        };
        self.transition(order_id, OrderStatus::Delivering, actor, fields)
            .await
    }

    pub async fn mark_delivered(&self, order_id: i64, actor: Actor) -> OrderResult<OrderWithDetails> {
        self.transition(
            order_id,
            OrderStatus::Delivered,
            actor,
            TransitionFields::default(),
        )
        .await
    }

    pub async fn mark_complete(&self, order_id: i64, actor: Actor) -> OrderResult<OrderWithDetails> {
        self.transition(
            order_id,
            OrderStatus::Complete,
            actor,
            TransitionFields::default(),
        )
        .await
    }

    pub async fn cancel(
        &self,
        order_id: i64,
        reason: String,
        actor: Actor,
    ) -> OrderResult<OrderWithDetails> {
        let fields = TransitionFields {
            cancellation_reason: Some(reason),
            ..Default::default()
        };
        self.transition(order_id, OrderStatus::Cancelled, actor, fields)
            .await
    }

    /// Generic status update (admin console's bulk dropdown). The target
    /// string is validated before any store access; an omitted
    /// cancellation reason gets the admin default.
    pub async fn update_status(
        &self,
        order_id: i64,
        new_status: &str,
        actor: Actor,
        mut fields: TransitionFields,
    ) -> OrderResult<OrderWithDetails> {
        let target = OrderStatus::parse(new_status)
            .ok_or_else(|| OrderError::InvalidInput(format!("Invalid status: {new_status}")))?;

        if target == OrderStatus::Cancelled && fields.cancellation_reason.is_none() {
            fields.cancellation_reason = Some(default_cancel_reason(actor).to_string());
        }

        self.transition(order_id, target, actor, fields).await
    }

    /// The one generic transition path.
    ///
    /// Algorithm: (1) load (owner-scoped for customers), (2) policy
    /// check, (3) build mutation + ledger entry, (4) guarded atomic
    /// apply, (5) reload the aggregate. A store failure surfaces as-is;
    /// nothing is retried here.
    async fn transition(
        &self,
        order_id: i64,
        target: OrderStatus,
        actor: Actor,
        fields: TransitionFields,
    ) -> OrderResult<OrderWithDetails> {
        let order = self.load_for_actor(order_id, actor).await?;

        policy::check(order.status, target, actor)?;
        policy::validate_fields(target, &fields)?;

        let mutation = StatusMutation {
            status: target,
            tracking_number: fields.tracking_number,
            courier: fields.courier,
            admin_notes: fields.admin_notes,
            cancellation_reason: fields.cancellation_reason,
        };
        let note = mutation
            .cancellation_reason
            .clone()
            .or_else(|| mutation.admin_notes.clone());
        let history = HistoryEntry {
            previous_status: Some(order.status),
            new_status: target,
            is_admin: actor.is_admin(),
            actor_id: Some(actor.id()),
            note,
        };

        match order_repo::apply_transition(&self.pool, order_id, order.status, &mutation, &history)
            .await?
        {
            TransitionOutcome::Applied => {}
            TransitionOutcome::Stale { actual } => {
                // A concurrent writer moved the order first. Re-check the
                // policy against the fresh status so the loser gets the
                // specific rejection rather than a silent overwrite.
                policy::check(actual, target, actor)?;
                return Err(OrderError::Store(format!(
                    "Order {order_id} was modified concurrently; re-fetch and retry"
                )));
            }
            TransitionOutcome::Missing => {
                return Err(OrderError::NotFound(format!("Order {order_id} not found")));
            }
        }

        tracing::info!(
            order_id,
            from = %order.status,
            to = %target,
            is_admin = actor.is_admin(),
            actor_id = actor.id(),
            "Order status updated"
        );

        self.get_order(order_id).await
    }

    // ========== Metadata updates (no state-machine involvement) ==========

    pub async fn update_payment_status(
        &self,
        order_id: i64,
        payment_status: &str,
        payment_reference: Option<String>,
    ) -> OrderResult<OrderWithDetails> {
        let status = PaymentStatus::parse(payment_status).ok_or_else(|| {
            OrderError::InvalidInput(format!("Invalid payment status: {payment_status}"))
        })?;

        let updated = order_repo::update_payment_status(
            &self.pool,
            order_id,
            status,
            payment_reference.as_deref(),
        )
        .await?;
        if !updated {
            return Err(OrderError::NotFound(format!("Order {order_id} not found")));
        }

        tracing::info!(order_id, payment_status = %status, "Payment status updated");

        self.get_order(order_id).await
    }

    pub async fn add_admin_notes(
        &self,
        order_id: i64,
        notes: String,
    ) -> OrderResult<OrderWithDetails> {
        let updated = order_repo::update_admin_notes(&self.pool, order_id, &notes).await?;
        if !updated {
            return Err(OrderError::NotFound(format!("Order {order_id} not found")));
        }
        self.get_order(order_id).await
    }

    /// Customer-side PATCH; `customer_notes` is the whole allow-list
    pub async fn update_customer_notes(
        &self,
        order_id: i64,
        customer_id: i64,
        notes: String,
    ) -> OrderResult<OrderWithDetails> {
        let updated =
            order_repo::update_customer_notes(&self.pool, order_id, customer_id, &notes).await?;
        if !updated {
            return Err(not_found_for_customer(order_id));
        }
        self.get_order(order_id).await
    }

    // ========== Creation ==========

    pub async fn create_order(
        &self,
        customer_id: i64,
        data: OrderCreate,
    ) -> OrderResult<OrderWithDetails> {
        if data.items.is_empty() {
            return Err(OrderError::InvalidInput(
                "Order must contain at least one item".to_string(),
            ));
        }
        for item in &data.items {
            if item.quantity <= 0 {
                return Err(OrderError::InvalidInput(format!(
                    "Invalid quantity for product {}",
                    item.product_id
                )));
            }
        }
        for (field, value) in [
            ("recipient_name", &data.recipient_name),
            ("shipping_phone", &data.shipping_phone),
            ("shipping_address_line1", &data.shipping_address_line1),
            ("shipping_city", &data.shipping_city),
            ("shipping_province", &data.shipping_province),
        ] {
            if value.trim().is_empty() {
                return Err(OrderError::InvalidInput(format!("{field} is required")));
            }
        }

        let created = order_repo::create_order(&self.pool, customer_id, &data).await?;

        tracing::info!(
            order_id = created.order.id,
            order_number = %created.order.order_number,
            customer_id,
            total_amount = created.order.total_amount,
            "Order created"
        );

        Ok(created)
    }

    // ========== Reads ==========

    pub async fn get_order(&self, order_id: i64) -> OrderResult<OrderWithDetails> {
        order_repo::find_with_details(&self.pool, order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Order {order_id} not found")))
    }

    /// Owner-scoped read; foreign orders yield the same generic error as
    /// missing ones so customers cannot probe order existence
    pub async fn get_order_for_customer(
        &self,
        order_id: i64,
        customer_id: i64,
    ) -> OrderResult<OrderWithDetails> {
        let order = order_repo::find_for_customer(&self.pool, order_id, customer_id)
            .await?
            .ok_or_else(|| not_found_for_customer(order_id))?;
        self.get_order(order.id).await
    }

    pub async fn list_orders(&self, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        Ok(order_repo::find_all(&self.pool, &filter).await?)
    }

    pub async fn list_orders_for_customer(&self, customer_id: i64) -> OrderResult<Vec<Order>> {
        let filter = OrderFilter {
            customer_id: Some(customer_id),
            ..Default::default()
        };
        Ok(order_repo::find_all(&self.pool, &filter).await?)
    }

    pub async fn get_status_history(&self, order_id: i64) -> OrderResult<Vec<OrderStatusHistory>> {
        if order_repo::find_by_id(&self.pool, order_id).await?.is_none() {
            return Err(OrderError::NotFound(format!("Order {order_id} not found")));
        }
        Ok(order_repo::find_status_history(&self.pool, order_id).await?)
    }

    pub async fn pending_count(&self) -> OrderResult<i64> {
        Ok(order_repo::count_pending(&self.pool).await?)
    }

    pub async fn statistics(&self) -> OrderResult<OrderStatistics> {
        statistics::get_statistics(&self.pool).await
    }

    // ========== Internals ==========

    /// Customers only ever see their own orders; admins see all
    async fn load_for_actor(&self, order_id: i64, actor: Actor) -> OrderResult<Order> {
        let order = match actor {
            Actor::Admin { .. } => order_repo::find_by_id(&self.pool, order_id).await?,
            Actor::Customer { id } => {
                order_repo::find_for_customer(&self.pool, order_id, id).await?
            }
        };
        order.ok_or_else(|| match actor {
            Actor::Admin { .. } => OrderError::NotFound(format!("Order {order_id} not found")),
            Actor::Customer { .. } => not_found_for_customer(order_id),
        })
    }
}

/// Default reason supplied when the caller omits one
pub fn default_cancel_reason(actor: Actor) -> &'static str {
    if actor.is_admin() {
        "Cancelled by admin"
    } else {
        "Cancelled by customer"
    }
}

fn not_found_for_customer(_order_id: i64) -> OrderError {
    // Deliberately vague: does not reveal whether the order exists
    OrderError::NotFound("Order not found or access denied".to_string())
}
