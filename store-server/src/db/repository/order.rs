//! Order Repository
//!
//! The only component that reads or writes the `orders`, `order_items`
//! and `order_status_history` tables. `apply_transition` performs the
//! read-validate-write as one guarded transaction: the status update and
//! the ledger insert either both happen or neither does.

use super::{RepoError, RepoResult};
use shared::models::{
    Order, OrderCreate, OrderFilter, OrderItem, OrderStatus, OrderStatusHistory, OrderWithDetails,
    PaymentStatus,
};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT id, order_number, customer_id, status, payment_status, payment_reference, subtotal, shipping_fee, discount, total_amount, recipient_name, shipping_phone, shipping_address_line1, shipping_address_line2, shipping_city, shipping_province, shipping_postal_code, tracking_number, courier, admin_notes, customer_notes, cancellation_reason, created_at, updated_at, approved_at, shipped_at, delivered_at, completed_at, cancelled_at FROM orders";

const HISTORY_SELECT: &str = "SELECT id, order_id, previous_status, new_status, is_admin, actor_id, note, created_at FROM order_status_history";

/// Field updates applied together with a status change
#[derive(Debug, Clone, Default)]
pub struct StatusMutation {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub courier: Option<String>,
    pub admin_notes: Option<String>,
    pub cancellation_reason: Option<String>,
}

/// Ledger row written alongside a successful status change
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub previous_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub is_admin: bool,
    pub actor_id: Option<i64>,
    pub note: Option<String>,
}

/// Result of a guarded transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// Guard failed: the row's status no longer matches what the caller saw
    Stale { actual: OrderStatus },
    /// Row vanished between load and update
    Missing,
}

/// Row shape consumed by the statistics aggregator
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatRow {
    pub status: OrderStatus,
    pub total_amount: f64,
    pub created_at: i64,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Owner-scoped lookup; a foreign order is indistinguishable from a
/// missing one to the caller
pub async fn find_for_customer(
    pool: &SqlitePool,
    id: i64,
    customer_id: i64,
) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?1 AND customer_id = ?2");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(customer_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Load the order aggregate: order row, items, history (newest first)
pub async fn find_with_details(
    pool: &SqlitePool,
    id: i64,
) -> RepoResult<Option<OrderWithDetails>> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, product_name, unit_price, quantity, line_total FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let status_history = find_status_history(pool, id).await?;

    Ok(Some(OrderWithDetails {
        order,
        items,
        status_history,
    }))
}

pub async fn find_all(pool: &SqlitePool, filter: &OrderFilter) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE (?1 IS NULL OR status = ?1) \
         AND (?2 IS NULL OR payment_status = ?2) \
         AND (?3 IS NULL OR created_at >= ?3) \
         AND (?4 IS NULL OR created_at <= ?4) \
         AND (?5 IS NULL OR order_number LIKE ?5 OR recipient_name LIKE ?5) \
         AND (?6 IS NULL OR customer_id = ?6) \
         ORDER BY created_at DESC, id DESC"
    );

    let search_pattern = filter.search.as_ref().map(|s| format!("%{s}%"));

    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(filter.status)
        .bind(filter.payment_status)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(search_pattern)
        .bind(filter.customer_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Status ledger for one order, newest first
pub async fn find_status_history(
    pool: &SqlitePool,
    order_id: i64,
) -> RepoResult<Vec<OrderStatusHistory>> {
    let sql = format!("{HISTORY_SELECT} WHERE order_id = ? ORDER BY id DESC");
    let rows = sqlx::query_as::<_, OrderStatusHistory>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Create an order with its items and the initial `pending` ledger row,
/// all in one transaction. Line totals and the order total are computed
/// here; the total is never recomputed afterwards.
pub async fn create_order(
    pool: &SqlitePool,
    customer_id: i64,
    data: &OrderCreate,
) -> RepoResult<OrderWithDetails> {
    let now = shared::util::now_millis();
    let order_id = shared::util::snowflake_id();
    let order_number = shared::util::order_number();

    let shipping_fee = data.shipping_fee.unwrap_or(0.0);
    let discount = data.discount.unwrap_or(0.0);
    let subtotal: f64 = data
        .items
        .iter()
        .map(|i| i.unit_price * i.quantity as f64)
        .sum();
    let total_amount = subtotal - discount + shipping_fee;

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, order_number, customer_id, status, payment_status, subtotal, shipping_fee, discount, total_amount, recipient_name, shipping_phone, shipping_address_line1, shipping_address_line2, shipping_city, shipping_province, shipping_postal_code, customer_notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, 'pending', 'pending', ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
    )
    .bind(order_id)
    .bind(&order_number)
    .bind(customer_id)
    .bind(subtotal)
    .bind(shipping_fee)
    .bind(discount)
    .bind(total_amount)
    .bind(&data.recipient_name)
    .bind(&data.shipping_phone)
    .bind(&data.shipping_address_line1)
    .bind(&data.shipping_address_line2)
    .bind(&data.shipping_city)
    .bind(&data.shipping_province)
    .bind(&data.shipping_postal_code)
    .bind(&data.customer_notes)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for item in &data.items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, product_name, unit_price, quantity, line_total) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(shared::util::snowflake_id())
        .bind(order_id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(item.unit_price * item.quantity as f64)
        .execute(&mut *tx)
        .await?;
    }

    // Creation event: previous_status is NULL only here
    sqlx::query(
        "INSERT INTO order_status_history (order_id, previous_status, new_status, is_admin, actor_id, note, created_at) VALUES (?1, NULL, 'pending', 0, ?2, 'Order created', ?3)",
    )
    .bind(order_id)
    .bind(customer_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_with_details(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

/// Apply a status transition guarded by the expected current status.
///
/// The UPDATE matches `id AND status = expected`; zero affected rows
/// means a concurrent writer got there first (or the row is gone) and
/// nothing is written - in particular no ledger row. On success the
/// matching one-shot timestamp column is set if it was still NULL and
/// the ledger insert commits in the same transaction.
pub async fn apply_transition(
    pool: &SqlitePool,
    order_id: i64,
    expected: OrderStatus,
    mutation: &StatusMutation,
    history: &HistoryEntry,
) -> RepoResult<TransitionOutcome> {
    let now = shared::util::now_millis();

    let stamp_col = match mutation.status {
        OrderStatus::Approved => Some("approved_at"),
        OrderStatus::Delivering => Some("shipped_at"),
        OrderStatus::Delivered => Some("delivered_at"),
        OrderStatus::Complete => Some("completed_at"),
        OrderStatus::Cancelled => Some("cancelled_at"),
        OrderStatus::Pending => None,
    };
    let stamp = stamp_col
        .map(|c| format!(", {c} = COALESCE({c}, ?3)"))
        .unwrap_or_default();
    let sql = format!(
        "UPDATE orders SET status = ?2, updated_at = ?3, \
         tracking_number = COALESCE(?4, tracking_number), \
         courier = COALESCE(?5, courier), \
         admin_notes = COALESCE(?6, admin_notes), \
         cancellation_reason = COALESCE(?7, cancellation_reason){stamp} \
         WHERE id = ?1 AND status = ?8"
    );

    let mut tx = pool.begin().await?;

    let rows = sqlx::query(&sql)
        .bind(order_id)
        .bind(mutation.status)
        .bind(now)
        .bind(&mutation.tracking_number)
        .bind(&mutation.courier)
        .bind(&mutation.admin_notes)
        .bind(&mutation.cancellation_reason)
        .bind(expected)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if rows == 0 {
        // Nothing was mutated; report why so the caller can re-check policy
        drop(tx);
        let actual: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
                .bind(order_id)
                .fetch_optional(pool)
                .await?;
        return Ok(match actual {
            Some(actual) => TransitionOutcome::Stale { actual },
            None => TransitionOutcome::Missing,
        });
    }

    sqlx::query(
        "INSERT INTO order_status_history (order_id, previous_status, new_status, is_admin, actor_id, note, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(order_id)
    .bind(history.previous_status)
    .bind(history.new_status)
    .bind(history.is_admin)
    .bind(history.actor_id)
    .bind(&history.note)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(TransitionOutcome::Applied)
}

/// Payment status is orthogonal to the state machine and not audited in
/// the ledger; only `updated_at` records that something changed.
pub async fn update_payment_status(
    pool: &SqlitePool,
    id: i64,
    payment_status: PaymentStatus,
    payment_reference: Option<&str>,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = ?2, payment_reference = COALESCE(?3, payment_reference), updated_at = ?4 WHERE id = ?1",
    )
    .bind(id)
    .bind(payment_status)
    .bind(payment_reference)
    .bind(now)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows > 0)
}

pub async fn update_admin_notes(pool: &SqlitePool, id: i64, notes: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE orders SET admin_notes = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(notes)
        .bind(now)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

/// Owner-scoped customer_notes update (the only customer-mutable field)
pub async fn update_customer_notes(
    pool: &SqlitePool,
    id: i64,
    customer_id: i64,
    notes: &str,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET customer_notes = ?3, updated_at = ?4 WHERE id = ?1 AND customer_id = ?2",
    )
    .bind(id)
    .bind(customer_id)
    .bind(notes)
    .bind(now)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows > 0)
}

pub async fn count_pending(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = 'pending'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// One fetch feeding all three statistics; the aggregator derives the
/// rest in memory
pub async fn load_stat_rows(pool: &SqlitePool) -> RepoResult<Vec<StatRow>> {
    let rows = sqlx::query_as::<_, StatRow>("SELECT status, total_amount, created_at FROM orders")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
