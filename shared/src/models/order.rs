//! Order Model

use serde::{Deserialize, Serialize};

/// Order status, the state machine driven by the lifecycle service.
///
/// Stored as lowercase TEXT in SQLite and serialized the same way on
/// the wire, so the admin console and the web app share one vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Delivering,
    Delivered,
    Complete,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in forward-chain order
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Approved,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
        OrderStatus::Complete,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Complete => "complete",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status string; `None` for anything outside the fixed vocabulary
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "approved" => Some(OrderStatus::Approved),
            "delivering" => Some(OrderStatus::Delivering),
            "delivered" => Some(OrderStatus::Delivered),
            "complete" => Some(OrderStatus::Complete),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Complete | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status, tracked independently of the order state machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role on whose behalf a transition is requested.
///
/// Determines which transitions the policy permits; recorded on the
/// history ledger as an admin flag plus actor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Customer { id: i64 },
    Admin { id: i64 },
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin { .. })
    }

    pub fn id(&self) -> i64 {
        match self {
            Actor::Customer { id } | Actor::Admin { id } => *id,
        }
    }
}

/// Order entity (one purchase transaction)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Human-readable order number, unique and immutable once assigned
    pub order_number: String,
    /// Owning customer account, immutable
    pub customer_id: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    /// Amounts in currency unit; total = subtotal - discount + shipping_fee
    pub subtotal: f64,
    pub shipping_fee: f64,
    pub discount: f64,
    pub total_amount: f64,
    // Shipping snapshot, captured at creation and never mutated by the engine
    pub recipient_name: String,
    pub shipping_phone: String,
    pub shipping_address_line1: String,
    pub shipping_address_line2: Option<String>,
    pub shipping_city: String,
    pub shipping_province: String,
    pub shipping_postal_code: Option<String>,
    // Fulfillment metadata, null until the order enters delivering
    pub tracking_number: Option<String>,
    pub courier: Option<String>,
    pub admin_notes: Option<String>,
    pub customer_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    // One-shot transition stamps, set on first entry and never cleared
    pub approved_at: Option<i64>,
    pub shipped_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub cancelled_at: Option<i64>,
}

/// Order line item, owned exclusively by one order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub line_total: f64,
}

/// One row of the append-only status ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderStatusHistory {
    pub id: i64,
    pub order_id: i64,
    /// NULL only for the creation event
    pub previous_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub is_admin: bool,
    pub actor_id: Option<i64>,
    pub note: Option<String>,
    pub created_at: i64,
}

/// Order aggregate: the order row plus its items and status history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub status_history: Vec<OrderStatusHistory>,
}

/// Create order payload (items priced by the caller's catalog lookup)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub items: Vec<OrderItemCreate>,
    pub shipping_fee: Option<f64>,
    pub discount: Option<f64>,
    pub recipient_name: String,
    pub shipping_phone: String,
    pub shipping_address_line1: String,
    pub shipping_address_line2: Option<String>,
    pub shipping_city: String,
    pub shipping_province: String,
    pub shipping_postal_code: Option<String>,
    pub customer_notes: Option<String>,
}

/// Line item in a create-order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

/// List filter (admin list endpoint; customer lists are owner-scoped)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Inclusive created_at lower bound, millis
    pub date_from: Option<i64>,
    /// Inclusive created_at upper bound, millis
    pub date_to: Option<i64>,
    /// Matches order_number or recipient_name, case-insensitive substring
    pub search: Option<String>,
    /// Owner scope; set by the customer surface, never from the query string
    #[serde(skip)]
    pub customer_id: Option<i64>,
}

/// Order list response (orders plus a convenience count)
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub count: usize,
}

/// Per-status order counts; all six buckets are always present
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub delivering: i64,
    pub delivered: i64,
    pub complete: i64,
    pub cancelled: i64,
    pub total: i64,
}

/// Dashboard statistics over the whole order population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatistics {
    pub status_counts: StatusCounts,
    /// Sum of total_amount over delivered and complete orders
    pub total_revenue: f64,
    /// Orders created since local midnight
    pub today_orders: i64,
}
