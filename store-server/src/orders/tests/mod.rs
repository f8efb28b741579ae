//! Lifecycle scenario tests
//!
//! Run against a real temp-file SQLite database through the same
//! `DbService` constructor production uses, so migrations and the
//! guarded transaction path are exercised end to end.

use shared::models::{Actor, OrderCreate, OrderItemCreate, OrderStatus, OrderWithDetails};
use sqlx::SqlitePool;
use tempfile::TempDir;

use super::OrderService;
use crate::db::DbService;

mod test_guards;
mod test_statistics;

const CUSTOMER_ID: i64 = 7001;
const OTHER_CUSTOMER_ID: i64 = 7002;
const ADMIN_ID: i64 = 1;

fn admin() -> Actor {
    Actor::Admin { id: ADMIN_ID }
}

fn customer() -> Actor {
    Actor::Customer { id: CUSTOMER_ID }
}

/// Fresh service over a temp-file database. The TempDir must stay alive
/// for the duration of the test.
async fn test_service() -> (OrderService, SqlitePool, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = DbService::new(&db_path.to_string_lossy()).await.unwrap();
    let pool = db.pool.clone();
    (OrderService::new(db.pool), pool, dir)
}

fn sample_order() -> OrderCreate {
    OrderCreate {
        items: vec![
            OrderItemCreate {
                product_id: 101,
                product_name: "Aberdeen Pendant Light".to_string(),
                unit_price: 1500.0,
                quantity: 2,
            },
            OrderItemCreate {
                product_id: 102,
                product_name: "Warm White Bulb E27".to_string(),
                unit_price: 120.0,
                quantity: 5,
            },
        ],
        shipping_fee: Some(150.0),
        discount: Some(100.0),
        recipient_name: "Maria Santos".to_string(),
        shipping_phone: "09171234567".to_string(),
        shipping_address_line1: "123 Mabini St".to_string(),
        shipping_address_line2: None,
        shipping_city: "Quezon City".to_string(),
        shipping_province: "Metro Manila".to_string(),
        shipping_postal_code: Some("1100".to_string()),
        customer_notes: None,
    }
}

async fn seed_order(service: &OrderService) -> OrderWithDetails {
    service
        .create_order(CUSTOMER_ID, sample_order())
        .await
        .unwrap()
}

/// Walk an order's ledger oldest-first and check it replays from
/// `pending` to the order's current status through legal steps only
fn assert_ledger_replays(details: &OrderWithDetails) {
    let mut rows = details.status_history.clone();
    rows.reverse(); // stored newest first

    assert!(!rows.is_empty());
    assert_eq!(rows[0].previous_status, None);
    assert_eq!(rows[0].new_status, OrderStatus::Pending);

    let mut current = rows[0].new_status;
    for row in &rows[1..] {
        assert_eq!(row.previous_status, Some(current));
        let actor = if row.is_admin {
            Actor::Admin {
                id: row.actor_id.unwrap_or_default(),
            }
        } else {
            Actor::Customer {
                id: row.actor_id.unwrap_or_default(),
            }
        };
        assert!(
            super::policy::check(current, row.new_status, actor).is_ok(),
            "ledger step {current} -> {} is not a legal walk",
            row.new_status
        );
        current = row.new_status;
    }
    assert_eq!(current, details.order.status);
}
