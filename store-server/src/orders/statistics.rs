//! Statistics Aggregator
//!
//! Read-only dashboard numbers derived from the current order
//! population: per-status counts, recognized revenue, and today's order
//! volume. One fetch, derived in memory; eventually consistent with a
//! concurrent transition, which is fine for a dashboard read.

use chrono::{Local, TimeZone};
use sqlx::SqlitePool;

use shared::models::{OrderStatistics, OrderStatus, StatusCounts};

use crate::db::repository::order::{self as order_repo, StatRow};

use super::error::OrderResult;

pub async fn get_statistics(pool: &SqlitePool) -> OrderResult<OrderStatistics> {
    let rows = order_repo::load_stat_rows(pool).await?;
    Ok(compute(&rows, today_start_millis()))
}

/// Millisecond timestamp of local midnight (the server's time zone)
fn today_start_millis() -> i64 {
    let today = Local::now().date_naive();
    Local
        .from_local_datetime(&today.and_hms_opt(0, 0, 0).unwrap())
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_default()
}

/// Derive all three statistics from one row set.
///
/// Revenue counts orders whose status is delivered or complete - the
/// only revenue-recognition rule the system encodes; payment_status is
/// deliberately not a filter.
fn compute(rows: &[StatRow], today_start: i64) -> OrderStatistics {
    let mut counts = StatusCounts::default();
    let mut total_revenue = 0.0;
    let mut today_orders = 0;

    for row in rows {
        match row.status {
            OrderStatus::Pending => counts.pending += 1,
            OrderStatus::Approved => counts.approved += 1,
            OrderStatus::Delivering => counts.delivering += 1,
            OrderStatus::Delivered => counts.delivered += 1,
            OrderStatus::Complete => counts.complete += 1,
            OrderStatus::Cancelled => counts.cancelled += 1,
        }
        counts.total += 1;

        if matches!(row.status, OrderStatus::Delivered | OrderStatus::Complete) {
            total_revenue += row.total_amount;
        }
        if row.created_at >= today_start {
            today_orders += 1;
        }
    }

    OrderStatistics {
        status_counts: counts,
        total_revenue,
        today_orders,
    }
}
