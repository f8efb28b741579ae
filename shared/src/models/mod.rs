//! Data models
//!
//! Shared between store-server and frontends (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod order;

// Re-exports
pub use order::*;
