//! Storefront Server - order lifecycle backend for the lighting store
//!
//! # Architecture overview
//!
//! - **HTTP surface** (`routes` + `handler`): two front doors sharing one
//!   lifecycle service - the admin console API and the customer storefront
//!   API - plus a public health check
//! - **Order engine** (`orders`): transition policy, lifecycle service,
//!   and statistics aggregator
//! - **Store** (`db`): SQLite via sqlx; the repository is the only code
//!   touching the order tables
//! - **Auth** (`server::auth`): JWT validation for sessions issued by the
//!   identity provider
//!
//! # Module structure
//!
//! ```text
//! store-server/src/
//! ├── common/        # errors, logging
//! ├── server/        # config, state, auth, HTTP server
//! ├── db/            # pool + repositories
//! ├── orders/        # policy, lifecycle service, statistics
//! ├── routes/        # routers and middleware stack
//! └── handler/       # request handlers
//! ```

pub mod common;
pub mod db;
pub mod handler;
pub mod orders;
pub mod routes;
pub mod server;

// Re-export public types
pub use common::{AppError, AppResult};
pub use orders::OrderService;
pub use server::{Config, CurrentUser, JwtService, Server, ServerState};

// Re-export logger functions
pub use common::logger::{cleanup_old_logs, init_logger};

// Security logging macro - routed to the "security" target
#[macro_export]
macro_rules! security_log {
    ($level:ident, $event:expr, $($fields:tt)*) => {
        tracing::warn!(
            target: "security",
            level = stringify!($level),
            event = $event,
            $($fields)*
        );
    };
}

/// Load dotenv, create the working directory, and initialize logging.
/// Call once at process start, before config-dependent services.
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into());
    std::fs::create_dir_all(&work_dir)?;

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let is_production =
        std::env::var("ENVIRONMENT").map(|e| e == "production").unwrap_or(false);
    let log_dir = format!("{work_dir}/logs");

    init_logger(&level, is_production, Some(&log_dir))?;

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
    "#
    );
}
