use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::orders::OrderService;
use crate::server::{Config, JwtService};

/// Shared application state, built once at startup and injected into
/// every handler. Holds the only store handle in the process.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub orders: OrderService,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Initialize all services. Fails startup (not first request) when
    /// the database cannot be opened or migrated.
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let work_dir = PathBuf::from(&config.work_dir);
        std::fs::create_dir_all(&work_dir)?;

        let db_path = work_dir.join("store.db");
        let db_service = crate::db::DbService::new(&db_path.to_string_lossy()).await?;
        let pool = db_service.pool;

        let orders = OrderService::new(pool.clone());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config: config.clone(),
            pool,
            orders,
            jwt_service,
        })
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
