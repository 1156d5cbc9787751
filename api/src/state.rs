use std::sync::Arc;

use common::auth::{DatabaseAuthService, JwtService};
use common::bootstrap::Stores;
use common::config::Settings;
use common::db::DbPool;
use common::service::RepositoryService;
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repositories: RepositoryService,
    pub auth: DatabaseAuthService,
    pub config: Arc<Settings>,
    /// Only set for the postgres backend; used by the health check
    pub db_pool: Option<DbPool>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(stores: Stores, config: Settings) -> Self {
        let jwt = JwtService::new(&config.auth.jwt_secret, config.auth.jwt_expiration_hours);
        let auth = DatabaseAuthService::new(jwt, stores.users).with_hash_cost(config.auth.bcrypt_cost);

        Self {
            repositories: RepositoryService::new(stores.repositories),
            auth,
            config: Arc::new(config),
            db_pool: stores.pool,
            metrics: None,
        }
    }

    /// Attach the Prometheus handle rendered at `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
