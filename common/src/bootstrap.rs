// Bootstrap utilities for binary initialization

use crate::auth::DatabaseAuthService;
use crate::config::{SeedUser, Settings, StorageBackend};
use crate::db::{
    DbPool, InMemoryRepositoryStore, InMemoryUserStore, PgRepositoryStore, PgUserStore,
    RepositoryStore, UserStore,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// The store implementations selected by `storage.backend`
#[derive(Clone)]
pub struct Stores {
    pub repositories: Arc<dyn RepositoryStore>,
    pub users: Arc<dyn UserStore>,
    /// Present only for the postgres backend
    pub pool: Option<DbPool>,
}

impl Stores {
    /// Fresh in-process stores with no records
    pub fn in_memory() -> Self {
        Self {
            repositories: Arc::new(InMemoryRepositoryStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
            pool: None,
        }
    }

    /// PostgreSQL-backed stores sharing one pool
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            repositories: Arc::new(PgRepositoryStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            pool: Some(pool),
        }
    }
}

/// Initialize database pool
///
/// # Errors
/// Returns error if database pool initialization fails
#[tracing::instrument(skip(settings))]
pub async fn init_database_pool(settings: &Settings) -> Result<DbPool> {
    info!("Initializing database pool");

    let db_pool = DbPool::new(&settings.database)
        .await
        .context("Failed to initialize database pool")?;

    info!("Database pool initialized");
    Ok(db_pool)
}

/// Build the stores for the configured backend, running migrations if enabled
///
/// # Errors
/// Returns error if the database is unreachable or a migration fails
#[tracing::instrument(skip(settings))]
pub async fn init_stores(settings: &Settings) -> Result<Stores> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory stores; records are lost on restart");
            Ok(Stores::in_memory())
        }
        StorageBackend::Postgres => {
            let pool = init_database_pool(settings).await?;

            if settings.database.run_migrations {
                pool.run_migrations()
                    .await
                    .context("Failed to run database migrations")?;
            }

            Ok(Stores::postgres(pool))
        }
    }
}

/// Create every configured seed user that does not exist yet
///
/// # Errors
/// Returns error on the first account that cannot be created
#[tracing::instrument(skip_all, fields(count = seed_users.len()))]
pub async fn seed_users(auth: &DatabaseAuthService, seed_users: &[SeedUser]) -> Result<()> {
    for seed in seed_users {
        let user = auth
            .ensure_user(&seed.username, &seed.password, seed.email.clone())
            .await
            .with_context(|| format!("Failed to seed user '{}'", seed.username))?;
        info!(user_id = user.id, username = %user.username, "Seed user ready");
    }

    Ok(())
}
